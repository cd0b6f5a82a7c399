//! Authenticated page fetch.

use reqwest::Method;
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, COOKIE, REFERER, USER_AGENT};
use schannel_core::{SessionCookie, cookie_header};
use tracing::{debug, instrument};
use url::Url;

use crate::error::FetchError;
use crate::session::Session;

/// Desktop Chrome user agent sent with every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/67.0.3396.79 Safari/537.36";

/// Accept header matching [`BROWSER_USER_AGENT`].
pub const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8";

/// Content coding the site pages are requested with.
pub const GZIP: &str = "gzip";

// ============================================================================
// Request / Response
// ============================================================================

/// One page request.
#[derive(Debug, Clone)]
pub struct PageRequest<'a> {
    /// HTTP method.
    pub method: Method,
    /// Target URL.
    pub url: &'a Url,
    /// URL-encoded form body.
    pub form: Option<&'a [(&'a str, &'a str)]>,
    /// Cookies sent as a single `Cookie` header.
    pub cookies: &'a [SessionCookie],
    /// `Referer` header, if any.
    pub referer: Option<&'a Url>,
    /// `Accept-Encoding` header, if any.
    pub accept_encoding: Option<&'a str>,
}

impl<'a> PageRequest<'a> {
    /// A plain GET.
    pub fn get(url: &'a Url) -> Self {
        Self {
            method: Method::GET,
            url,
            form: None,
            cookies: &[],
            referer: None,
            accept_encoding: None,
        }
    }

    /// A POST with an url-encoded form body.
    pub fn post_form(url: &'a Url, form: &'a [(&'a str, &'a str)]) -> Self {
        Self {
            method: Method::POST,
            form: Some(form),
            ..Self::get(url)
        }
    }

    /// Attaches caller cookies.
    pub fn cookies(mut self, cookies: &'a [SessionCookie]) -> Self {
        self.cookies = cookies;
        self
    }

    /// Sets the referer.
    pub fn referer(mut self, referer: &'a Url) -> Self {
        self.referer = Some(referer);
        self
    }

    /// Asks for a gzip-encoded response.
    pub fn gzip(mut self) -> Self {
        self.accept_encoding = Some(GZIP);
        self
    }
}

/// A fully read response.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects.
    pub url: Url,
    /// Final status code.
    pub status: u16,
    /// Decoded body.
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

// ============================================================================
// Fetch
// ============================================================================

impl Session {
    /// Sends a request and reads the whole body.
    ///
    /// Redirects are followed. Only a 2xx final status is accepted; the
    /// response is dropped before returning on every path.
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn fetch_page(&self, request: PageRequest<'_>) -> Result<FetchedPage, FetchError> {
        let mut builder = self
            .client()
            .request(request.method.clone(), request.url.clone())
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(ACCEPT, BROWSER_ACCEPT);

        if let Some(encoding) = request.accept_encoding {
            builder = builder.header(ACCEPT_ENCODING, encoding);
        }
        if let Some(referer) = request.referer {
            builder = builder.header(REFERER, referer.as_str());
        }
        if let Some(cookie) = cookie_header(request.cookies) {
            builder = builder.header(COOKIE, cookie);
        }
        if let Some(form) = request.form {
            builder = builder.form(form);
        }

        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().clone();
        debug!(status = status.as_u16(), final_url = %url, "Response received");

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?.to_vec();
        debug!(bytes = body.len(), "Body read");

        Ok(FetchedPage {
            url,
            status: status.as_u16(),
            body,
        })
    }

    /// Sends a request and returns only the body.
    pub async fn fetch(&self, request: PageRequest<'_>) -> Result<Vec<u8>, FetchError> {
        Ok(self.fetch_page(request).await?.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_form_keeps_url() {
        let url = Url::parse("https://www.schannel.net/dologin.php").unwrap();
        let form = [("token", "abc")];
        let request = PageRequest::post_form(&url, &form).gzip();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, &url);
        assert_eq!(request.accept_encoding, Some(GZIP));
        assert!(request.referer.is_none());
    }

    #[test]
    fn test_lossy_text() {
        let page = FetchedPage {
            url: Url::parse("https://www.schannel.net/").unwrap(),
            status: 200,
            body: vec![b'o', b'k', 0xff],
        };
        assert!(page.text().starts_with("ok"));
    }
}
