//! Site endpoints.
//!
//! All account pages hang off a single root URL so the whole client can be
//! pointed at another host (a mirror, or a mock server in tests).

use url::Url;

use crate::error::FetchError;

/// Default site root.
pub const DEFAULT_SITE_URL: &str = "https://www.schannel.net/";

const ACCOUNT_PATH: &str = "clientarea.php";
const LOGIN_PATH: &str = "dologin.php";

/// Endpoints of the account site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrls {
    root: Url,
}

impl SiteUrls {
    /// Creates endpoints under `root`.
    ///
    /// A missing trailing slash is added so relative links resolve under the
    /// root rather than next to it.
    pub fn new(root: &str) -> Result<Self, FetchError> {
        let mut root =
            Url::parse(root).map_err(|e| FetchError::InvalidUrl(format!("{root}: {e}")))?;
        if root.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(format!("{root}: not a base URL")));
        }
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        Ok(Self { root })
    }

    /// Site root.
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Account page; also serves the login form.
    pub fn account(&self) -> Url {
        self.join(ACCOUNT_PATH)
    }

    /// Login form target.
    pub fn login(&self) -> Url {
        self.join(LOGIN_PATH)
    }

    /// Service list page.
    pub fn services(&self) -> Url {
        self.join_with_action("services")
    }

    /// Invoice list page.
    pub fn invoices(&self) -> Url {
        self.join_with_action("invoices")
    }

    /// Resolves a link scraped from a page against the site root.
    pub fn resolve(&self, link: &str) -> Result<Url, FetchError> {
        self.root
            .join(link)
            .map_err(|e| FetchError::InvalidUrl(format!("{link}: {e}")))
    }

    fn join(&self, path: &str) -> Url {
        let mut url = self.root.clone();
        let full = format!("{}{path}", self.root.path());
        url.set_path(&full);
        url
    }

    fn join_with_action(&self, action: &str) -> Url {
        let mut url = self.account();
        url.query_pairs_mut().append_pair("action", action);
        url
    }
}

impl Default for SiteUrls {
    fn default() -> Self {
        Self {
            root: Url::parse(DEFAULT_SITE_URL).expect("default site URL is valid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let site = SiteUrls::default();
        assert_eq!(site.account().as_str(), "https://www.schannel.net/clientarea.php");
        assert_eq!(site.login().as_str(), "https://www.schannel.net/dologin.php");
        assert_eq!(
            site.services().as_str(),
            "https://www.schannel.net/clientarea.php?action=services"
        );
        assert_eq!(
            site.invoices().as_str(),
            "https://www.schannel.net/clientarea.php?action=invoices"
        );
    }

    #[test]
    fn test_root_without_trailing_slash() {
        let site = SiteUrls::new("http://127.0.0.1:8080/mirror").unwrap();
        assert_eq!(site.account().as_str(), "http://127.0.0.1:8080/mirror/clientarea.php");
    }

    #[test]
    fn test_resolve_relative_link() {
        let site = SiteUrls::default();
        let url = site.resolve("clientarea.php?action=productdetails&id=42").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.schannel.net/clientarea.php?action=productdetails&id=42"
        );
    }

    #[test]
    fn test_invalid_root() {
        assert!(SiteUrls::new("not a url").is_err());
        assert!(SiteUrls::new("mailto:someone@example.com").is_err());
    }
}
