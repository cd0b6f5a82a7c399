//! Login flow.
//!
//! Logging in takes two requests, each on a fresh [`Session`]:
//!
//! 1. GET the account page and scrape the CSRF `token` from the login form.
//! 2. POST `token`, `username` and `password` to the login endpoint with the
//!    cookies collected in step 1 seeded into the jar, so they follow the
//!    post-login redirect too.
//!
//! A rejected login is recognised by the redirect target carrying
//! `incorrect=true`; the site answers 200 either way.

use schannel_core::SessionCookie;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::client::PageRequest;
use crate::error::LoginError;
use crate::parser::parse_login_token;
use crate::session::Session;
use crate::site::SiteUrls;

/// CDN cookie that must survive from the token fetch into the logged-in set.
pub const CDN_SESSION_COOKIE: &str = "__cfduid";

/// Runs the login exchange against one site.
#[derive(Debug, Clone)]
pub struct LoginFlow {
    site: SiteUrls,
    proxy_url: String,
}

impl LoginFlow {
    /// Creates a flow for `site`, routed through `proxy_url` (empty for none).
    pub fn new(site: SiteUrls, proxy_url: impl Into<String>) -> Self {
        Self {
            site,
            proxy_url: proxy_url.into(),
        }
    }

    /// Site this flow logs into.
    pub fn site(&self) -> &SiteUrls {
        &self.site
    }

    /// Fetches the login form and returns its CSRF token plus the cookies
    /// the site set while serving it.
    #[instrument(skip(self))]
    pub async fn fetch_csrf_token(&self) -> Result<(String, Vec<SessionCookie>), LoginError> {
        let session = Session::new(&self.proxy_url)?;
        let account = self.site.account();

        let page = session
            .fetch_page(PageRequest::get(&account).referer(self.site.root()).gzip())
            .await?;

        let token = parse_login_token(&page.text()).ok_or(LoginError::CsrfTokenMissing)?;
        let cookies = session.cookies_for(self.site.root())?;
        debug!(cookies = cookies.len(), "CSRF token fetched");

        Ok((token, cookies))
    }

    /// Logs in and returns the session cookies.
    ///
    /// # Errors
    ///
    /// - `LoginError::CsrfTokenMissing` if the login form has no token
    /// - `LoginError::InvalidCredentials` if the site rejects the login
    /// - `LoginError::Fetch` for transport failures and non-2xx answers
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Vec<SessionCookie>, LoginError> {
        let session = Session::new(&self.proxy_url)?;
        let (token, pre_auth) = self.fetch_csrf_token().await?;
        session.add_cookies(&pre_auth, self.site.root())?;

        let login = self.site.login();
        let account = self.site.account();
        let form = [
            ("token", token.as_str()),
            ("username", username),
            ("password", password),
        ];

        let page = session
            .fetch_page(
                PageRequest::post_form(&login, &form)
                    .referer(&account)
                    .gzip(),
            )
            .await?;

        if is_rejected(&page.url) {
            warn!("Login rejected by site");
            return Err(LoginError::InvalidCredentials);
        }

        let issued = drop_unchanged(session.cookies_for(self.site.root())?, &pre_auth);
        let cookies = carry_cdn_cookie(issued, &pre_auth);
        info!(cookies = cookies.len(), "Logged in");
        Ok(cookies)
    }
}

/// True when the login redirect reported bad credentials.
fn is_rejected(url: &Url) -> bool {
    url.query_pairs()
        .any(|(key, value)| key == "incorrect" && value == "true")
}

/// Removes seeded pre-auth cookies the login left untouched.
fn drop_unchanged(mut cookies: Vec<SessionCookie>, pre_auth: &[SessionCookie]) -> Vec<SessionCookie> {
    cookies.retain(|c| {
        !pre_auth
            .iter()
            .any(|p| p.name == c.name && p.value == c.value)
    });
    cookies
}

/// Appends the pre-auth CDN cookie, replacing any issued during login.
fn carry_cdn_cookie(mut cookies: Vec<SessionCookie>, pre_auth: &[SessionCookie]) -> Vec<SessionCookie> {
    let carried: Vec<SessionCookie> = pre_auth
        .iter()
        .filter(|c| c.name == CDN_SESSION_COOKIE)
        .cloned()
        .collect();

    if !carried.is_empty() {
        cookies.retain(|c| c.name != CDN_SESSION_COOKIE);
        cookies.extend(carried);
    }
    cookies
}
