//! HTTP session factory.
//!
//! A [`Session`] bundles a `reqwest` client with its own cookie jar and an
//! optional upstream proxy. Building one does no network I/O.
//!
//! Jars reject cookies scoped to a public suffix (`Domain=co.uk`), using the
//! list bundled under `data/` unless [`SessionOptions`] supplies another.

use chrono::DateTime;
use cookie_store::{CookieStore, RawCookie};
use reqwest::{Client, Proxy};
use reqwest_cookie_store::CookieStoreMutex;
use schannel_core::SessionCookie;
use std::fmt;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::FetchError;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Proxy schemes the client can route through.
const PROXY_SCHEMES: &[&str] = &["http", "https", "socks5"];

/// Snapshot of the publicsuffix.org list.
static PUBLIC_SUFFIXES: LazyLock<publicsuffix::List> = LazyLock::new(|| {
    include_str!("../data/public_suffix_list.dat")
        .parse()
        .expect("Invalid bundled public suffix list")
});

// ============================================================================
// Options
// ============================================================================

/// Settings for building a [`Session`].
pub struct SessionOptions {
    /// Upstream proxy; `None` connects directly.
    pub proxy: Option<Url>,
    /// Public suffix list used by the cookie jar to reject cookies set for
    /// a public suffix; `None` turns the check off.
    pub public_suffix_list: Option<publicsuffix::List>,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            public_suffix_list: Some(PUBLIC_SUFFIXES.clone()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl SessionOptions {
    /// Sets the upstream proxy.
    pub fn with_proxy(mut self, proxy: Option<Url>) -> Self {
        self.proxy = proxy;
        self
    }

    /// Sets the public suffix list for the cookie jar.
    pub fn with_public_suffix_list(mut self, list: publicsuffix::List) -> Self {
        self.public_suffix_list = Some(list);
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Validates a proxy URL.
///
/// An empty (or blank) string means a direct connection. Anything else must
/// be an `http`, `https` or `socks5` URL with a host.
///
/// # Errors
///
/// Returns `FetchError::InvalidProxy` for malformed URLs and other schemes.
pub fn parse_proxy_url(proxy: &str) -> Result<Option<Url>, FetchError> {
    let proxy = proxy.trim();
    if proxy.is_empty() {
        return Ok(None);
    }

    let invalid = |reason: String| FetchError::InvalidProxy {
        url: proxy.to_string(),
        reason,
    };

    let url = Url::parse(proxy).map_err(|e| invalid(e.to_string()))?;
    if !PROXY_SCHEMES.contains(&url.scheme()) {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(Some(url))
}

/// Parses a public suffix list in the publicsuffix.org `.dat` format.
///
/// # Errors
///
/// Returns `FetchError::PublicSuffix` if the list cannot be parsed.
pub fn parse_public_suffix_list(text: &str) -> Result<publicsuffix::List, FetchError> {
    text.parse::<publicsuffix::List>()
        .map_err(|e| FetchError::PublicSuffix(format!("{e:?}")))
}

// ============================================================================
// Session
// ============================================================================

/// HTTP client plus cookie jar.
///
/// Cheap to clone; clones share the client and the jar.
#[derive(Clone)]
pub struct Session {
    client: Client,
    jar: Arc<CookieStoreMutex>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    /// Creates a session, routed through `proxy_url` unless it is empty.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidProxy` for a bad proxy URL and
    /// `FetchError::Http` if the client cannot be built.
    pub fn new(proxy_url: &str) -> Result<Self, FetchError> {
        Self::with_options(SessionOptions::default().with_proxy(parse_proxy_url(proxy_url)?))
    }

    /// Creates a session from explicit options.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidProxy` if reqwest rejects the proxy and
    /// `FetchError::Http` if the client cannot be built.
    pub fn with_options(options: SessionOptions) -> Result<Self, FetchError> {
        let jar = Arc::new(CookieStoreMutex::new(CookieStore::new(
            options.public_suffix_list,
        )));

        let mut builder = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(options.timeout)
            .gzip(true);

        if let Some(proxy) = &options.proxy {
            let proxy = Proxy::all(proxy.as_str()).map_err(|e| FetchError::InvalidProxy {
                url: proxy.to_string(),
                reason: e.to_string(),
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;
        debug!(proxied = options.proxy.is_some(), "Session created");

        Ok(Self { client, jar })
    }

    /// Returns the cookies the jar would send to `url`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::CookieJar` if the jar lock is poisoned.
    pub fn cookies_for(&self, url: &Url) -> Result<Vec<SessionCookie>, FetchError> {
        let store = self.jar.lock().map_err(|_| FetchError::CookieJar)?;
        let fallback_domain = url.host_str().unwrap_or_default();

        Ok(store
            .matches(url)
            .into_iter()
            .map(|cookie| SessionCookie {
                name: cookie.name().to_string(),
                value: cookie.value().to_string(),
                domain: cookie
                    .domain()
                    .map_or(fallback_domain, |d| d.trim_start_matches('.'))
                    .to_string(),
                path: cookie.path().unwrap_or("/").to_string(),
                expires: cookie
                    .expires_datetime()
                    .and_then(|at| DateTime::from_timestamp(at.unix_timestamp(), 0)),
            })
            .collect())
    }

    /// Seeds the jar with cookies received earlier from `url`.
    ///
    /// Cookies the jar refuses (wrong domain, public suffix) are skipped.
    /// Returns how many were stored.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::CookieJar` if the jar lock is poisoned.
    pub fn add_cookies(&self, cookies: &[SessionCookie], url: &Url) -> Result<usize, FetchError> {
        let mut store = self.jar.lock().map_err(|_| FetchError::CookieJar)?;
        let mut stored = 0;

        for cookie in cookies {
            let raw = RawCookie::build((cookie.name.clone(), cookie.value.clone()))
                .domain(cookie.domain.clone())
                .path(cookie.path.clone())
                .build();
            match store.insert_raw(&raw, url) {
                Ok(_) => stored += 1,
                Err(e) => debug!(cookie = %cookie.name, error = ?e, "Cookie not seeded"),
            }
        }

        Ok(stored)
    }

    /// Returns the underlying reqwest client.
    pub(crate) fn client(&self) -> &Client {
        &self.client
    }
}
