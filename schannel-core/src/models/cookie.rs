//! Session cookie types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cookie captured from the site's cookie jar.
///
/// Cookies are obtained once at login and handed around by value. A new
/// login replaces the whole set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Domain the cookie is scoped to.
    #[serde(default)]
    pub domain: String,
    /// Path the cookie is scoped to.
    #[serde(default = "default_path")]
    pub path: String,
    /// Expiry, `None` for session cookies.
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
}

fn default_path() -> String {
    "/".to_string()
}

impl SessionCookie {
    /// Creates a session cookie scoped to `/` on the given domain.
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: default_path(),
            expires: None,
        }
    }

    /// Returns true if the cookie has an expiry in the past.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|at| at <= now)
    }

    /// Returns the `name=value` pair used in a `Cookie` header.
    pub fn header_pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Joins cookies into a single `Cookie` header value.
///
/// Returns `None` when there is nothing to send.
pub fn cookie_header(cookies: &[SessionCookie]) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }
    Some(
        cookies
            .iter()
            .map(SessionCookie::header_pair)
            .collect::<Vec<_>>()
            .join("; "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_cookie_header_joins_pairs_in_order() {
        let cookies = vec![
            SessionCookie::new("WHMCSsession", "s1", "www.schannel.net"),
            SessionCookie::new("__cfduid", "abc123", "schannel.net"),
        ];
        assert_eq!(
            cookie_header(&cookies).as_deref(),
            Some("WHMCSsession=s1; __cfduid=abc123")
        );
    }

    #[test]
    fn test_cookie_header_empty() {
        assert!(cookie_header(&[]).is_none());
    }

    #[test]
    fn test_is_expired() {
        let now = Utc::now();
        let mut cookie = SessionCookie::new("a", "b", "example.com");
        assert!(!cookie.is_expired(now));

        cookie.expires = Some(now - Duration::minutes(1));
        assert!(cookie.is_expired(now));

        cookie.expires = Some(now + Duration::minutes(1));
        assert!(!cookie.is_expired(now));
    }
}
