//! Fetch error types.

use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for session and page operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed, or the body could not be read or decompressed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Proxy URL could not be used.
    #[error("Invalid proxy URL {url:?}: {reason}")]
    InvalidProxy {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A page URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The server answered with a non-success status.
    #[error("Unexpected status {status} from {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// A page did not have the expected structure.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The public suffix list could not be loaded.
    #[error("Invalid public suffix list: {0}")]
    PublicSuffix(String),

    /// The cookie jar lock was poisoned.
    #[error("Cookie jar unavailable")]
    CookieJar,
}

impl From<schannel_core::CoreError> for FetchError {
    fn from(err: schannel_core::CoreError) -> Self {
        FetchError::Parse(err.to_string())
    }
}

// ============================================================================
// Login Error
// ============================================================================

/// Error type for the login flow.
///
/// Every variant ends the attempt; the flow never retries on its own.
#[derive(Debug, Error)]
pub enum LoginError {
    /// The account page carried no hidden `token` input.
    #[error("CSRF token not found on the login page")]
    CsrfTokenMissing,

    /// The site rejected the username or password.
    #[error("Login rejected: invalid username or password")]
    InvalidCredentials,

    /// A request in the flow failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl From<reqwest::Error> for LoginError {
    fn from(err: reqwest::Error) -> Self {
        LoginError::Fetch(FetchError::Http(err))
    }
}
