//! Store error types.

use schannel_core::CoreError;
use schannel_fetch::FetchError;
use thiserror::Error;

/// Errors from configuration, persistence and credential storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// `~` was used in a path but no home directory is known.
    #[error("Home directory not found")]
    HomeNotFound,

    /// A configured path is neither absolute nor `~`-prefixed.
    #[error("Path must be absolute or start with '~': {0}")]
    NotAbsolute(String),

    /// Proxy URL rejected.
    #[error("Invalid proxy URL: {0}")]
    InvalidProxy(String),

    /// System keychain error.
    #[error("Keychain error: {0}")]
    Keychain(String),

    /// Site access failed.
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// No saved login session for the user.
    #[error("Not logged in: {0}")]
    NotLoggedIn(String),
}

impl From<keyring::Error> for StoreError {
    fn from(err: keyring::Error) -> Self {
        StoreError::Keychain(err.to_string())
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Serialization(e) => CoreError::Serialization(e),
            other => CoreError::Persistence(other.to_string()),
        }
    }
}
