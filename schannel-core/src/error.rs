//! Core error types for schannel.

use thiserror::Error;

/// Core error type for schannel operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid data scraped from a page or read from disk.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Usage snapshot could not be persisted.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
