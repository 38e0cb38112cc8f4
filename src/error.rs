//! Error types for the subscription hub.

use crate::unseal::UnsealError;
use thiserror::Error;

/// Main error type for hub operations.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("No signed-in user")]
    NotSignedIn,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unseal error: {0}")]
    Unseal(#[from] UnsealError),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        FeedError::MalformedPayload(e.to_string())
    }
}

/// Result type for hub operations.
pub type Result<T> = std::result::Result<T, FeedError>;
