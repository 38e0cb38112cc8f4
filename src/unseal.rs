//! Unsealing contract for encrypted record attributes.

use crate::records::SealedAttribute;
use thiserror::Error;

/// Why a sealed attribute could not be opened.
#[derive(Debug, Error)]
pub enum UnsealError {
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Integrity check failed: {0}")]
    Integrity(String),
}

/// Envelope decryption of sealed attributes.
pub trait Unsealer: Send + Sync {
    /// Decrypt one attribute into its plain-text form.
    fn unseal(&self, sealed: &SealedAttribute) -> std::result::Result<String, UnsealError>;
}
