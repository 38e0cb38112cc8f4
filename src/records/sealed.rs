//! Sealed attribute envelope.

use crate::error::Result;
use crate::unseal::Unsealer;
use serde::{Deserialize, Serialize};

/// An encrypted attribute as pushed by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedAttribute {
    /// Identifier of the key the data was sealed with.
    pub key_id: String,
    pub algorithm: String,
    /// Type of the plain text, e.g. "string".
    #[serde(default)]
    pub plain_text_type: String,
    pub base64_encoded_sealed_data: String,
}

impl SealedAttribute {
    pub(crate) fn open(&self, unsealer: &dyn Unsealer) -> Result<String> {
        Ok(unsealer.unseal(self)?)
    }
}
