//! Funding source records.

use super::{epoch_millis, SealedAttribute};
use crate::error::Result;
use crate::unseal::Unsealer;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FundingSourceState {
    Active,
    Inactive,
    /// Needs the user to refresh the linked account.
    Refresh,
}

/// Funding source update as pushed by the server.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingSourcePayload {
    pub id: String,
    pub owner: String,
    pub version: u64,
    pub created_at_epoch_ms: f64,
    pub updated_at_epoch_ms: f64,
    pub state: FundingSourceState,
    pub currency: String,
    pub last4: String,
    pub network: String,
    #[serde(default)]
    pub institution_name: Option<SealedAttribute>,
}

impl FundingSourcePayload {
    /// Open the sealed attributes and build the typed record.
    pub fn unseal(self, unsealer: &dyn Unsealer) -> Result<FundingSource> {
        let institution_name = self
            .institution_name
            .as_ref()
            .map(|sealed| sealed.open(unsealer))
            .transpose()?;

        Ok(FundingSource {
            id: self.id,
            owner: self.owner,
            version: self.version,
            created_at_ms: epoch_millis(self.created_at_epoch_ms, "createdAtEpochMs")?,
            updated_at_ms: epoch_millis(self.updated_at_epoch_ms, "updatedAtEpochMs")?,
            state: self.state,
            currency: self.currency,
            last4: self.last4,
            network: self.network,
            institution_name,
        })
    }
}

/// A funding source backing the user's cards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingSource {
    pub id: String,
    pub owner: String,
    pub version: u64,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
    pub state: FundingSourceState,
    pub currency: String,
    pub last4: String,
    pub network: String,
    pub institution_name: Option<String>,
}
