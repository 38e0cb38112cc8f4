//! Card transaction records.

use super::{epoch_millis, SealedAttribute};
use crate::error::{FeedError, Result};
use crate::unseal::Unsealer;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Pending,
    Complete,
    Refund,
    Decline,
}

/// Amount whose currency and value are both sealed.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SealedCurrencyAmount {
    pub currency: SealedAttribute,
    pub amount: SealedAttribute,
}

impl SealedCurrencyAmount {
    fn unseal(&self, unsealer: &dyn Unsealer) -> Result<CurrencyAmount> {
        let currency = self.currency.open(unsealer)?;
        let amount = self.amount.open(unsealer)?;
        let amount = amount.trim().parse::<i64>().map_err(|e| {
            FeedError::MalformedPayload(format!("amount {amount:?} is not an integer: {e}"))
        })?;
        Ok(CurrencyAmount { currency, amount })
    }
}

/// Transaction update or deletion as pushed by the server.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    pub id: String,
    pub owner: String,
    pub version: u64,
    pub created_at_epoch_ms: f64,
    pub updated_at_epoch_ms: f64,
    pub sequence_id: String,
    pub card_id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub billed_amount: SealedCurrencyAmount,
    pub transacted_amount: SealedCurrencyAmount,
    pub description: SealedAttribute,
    #[serde(default)]
    pub decline_reason: Option<SealedAttribute>,
}

impl TransactionPayload {
    /// Open the sealed attributes and build the typed record.
    pub fn unseal(self, unsealer: &dyn Unsealer) -> Result<Transaction> {
        let billed_amount = self.billed_amount.unseal(unsealer)?;
        let transacted_amount = self.transacted_amount.unseal(unsealer)?;
        let description = self.description.open(unsealer)?;
        let decline_reason = self
            .decline_reason
            .as_ref()
            .map(|sealed| sealed.open(unsealer))
            .transpose()?;

        Ok(Transaction {
            id: self.id,
            owner: self.owner,
            version: self.version,
            created_at_ms: epoch_millis(self.created_at_epoch_ms, "createdAtEpochMs")?,
            updated_at_ms: epoch_millis(self.updated_at_epoch_ms, "updatedAtEpochMs")?,
            sequence_id: self.sequence_id,
            card_id: self.card_id,
            transaction_type: self.transaction_type,
            billed_amount,
            transacted_amount,
            description,
            decline_reason,
        })
    }
}

/// Amount in minor units of `currency`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyAmount {
    pub currency: String,
    pub amount: i64,
}

/// A card transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub owner: String,
    pub version: u64,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
    /// Groups the pending, complete and refund entries of one purchase.
    pub sequence_id: String,
    pub card_id: String,
    pub transaction_type: TransactionType,
    pub billed_amount: CurrencyAmount,
    pub transacted_amount: CurrencyAmount,
    pub description: String,
    pub decline_reason: Option<String>,
}
