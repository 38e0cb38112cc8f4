//! Domain records carried by subscription events.
//!
//! Events arrive as JSON with some attributes sealed. Each record has a
//! wire payload type that mirrors the server shape and a typed record that
//! subscribers see once every sealed attribute has been opened.

mod funding_source;
mod sealed;
mod transaction;

pub use funding_source::{FundingSource, FundingSourcePayload, FundingSourceState};
pub use sealed::SealedAttribute;
pub use transaction::{
    CurrencyAmount, SealedCurrencyAmount, Transaction, TransactionPayload, TransactionType,
};

use crate::error::{FeedError, Result};

/// Whole milliseconds from a wire timestamp. Sub-millisecond digits are
/// dropped; non-finite or out-of-range values are malformed.
pub(crate) fn epoch_millis(value: f64, field: &str) -> Result<i64> {
    // i64::MAX is not representable; its f64 rounding is 2^63.
    if !value.is_finite() || value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(FeedError::MalformedPayload(format!(
            "{field} is not a valid timestamp: {value}"
        )));
    }
    Ok(value.trunc() as i64)
}
