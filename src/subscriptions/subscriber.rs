//! Subscriber capabilities.

use crate::records::{FundingSource, Transaction};
use crate::types::{ChangeType, ConnectionState};

/// Anything registered with a topic. Receives connection-state transitions.
pub trait Subscriber: Send + Sync {
    fn connection_status_changed(&self, state: ConnectionState);
}

/// Receives funding source updates.
pub trait FundingSourceSubscriber: Subscriber {
    fn funding_source_changed(&self, funding_source: &FundingSource);
}

/// Receives transaction upserts and deletions.
pub trait TransactionSubscriber: Subscriber {
    fn transaction_changed(&self, transaction: &Transaction, change: ChangeType);

    /// Untyped notification kept for older consumers. Fires after
    /// [`transaction_changed`](Self::transaction_changed) for upserts only.
    fn transaction_upserted(&self, _transaction: &Transaction) {}
}
