//! What each topic decodes and how it calls its subscribers.

use super::subscriber::{self, FundingSourceSubscriber, TransactionSubscriber};
use crate::error::Result;
use crate::records::{FundingSource, FundingSourcePayload, Transaction, TransactionPayload};
use crate::types::{ChangeType, TopicKind};
use crate::unseal::Unsealer;
use serde_json::Value;

/// Binds a topic kind to its record type and subscriber capability.
pub(crate) trait TopicSpec: Send + Sync + 'static {
    type Subscriber: ?Sized + subscriber::Subscriber + 'static;
    type Record: Send;

    fn kind(&self) -> TopicKind;

    /// Turn the event's record body into a typed record.
    fn decode(&self, body: Value, unsealer: &dyn Unsealer) -> Result<Self::Record>;

    fn deliver(&self, record: &Self::Record, subscriber: &Self::Subscriber);
}

pub(crate) struct FundingSourceTopic;

impl TopicSpec for FundingSourceTopic {
    type Subscriber = dyn FundingSourceSubscriber;
    type Record = FundingSource;

    fn kind(&self) -> TopicKind {
        TopicKind::FundingSourceChanges
    }

    fn decode(&self, body: Value, unsealer: &dyn Unsealer) -> Result<Self::Record> {
        let payload: FundingSourcePayload = serde_json::from_value(body)?;
        payload.unseal(unsealer)
    }

    fn deliver(&self, record: &Self::Record, subscriber: &Self::Subscriber) {
        subscriber.funding_source_changed(record);
    }
}

/// One of the two transaction streams; the change tag says which.
pub(crate) struct TransactionTopic {
    change: ChangeType,
}

impl TransactionTopic {
    pub(crate) fn upserts() -> Self {
        Self {
            change: ChangeType::Upserted,
        }
    }

    pub(crate) fn deletes() -> Self {
        Self {
            change: ChangeType::Deleted,
        }
    }
}

impl TopicSpec for TransactionTopic {
    type Subscriber = dyn TransactionSubscriber;
    type Record = Transaction;

    fn kind(&self) -> TopicKind {
        match self.change {
            ChangeType::Upserted => TopicKind::TransactionUpserts,
            ChangeType::Deleted => TopicKind::TransactionDeletes,
        }
    }

    fn decode(&self, body: Value, unsealer: &dyn Unsealer) -> Result<Self::Record> {
        let payload: TransactionPayload = serde_json::from_value(body)?;
        payload.unseal(unsealer)
    }

    fn deliver(&self, record: &Self::Record, subscriber: &Self::Subscriber) {
        subscriber.transaction_changed(record, self.change);
        if self.change == ChangeType::Upserted {
            subscriber.transaction_upserted(record);
        }
    }
}
