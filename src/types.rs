//! Core types for the subscription hub.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Caller-chosen identifier of a subscriber within one topic.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriberId(pub String);

impl SubscriberId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriberId({})", self.0)
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for SubscriberId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SubscriberId {
    fn from(id: &str) -> Self {
        SubscriberId(id.to_string())
    }
}

impl From<String> for SubscriberId {
    fn from(id: String) -> Self {
        SubscriberId(id)
    }
}

impl From<&SubscriberId> for SubscriberId {
    fn from(id: &SubscriberId) -> Self {
        id.clone()
    }
}

/// Connectivity of a topic's upstream stream, as reported to subscribers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

/// Which transaction stream produced an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    Upserted,
    Deleted,
}

/// The server-pushed event streams a hub can open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopicKind {
    FundingSourceChanges,
    TransactionUpserts,
    TransactionDeletes,
}

impl TopicKind {
    pub const ALL: [TopicKind; 3] = [
        TopicKind::FundingSourceChanges,
        TopicKind::TransactionUpserts,
        TopicKind::TransactionDeletes,
    ];

    /// Name of the server subscription operation.
    pub fn operation_name(self) -> &'static str {
        match self {
            TopicKind::FundingSourceChanges => "OnFundingSourceUpdate",
            TopicKind::TransactionUpserts => "OnTransactionUpdate",
            TopicKind::TransactionDeletes => "OnTransactionDelete",
        }
    }

    /// Field of the event body that carries the record.
    pub fn response_field(self) -> &'static str {
        match self {
            TopicKind::FundingSourceChanges => "onFundingSourceUpdate",
            TopicKind::TransactionUpserts => "onTransactionUpdate",
            TopicKind::TransactionDeletes => "onTransactionDelete",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TopicKind::FundingSourceChanges => "funding-source-changes",
            TopicKind::TransactionUpserts => "transaction-upserts",
            TopicKind::TransactionDeletes => "transaction-deletes",
        }
    }
}

impl fmt::Display for TopicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream state of one topic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TopicState {
    /// No upstream stream exists.
    NoHandle,
    /// An upstream stream is being established.
    Pending,
    /// The transport confirmed the upstream stream.
    Active,
}
