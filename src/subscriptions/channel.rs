//! Channel-backed subscriber for consumers that prefer pulling updates.

use super::subscriber::{FundingSourceSubscriber, Subscriber, TransactionSubscriber};
use crate::records::{FundingSource, Transaction};
use crate::types::{ChangeType, ConnectionState};
use crossbeam_channel::{unbounded, Receiver, RecvError, RecvTimeoutError, Sender, TryRecvError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Everything a [`ChannelSubscriber`] forwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Update {
    Connection {
        state: ConnectionState,
    },
    FundingSource {
        funding_source: FundingSource,
    },
    Transaction {
        transaction: Transaction,
        change: ChangeType,
    },
}

/// Subscriber that queues every callback as an [`Update`].
///
/// Register the same instance for funding sources and transactions to get
/// one merged feed.
#[derive(Debug)]
pub struct ChannelSubscriber {
    sender: Sender<Update>,
}

impl ChannelSubscriber {
    pub fn new() -> (Arc<Self>, UpdateReceiver) {
        let (sender, receiver) = unbounded();
        (Arc::new(Self { sender }), UpdateReceiver { receiver })
    }

    fn forward(&self, update: Update) {
        // Receiver gone means nobody is listening any more.
        let _ = self.sender.send(update);
    }
}

impl Subscriber for ChannelSubscriber {
    fn connection_status_changed(&self, state: ConnectionState) {
        self.forward(Update::Connection { state });
    }
}

impl FundingSourceSubscriber for ChannelSubscriber {
    fn funding_source_changed(&self, funding_source: &FundingSource) {
        self.forward(Update::FundingSource {
            funding_source: funding_source.clone(),
        });
    }
}

impl TransactionSubscriber for ChannelSubscriber {
    fn transaction_changed(&self, transaction: &Transaction, change: ChangeType) {
        self.forward(Update::Transaction {
            transaction: transaction.clone(),
            change,
        });
    }
}

/// Receiving half of a [`ChannelSubscriber`].
#[derive(Debug)]
pub struct UpdateReceiver {
    receiver: Receiver<Update>,
}

impl UpdateReceiver {
    /// Receive the next update (blocking).
    pub fn recv(&self) -> Result<Update, RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an update (non-blocking).
    pub fn try_recv(&self) -> Result<Update, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Update, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain whatever is queued right now.
    pub fn drain(&self) -> Vec<Update> {
        self.receiver.try_iter().collect()
    }
}
