//! Consumer-facing subscription service tying all topics together.

use crate::config::HubConfig;
use crate::error::{FeedError, Result};
use crate::identity::IdentityProvider;
use crate::subscriptions::coordinator::Coordinator;
use crate::subscriptions::topics::{FundingSourceTopic, TransactionTopic};
use crate::subscriptions::{FundingSourceSubscriber, TransactionSubscriber};
use crate::transport::Transport;
use crate::types::{SubscriberId, TopicKind, TopicState};
use crate::unseal::Unsealer;
use std::sync::Arc;
use tracing::debug;

/// Real-time updates for one client session.
///
/// Owns a registry per topic and every upstream stream opened on their
/// behalf. Dropping the service closes it.
pub struct SubscriptionService {
    identity: Arc<dyn IdentityProvider>,
    funding_sources: Coordinator<FundingSourceTopic>,
    transaction_upserts: Coordinator<TransactionTopic>,
    transaction_deletes: Coordinator<TransactionTopic>,
}

impl SubscriptionService {
    pub fn new(
        transport: Arc<dyn Transport>,
        identity: Arc<dyn IdentityProvider>,
        unsealer: Arc<dyn Unsealer>,
        config: HubConfig,
    ) -> Self {
        let config = Arc::new(config);
        Self {
            identity,
            funding_sources: Coordinator::new(
                FundingSourceTopic,
                Arc::clone(&transport),
                Arc::clone(&unsealer),
                Arc::clone(&config),
            ),
            transaction_upserts: Coordinator::new(
                TransactionTopic::upserts(),
                Arc::clone(&transport),
                Arc::clone(&unsealer),
                Arc::clone(&config),
            ),
            transaction_deletes: Coordinator::new(
                TransactionTopic::deletes(),
                transport,
                unsealer,
                config,
            ),
        }
    }

    fn owner(&self) -> Result<String> {
        self.identity
            .current_subject()
            .filter(|subject| !subject.is_empty())
            .ok_or(FeedError::NotSignedIn)
    }

    // --- Funding sources ---

    /// Receive funding source updates under `id`, replacing any subscriber
    /// already registered under it.
    pub fn subscribe_to_funding_sources(
        &self,
        id: impl Into<SubscriberId>,
        subscriber: Arc<dyn FundingSourceSubscriber>,
    ) -> Result<()> {
        let owner = self.owner()?;
        self.funding_sources.subscribe(&owner, id.into(), subscriber)
    }

    pub fn unsubscribe_from_funding_sources(&self, id: &str) {
        self.funding_sources.unsubscribe(id);
    }

    pub fn unsubscribe_all_from_funding_sources(&self) {
        self.funding_sources.unsubscribe_all();
    }

    // --- Transactions ---

    /// Receive transaction upserts and deletions under `id`.
    ///
    /// The subscriber joins both transaction topics and gets connection
    /// updates from each of them.
    pub fn subscribe_to_transactions(
        &self,
        id: impl Into<SubscriberId>,
        subscriber: Arc<dyn TransactionSubscriber>,
    ) -> Result<()> {
        let owner = self.owner()?;
        let id = id.into();
        self.transaction_upserts
            .subscribe(&owner, id.clone(), Arc::clone(&subscriber))?;
        self.transaction_deletes.subscribe(&owner, id, subscriber)
    }

    pub fn unsubscribe_from_transactions(&self, id: &str) {
        self.transaction_upserts.unsubscribe(id);
        self.transaction_deletes.unsubscribe(id);
    }

    pub fn unsubscribe_all_from_transactions(&self) {
        self.transaction_upserts.unsubscribe_all();
        self.transaction_deletes.unsubscribe_all();
    }

    // --- Whole session ---

    pub fn unsubscribe_all(&self) {
        self.unsubscribe_all_from_funding_sources();
        self.unsubscribe_all_from_transactions();
    }

    /// Tear down every topic and release every upstream stream.
    ///
    /// Safe to call repeatedly. A later subscribe starts over.
    pub fn close(&self) {
        debug!("closing subscription service");
        self.unsubscribe_all();
    }

    pub fn topic_state(&self, kind: TopicKind) -> TopicState {
        match kind {
            TopicKind::FundingSourceChanges => self.funding_sources.state(),
            TopicKind::TransactionUpserts => self.transaction_upserts.state(),
            TopicKind::TransactionDeletes => self.transaction_deletes.state(),
        }
    }

    pub fn subscriber_count(&self, kind: TopicKind) -> usize {
        match kind {
            TopicKind::FundingSourceChanges => self.funding_sources.registry().subscriber_count(),
            TopicKind::TransactionUpserts => self.transaction_upserts.registry().subscriber_count(),
            TopicKind::TransactionDeletes => self.transaction_deletes.registry().subscriber_count(),
        }
    }

    /// Whether `id` is currently registered on `kind`.
    pub fn is_subscribed(&self, kind: TopicKind, id: &str) -> bool {
        match kind {
            TopicKind::FundingSourceChanges => self.funding_sources.registry().contains(id),
            TopicKind::TransactionUpserts => self.transaction_upserts.registry().contains(id),
            TopicKind::TransactionDeletes => self.transaction_deletes.registry().contains(id),
        }
    }
}

impl Drop for SubscriptionService {
    fn drop(&mut self) {
        self.close();
    }
}
