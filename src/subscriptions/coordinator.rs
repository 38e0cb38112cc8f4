//! Establishes each topic's upstream stream exactly once.

use super::fanout;
use super::lifecycle::{self, DisconnectReason};
use super::registry::{Claim, Registration, TopicRegistry};
use super::topics::TopicSpec;
use crate::config::HubConfig;
use crate::error::{FeedError, Result};
use crate::transport::{cancel_once, SignalSink, StreamRequest, Transport};
use crate::types::{SubscriberId, TopicState};
use crate::unseal::Unsealer;
use crossbeam_channel::{unbounded, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

/// State shared between a topic's coordinator and its dispatcher threads.
pub(crate) struct TopicShared<T: TopicSpec> {
    pub(crate) spec: T,
    pub(crate) registry: TopicRegistry<T::Subscriber>,
    pub(crate) unsealer: Arc<dyn Unsealer>,
}

/// Owns one topic: registers subscribers and opens the upstream stream
/// when the first one arrives.
pub(crate) struct Coordinator<T: TopicSpec> {
    shared: Arc<TopicShared<T>>,
    transport: Arc<dyn Transport>,
    config: Arc<HubConfig>,
}

impl<T: TopicSpec> Coordinator<T> {
    pub(crate) fn new(
        spec: T,
        transport: Arc<dyn Transport>,
        unsealer: Arc<dyn Unsealer>,
        config: Arc<HubConfig>,
    ) -> Self {
        Self {
            shared: Arc::new(TopicShared {
                spec,
                registry: TopicRegistry::new(),
                unsealer,
            }),
            transport,
            config,
        }
    }

    pub(crate) fn registry(&self) -> &TopicRegistry<T::Subscriber> {
        &self.shared.registry
    }

    pub(crate) fn state(&self) -> TopicState {
        self.shared.registry.state()
    }

    /// Register `subscriber` and make sure an upstream scoped to `owner`
    /// exists or is being established.
    ///
    /// Blocks only when this call opens the upstream, until the transport
    /// confirms it, reports failure, or the establish timeout passes.
    pub(crate) fn subscribe(
        &self,
        owner: &str,
        id: SubscriberId,
        subscriber: Arc<T::Subscriber>,
    ) -> Result<()> {
        let kind = self.shared.spec.kind();
        match self.shared.registry.register(id.clone(), subscriber) {
            Registration::Active(member) => {
                debug!(topic = %kind, subscriber = %id, "joined live topic");
                member.announce();
                Ok(())
            }
            Registration::Pending => {
                debug!(topic = %kind, subscriber = %id, "joined pending topic");
                Ok(())
            }
            Registration::Claimed(claim) => {
                debug!(topic = %kind, subscriber = %id, generation = claim.generation, "opening topic");
                self.establish(owner, claim)
            }
        }
    }

    fn establish(&self, owner: &str, claim: Claim) -> Result<()> {
        let kind = self.shared.spec.kind();
        let Claim {
            generation,
            ack,
            stop,
        } = claim;

        // The dispatcher must be listening before the transport can signal.
        let (sender, signals) = unbounded();
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(format!("{}-{}", self.config.thread_name_prefix, kind))
            .spawn(move || fanout::run(shared, generation, signals, stop));
        if let Err(e) = spawned {
            lifecycle::disconnect(
                &self.shared,
                generation,
                DisconnectReason::OpenFailed(e.to_string()),
            );
            return Err(FeedError::Io(e));
        }

        info!(topic = %kind, generation, "opening upstream");
        let request = StreamRequest::new(kind, owner);
        match self.transport.open(request, SignalSink::new(sender)) {
            Ok(handle) => {
                if let Err(orphan) = self.shared.registry.attach_handle(generation, handle) {
                    debug!(topic = %kind, generation, "topic released while opening; cancelling");
                    cancel_once(orphan.as_ref());
                }
            }
            Err(e) => {
                // Reported through the subscribers' connection state.
                lifecycle::disconnect(
                    &self.shared,
                    generation,
                    DisconnectReason::OpenFailed(e.to_string()),
                );
                return Ok(());
            }
        }

        match ack.recv_timeout(self.config.establish_timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {}
            Err(RecvTimeoutError::Timeout) => {
                let timeout_ms =
                    u64::try_from(self.config.establish_timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(topic = %kind, generation, timeout_ms, "upstream not confirmed in time");
            }
        }
        Ok(())
    }

    pub(crate) fn unsubscribe(&self, id: &str) {
        if self.shared.registry.remove_subscriber(id).is_some() {
            debug!(topic = %self.shared.spec.kind(), subscriber = id, "unsubscribed");
        }
    }

    pub(crate) fn unsubscribe_all(&self) {
        lifecycle::tear_down(&self.shared);
    }
}
