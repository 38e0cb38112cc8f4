//! Per-topic subscriber registry.
//!
//! One mutex guards both the subscriber map and the topic's upstream slot.
//! Nothing that can call out of the crate runs while it is held: delivery
//! takes a snapshot and iterates after release, and cancelling a released
//! handle happens after the guard is dropped.
//!
//! Connection notices are ordered per subscriber by the [`Member`] lock,
//! which is never taken while the registry lock is held. Once a member is
//! told DISCONNECTED, or leaves the registry, it hears nothing more.

use super::subscriber::Subscriber;
use crate::transport::{cancel_once, UpstreamHandle};
use crate::types::{ConnectionState, SubscriberId, TopicState};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::{Mutex, ReentrantMutex};
use std::cell::Cell;
use std::collections::HashMap;
use std::sync::Arc;

/// Last connection notice a member received.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Notice {
    Nothing,
    Connected,
    Ended,
}

/// A registered subscriber and the connection notices it has been sent.
pub(crate) struct Member<S: ?Sized> {
    subscriber: Arc<S>,
    /// Held while notifying; reentrant so a callback may unsubscribe.
    notice: ReentrantMutex<Cell<Notice>>,
}

impl<S: ?Sized> Member<S> {
    fn new(subscriber: Arc<S>) -> Arc<Self> {
        Arc::new(Self {
            subscriber,
            notice: ReentrantMutex::new(Cell::new(Notice::Nothing)),
        })
    }

    pub(crate) fn subscriber(&self) -> &S {
        &self.subscriber
    }

    /// Silence the member without telling it.
    pub(crate) fn retire(&self) {
        self.notice.lock().set(Notice::Ended);
    }
}

impl<S: ?Sized + Subscriber> Member<S> {
    /// Send CONNECTED unless the member already got it or was cut off.
    pub(crate) fn announce(&self) -> bool {
        let notice = self.notice.lock();
        if notice.get() != Notice::Nothing {
            return false;
        }
        notice.set(Notice::Connected);
        self.subscriber.connection_status_changed(ConnectionState::Connected);
        true
    }

    /// Send DISCONNECTED once. Nothing follows it.
    pub(crate) fn cut_off(&self) {
        let notice = self.notice.lock();
        if notice.get() == Notice::Ended {
            return;
        }
        notice.set(Notice::Ended);
        self.subscriber.connection_status_changed(ConnectionState::Disconnected);
    }

    /// Ready the member for an event: announce a live topic it has not
    /// heard about yet. False if it was cut off.
    pub(crate) fn admit_event(&self, established: bool) -> bool {
        let notice = self.notice.lock();
        match notice.get() {
            Notice::Ended => false,
            Notice::Nothing if established => {
                self.announce();
                true
            }
            _ => true,
        }
    }
}

fn retire_all<S: ?Sized>(members: &[Arc<Member<S>>]) {
    for member in members {
        member.retire();
    }
}

/// The topic's single upstream stream, pending or established.
struct Upstream {
    generation: u64,
    /// Filled in once `Transport::open` returns.
    handle: Option<Arc<dyn UpstreamHandle>>,
    established: bool,
    /// Wakes the subscriber that started establishment.
    ack: Option<Sender<()>>,
    /// Dropping this stops the upstream's dispatcher.
    _stop: Sender<()>,
}

struct Inner<S: ?Sized> {
    members: HashMap<SubscriberId, Arc<Member<S>>>,
    upstream: Option<Upstream>,
    next_generation: u64,
}

impl<S: ?Sized> Inner<S> {
    fn snapshot(&self) -> Vec<Arc<Member<S>>> {
        self.members.values().cloned().collect()
    }

    fn drain(&mut self) -> Vec<Arc<Member<S>>> {
        self.members.drain().map(|(_, member)| member).collect()
    }

    fn is_current(&self, generation: u64) -> bool {
        self.upstream
            .as_ref()
            .is_some_and(|upstream| upstream.generation == generation)
    }
}

/// Outcome of registering a subscriber.
pub(crate) enum Registration<S: ?Sized> {
    /// The caller must open the upstream stream.
    Claimed(Claim),
    /// Establishment is already under way.
    Pending,
    /// The upstream stream is live; the new member still needs CONNECTED.
    Active(Arc<Member<S>>),
}

/// Exclusive right to establish one upstream generation.
pub(crate) struct Claim {
    pub(crate) generation: u64,
    pub(crate) ack: Receiver<()>,
    pub(crate) stop: Receiver<()>,
}

/// A generation that just became established.
pub(crate) struct Established<S: ?Sized> {
    pub(crate) members: Vec<Arc<Member<S>>>,
    /// Release the establishing subscriber once everyone has been told.
    pub(crate) ack: Option<Sender<()>>,
}

/// Who an event from the current generation goes to.
pub(crate) struct Snapshot<S: ?Sized> {
    pub(crate) members: Vec<Arc<Member<S>>>,
    pub(crate) established: bool,
}

/// What a released upstream leaves behind.
pub(crate) struct Detached<S: ?Sized> {
    pub(crate) members: Vec<Arc<Member<S>>>,
    pub(crate) handle: Option<Arc<dyn UpstreamHandle>>,
    pub(crate) had_upstream: bool,
}

/// Subscribers of one topic plus the topic's upstream handle.
///
/// Generic over the subscriber kind; `S` is usually a trait object such as
/// `dyn TransactionSubscriber`.
pub struct TopicRegistry<S: ?Sized> {
    inner: Mutex<Inner<S>>,
}

impl<S: ?Sized> TopicRegistry<S> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                members: HashMap::new(),
                upstream: None,
                next_generation: 1,
            }),
        }
    }

    /// Insert or overwrite the subscriber registered under `id`.
    ///
    /// Returns the subscriber it replaced. Never opens an upstream stream.
    pub fn replace_subscriber(
        &self,
        id: impl Into<SubscriberId>,
        subscriber: Arc<S>,
    ) -> Option<Arc<S>> {
        let replaced = self
            .inner
            .lock()
            .members
            .insert(id.into(), Member::new(subscriber))?;
        replaced.retire();
        Some(Arc::clone(&replaced.subscriber))
    }

    /// Remove the subscriber registered under `id`.
    ///
    /// Removing the last subscriber cancels and releases the upstream handle.
    pub fn remove_subscriber(&self, id: &str) -> Option<Arc<S>> {
        let (removed, released) = {
            let mut inner = self.inner.lock();
            let removed = inner.members.remove(id);
            let released = if inner.members.is_empty() {
                inner.upstream.take()
            } else {
                None
            };
            (removed, released)
        };

        if let Some(handle) = released.and_then(|upstream| upstream.handle) {
            cancel_once(handle.as_ref());
        }
        let removed = removed?;
        removed.retire();
        Some(Arc::clone(&removed.subscriber))
    }

    /// Remove every subscriber and release the upstream handle.
    ///
    /// Returns the removed subscribers.
    pub fn remove_all_subscribers(&self) -> Vec<Arc<S>> {
        let detached = self.detach_all();
        if let Some(handle) = detached.handle {
            cancel_once(handle.as_ref());
        }
        retire_all(&detached.members);
        detached
            .members
            .iter()
            .map(|member| Arc::clone(&member.subscriber))
            .collect()
    }

    /// Point-in-time copy of the registered subscribers.
    pub fn current_subscribers(&self) -> Vec<Arc<S>> {
        self.inner
            .lock()
            .members
            .values()
            .map(|member| Arc::clone(&member.subscriber))
            .collect()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().members.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.lock().members.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().members.is_empty()
    }

    pub fn state(&self) -> TopicState {
        match &self.inner.lock().upstream {
            None => TopicState::NoHandle,
            Some(upstream) if upstream.established => TopicState::Active,
            Some(_) => TopicState::Pending,
        }
    }

    // --- Coordinator hooks ---

    /// Register a subscriber and, if the topic has no upstream, claim its
    /// establishment in the same critical section.
    pub(crate) fn register(&self, id: SubscriberId, subscriber: Arc<S>) -> Registration<S> {
        let member = Member::new(subscriber);
        let (registration, replaced) = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            let replaced = inner.members.insert(id, Arc::clone(&member));
            (Self::claim(inner, member), replaced)
        };

        if let Some(replaced) = replaced {
            replaced.retire();
        }
        registration
    }

    fn claim(inner: &mut Inner<S>, member: Arc<Member<S>>) -> Registration<S> {
        if let Some(upstream) = &inner.upstream {
            return if upstream.established {
                Registration::Active(member)
            } else {
                Registration::Pending
            };
        }

        let generation = inner.next_generation;
        inner.next_generation += 1;
        let (ack_tx, ack_rx) = bounded(1);
        let (stop_tx, stop_rx) = bounded(0);
        inner.upstream = Some(Upstream {
            generation,
            handle: None,
            established: false,
            ack: Some(ack_tx),
            _stop: stop_tx,
        });

        Registration::Claimed(Claim {
            generation,
            ack: ack_rx,
            stop: stop_rx,
        })
    }

    /// Store the handle `Transport::open` returned.
    ///
    /// Hands the handle back if its generation was released meanwhile.
    pub(crate) fn attach_handle(
        &self,
        generation: u64,
        handle: Arc<dyn UpstreamHandle>,
    ) -> Result<(), Arc<dyn UpstreamHandle>> {
        let mut inner = self.inner.lock();
        match inner.upstream.as_mut() {
            Some(upstream) if upstream.generation == generation => {
                upstream.handle = Some(handle);
                Ok(())
            }
            _ => Err(handle),
        }
    }

    /// Move a pending generation to established.
    ///
    /// `None` if the generation is stale or was already established.
    pub(crate) fn mark_established(&self, generation: u64) -> Option<Established<S>> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let upstream = inner
            .upstream
            .as_mut()
            .filter(|upstream| upstream.generation == generation && !upstream.established)?;

        upstream.established = true;
        let ack = upstream.ack.take();
        Some(Established {
            members: inner.snapshot(),
            ack,
        })
    }

    /// Snapshot for delivering an event from `generation`.
    pub(crate) fn snapshot_for(&self, generation: u64) -> Option<Snapshot<S>> {
        let inner = self.inner.lock();
        let upstream = inner
            .upstream
            .as_ref()
            .filter(|upstream| upstream.generation == generation)?;
        Some(Snapshot {
            established: upstream.established,
            members: inner.snapshot(),
        })
    }

    /// Release `generation` and drain every member. `None` if stale.
    pub(crate) fn detach(&self, generation: u64) -> Option<Detached<S>> {
        let mut inner = self.inner.lock();
        if !inner.is_current(generation) {
            return None;
        }
        let upstream = inner.upstream.take();
        Some(Detached {
            members: inner.drain(),
            handle: upstream.and_then(|upstream| upstream.handle),
            had_upstream: true,
        })
    }

    /// Release whatever upstream exists and drain every member.
    pub(crate) fn detach_all(&self) -> Detached<S> {
        let mut inner = self.inner.lock();
        let upstream = inner.upstream.take();
        Detached {
            members: inner.drain(),
            had_upstream: upstream.is_some(),
            handle: upstream.and_then(|upstream| upstream.handle),
        }
    }
}

impl<S: ?Sized> Default for TopicRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
