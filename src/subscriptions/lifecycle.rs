//! Connect and disconnect transitions.
//!
//! Disconnection is destructive: the topic's subscribers are told and then
//! dropped, and the upstream handle is released. Nothing reconnects on its
//! own; a later subscribe starts a fresh generation.

use super::coordinator::TopicShared;
use super::registry::Member;
use super::subscriber::Subscriber;
use super::topics::TopicSpec;
use crate::transport::cancel_once;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why an upstream generation ended.
#[derive(Clone, Debug)]
pub(crate) enum DisconnectReason {
    /// The server completed the stream.
    Completed,
    /// The transport reported a failure.
    Failed(String),
    /// Every signal sink was dropped without a terminal signal.
    SinkDropped,
    /// The stream could not be opened.
    OpenFailed(String),
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisconnectReason::Completed => f.write_str("completed"),
            DisconnectReason::Failed(reason) => write!(f, "failed: {reason}"),
            DisconnectReason::SinkDropped => f.write_str("signal sink dropped"),
            DisconnectReason::OpenFailed(reason) => write!(f, "open failed: {reason}"),
        }
    }
}

fn cut_off<S>(members: &[Arc<Member<S>>])
where
    S: ?Sized + Subscriber,
{
    for member in members {
        member.cut_off();
    }
}

/// The transport confirmed `generation`.
pub(crate) fn connected<T: TopicSpec>(topic: &TopicShared<T>, generation: u64) {
    let kind = topic.spec.kind();
    let Some(established) = topic.registry.mark_established(generation) else {
        debug!(topic = %kind, generation, "ignoring establishment of released upstream");
        return;
    };

    info!(
        topic = %kind,
        generation,
        subscribers = established.members.len(),
        "upstream established"
    );
    for member in &established.members {
        member.announce();
    }
    if let Some(ack) = established.ack {
        let _ = ack.try_send(());
    }
}

/// `generation` ended; tear the topic down if it is still current.
pub(crate) fn disconnect<T: TopicSpec>(
    topic: &TopicShared<T>,
    generation: u64,
    reason: DisconnectReason,
) {
    let kind = topic.spec.kind();
    match &reason {
        DisconnectReason::Failed(_) | DisconnectReason::OpenFailed(_) => {
            warn!(topic = %kind, generation, %reason, "upstream lost")
        }
        _ => info!(topic = %kind, generation, %reason, "upstream ended"),
    }

    let Some(detached) = topic.registry.detach(generation) else {
        debug!(topic = %kind, generation, "upstream already released");
        return;
    };

    if let Some(handle) = detached.handle {
        cancel_once(handle.as_ref());
    }
    cut_off(&detached.members);
}

/// Drop every subscriber and release the upstream, whatever its generation.
pub(crate) fn tear_down<T: TopicSpec>(topic: &TopicShared<T>) {
    let detached = topic.registry.detach_all();
    if let Some(handle) = detached.handle {
        cancel_once(handle.as_ref());
    }

    if detached.had_upstream {
        info!(
            topic = %topic.spec.kind(),
            subscribers = detached.members.len(),
            "topic torn down"
        );
        cut_off(&detached.members);
    } else {
        for member in &detached.members {
            member.retire();
        }
    }
}
