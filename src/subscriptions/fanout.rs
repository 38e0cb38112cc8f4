//! Per-upstream dispatcher: decodes pushed events and hands them to the
//! topic's subscribers.
//!
//! Each upstream generation gets one dispatcher thread draining its signal
//! queue, so a subscriber sees a topic's events in arrival order.

use super::coordinator::TopicShared;
use super::lifecycle::{self, DisconnectReason};
use super::topics::TopicSpec;
use crate::transport::StreamSignal;
use crossbeam_channel::{select, Receiver};
use serde_json::Value;
use std::sync::Arc;
use tracing::{trace, warn};

/// Drain `signals` until the stream ends or the upstream is released.
pub(crate) fn run<T: TopicSpec>(
    topic: Arc<TopicShared<T>>,
    generation: u64,
    signals: Receiver<StreamSignal>,
    stop: Receiver<()>,
) {
    loop {
        select! {
            recv(signals) -> signal => match signal {
                Ok(StreamSignal::Established) => lifecycle::connected(&topic, generation),
                Ok(StreamSignal::Event(body)) => deliver(&topic, generation, body),
                Ok(StreamSignal::Completed) => {
                    lifecycle::disconnect(&topic, generation, DisconnectReason::Completed);
                    break;
                }
                Ok(StreamSignal::Failed(reason)) => {
                    lifecycle::disconnect(&topic, generation, DisconnectReason::Failed(reason));
                    break;
                }
                Err(_) => {
                    lifecycle::disconnect(&topic, generation, DisconnectReason::SinkDropped);
                    break;
                }
            },
            // Never sent on; disconnects when the upstream is released.
            recv(stop) -> _ => break,
        }
    }
    trace!(topic = %topic.spec.kind(), generation, "dispatcher stopped");
}

/// Pull the record body out of an event, if it carries one.
fn record_body(mut event: Value, field: &str) -> Option<Value> {
    match event.get_mut(field).map(Value::take) {
        None | Some(Value::Null) => None,
        Some(body) => Some(body),
    }
}

fn deliver<T: TopicSpec>(topic: &TopicShared<T>, generation: u64, event: Value) {
    let kind = topic.spec.kind();
    let Some(body) = record_body(event, kind.response_field()) else {
        trace!(topic = %kind, generation, "discarding event without record");
        return;
    };

    let record = match topic.spec.decode(body, topic.unsealer.as_ref()) {
        Ok(record) => record,
        Err(e) => {
            warn!(topic = %kind, generation, error = %e, "discarding undecodable event");
            return;
        }
    };

    let Some(snapshot) = topic.registry.snapshot_for(generation) else {
        return;
    };
    for member in &snapshot.members {
        if member.admit_event(snapshot.established) {
            topic.spec.deliver(&record, member.subscriber());
        }
    }
}
