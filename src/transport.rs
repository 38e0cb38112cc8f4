//! Streaming transport contract.
//!
//! The hub never speaks the wire protocol itself. A [`Transport`] opens one
//! named server subscription per [`StreamRequest`] and reports everything
//! that happens on it through a [`SignalSink`]:
//!
//! ```ignore
//! impl Transport for MyTransport {
//!     fn open(&self, request: StreamRequest, sink: SignalSink) -> Result<Arc<dyn UpstreamHandle>> {
//!         let stream = self.client.subscribe(request.operation_name(), request.variables())?;
//!         stream.on_started(move || { sink.established(); });
//!         // ...
//!         Ok(Arc::new(stream.handle()))
//!     }
//! }
//! ```

use crate::error::Result;
use crate::types::TopicKind;
use crossbeam_channel::Sender;
use serde_json::{json, Value};
use std::sync::Arc;

/// Parameters for opening one upstream stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamRequest {
    pub kind: TopicKind,
    /// Subject of the principal the stream is scoped to.
    pub owner: String,
}

impl StreamRequest {
    pub fn new(kind: TopicKind, owner: impl Into<String>) -> Self {
        Self {
            kind,
            owner: owner.into(),
        }
    }

    pub fn operation_name(&self) -> &'static str {
        self.kind.operation_name()
    }

    /// Variables for the server subscription operation.
    pub fn variables(&self) -> Value {
        json!({ "owner": self.owner })
    }
}

/// Everything a transport can report about one upstream stream.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamSignal {
    /// The server acknowledged the subscription.
    Established,
    /// A pushed event body, keyed by the operation's response field.
    Event(Value),
    /// The server ended the stream normally.
    Completed,
    /// The stream broke.
    Failed(String),
}

/// Sending half of an upstream's signal queue.
///
/// Clones share one queue; once every clone is dropped the stream counts
/// as completed.
#[derive(Clone, Debug)]
pub struct SignalSink {
    sender: Sender<StreamSignal>,
}

impl SignalSink {
    pub(crate) fn new(sender: Sender<StreamSignal>) -> Self {
        Self { sender }
    }

    /// Queue a signal. Returns false if the hub no longer listens.
    pub fn send(&self, signal: StreamSignal) -> bool {
        self.sender.send(signal).is_ok()
    }

    pub fn established(&self) -> bool {
        self.send(StreamSignal::Established)
    }

    pub fn event(&self, body: Value) -> bool {
        self.send(StreamSignal::Event(body))
    }

    pub fn completed(&self) -> bool {
        self.send(StreamSignal::Completed)
    }

    pub fn failed(&self, reason: impl Into<String>) -> bool {
        self.send(StreamSignal::Failed(reason.into()))
    }
}

/// Transport-level reference to one open stream.
pub trait UpstreamHandle: Send + Sync {
    fn cancel(&self);

    fn is_cancelled(&self) -> bool;
}

/// Opens upstream streams.
pub trait Transport: Send + Sync {
    /// Start a server subscription.
    ///
    /// Must not block on the server's acknowledgement; that arrives later as
    /// [`StreamSignal::Established`]. An error here means the request was
    /// never issued.
    fn open(&self, request: StreamRequest, sink: SignalSink) -> Result<Arc<dyn UpstreamHandle>>;
}

/// Cancel a handle unless it already is.
pub(crate) fn cancel_once(handle: &dyn UpstreamHandle) {
    if !handle.is_cancelled() {
        handle.cancel();
    }
}
