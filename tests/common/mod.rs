//! Shared fakes for integration tests.

#![allow(dead_code)]

use cardstream::{
    ChangeType, ConnectionState, FundingSource, FundingSourceSubscriber, HubConfig, Result,
    SealedAttribute, SignalSink, StaticIdentity, StreamRequest, Subscriber, SubscriptionService,
    Transaction, TransactionSubscriber, Transport, UnsealError, Unsealer, UpstreamHandle,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const WAIT: Duration = Duration::from_secs(2);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Poll `condition` until it holds or `WAIT` passes.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

// --- Transport ---

#[derive(Default)]
pub struct FakeHandle {
    cancelled: AtomicBool,
    cancels: AtomicUsize,
}

impl FakeHandle {
    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

impl UpstreamHandle for FakeHandle {
    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

pub struct OpenedStream {
    pub request: StreamRequest,
    pub sink: SignalSink,
    pub handle: Arc<FakeHandle>,
}

/// Transport that records every `open` and lets tests drive the streams.
#[derive(Default)]
pub struct FakeTransport {
    /// Signal `Established` from inside `open`.
    auto_establish: bool,
    /// Reject every `open`.
    reject: AtomicBool,
    opened: Mutex<Vec<OpenedStream>>,
}

impl FakeTransport {
    pub fn manual() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn auto_establish() -> Arc<Self> {
        Arc::new(Self {
            auto_establish: true,
            ..Default::default()
        })
    }

    pub fn reject_opens(&self) {
        self.reject.store(true, Ordering::SeqCst);
    }

    pub fn open_count(&self) -> usize {
        self.opened.lock().len()
    }

    pub fn requests(&self) -> Vec<StreamRequest> {
        self.opened.lock().iter().map(|s| s.request.clone()).collect()
    }

    pub fn sink(&self, index: usize) -> SignalSink {
        self.opened.lock()[index].sink.clone()
    }

    pub fn handle(&self, index: usize) -> Arc<FakeHandle> {
        Arc::clone(&self.opened.lock()[index].handle)
    }

    /// Sink of the most recent stream of `operation`.
    pub fn latest_sink(&self, operation: &str) -> SignalSink {
        self.opened
            .lock()
            .iter()
            .rev()
            .find(|s| s.request.operation_name() == operation)
            .map(|s| s.sink.clone())
            .expect("no stream opened for operation")
    }

    /// Streams not cancelled by the hub.
    pub fn live_count(&self) -> usize {
        self.opened
            .lock()
            .iter()
            .filter(|s| !s.handle.is_cancelled())
            .count()
    }

    pub fn max_cancel_count(&self) -> usize {
        self.opened
            .lock()
            .iter()
            .map(|s| s.handle.cancel_count())
            .max()
            .unwrap_or(0)
    }
}

impl Transport for FakeTransport {
    fn open(&self, request: StreamRequest, sink: SignalSink) -> Result<Arc<dyn UpstreamHandle>> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(cardstream::FeedError::Transport("connection refused".to_string()));
        }
        if self.auto_establish {
            sink.established();
        }
        let handle = Arc::new(FakeHandle::default());
        self.opened.lock().push(OpenedStream {
            request,
            sink,
            handle: Arc::clone(&handle),
        });
        Ok(handle)
    }
}

// --- Unsealing ---

/// "Sealed" data is the plain text itself unless the key id is "corrupt".
pub struct FakeUnsealer;

impl Unsealer for FakeUnsealer {
    fn unseal(&self, sealed: &SealedAttribute) -> std::result::Result<String, UnsealError> {
        if sealed.key_id == "corrupt" {
            return Err(UnsealError::Integrity("bad tag".to_string()));
        }
        Ok(sealed.base64_encoded_sealed_data.clone())
    }
}

pub fn sealed(value: &str) -> Value {
    json!({
        "keyId": "k1",
        "algorithm": "AES/CBC/PKCS7Padding",
        "plainTextType": "string",
        "base64EncodedSealedData": value
    })
}

pub fn funding_source_event(id: &str, version: u64) -> Value {
    json!({
        "onFundingSourceUpdate": {
            "id": id,
            "owner": "user-1",
            "version": version,
            "createdAtEpochMs": 1.0,
            "updatedAtEpochMs": 2.0,
            "state": "ACTIVE",
            "currency": "USD",
            "last4": "4242",
            "network": "VISA"
        }
    })
}

pub fn transaction_body(id: &str, description: &str) -> Value {
    json!({
        "id": id,
        "owner": "user-1",
        "version": 1,
        "createdAtEpochMs": 1.0,
        "updatedAtEpochMs": 2.0,
        "sequenceId": "seq-1",
        "cardId": "card-1",
        "type": "PENDING",
        "billedAmount": { "currency": sealed("USD"), "amount": sealed("1250") },
        "transactedAmount": { "currency": sealed("USD"), "amount": sealed("1250") },
        "description": sealed(description)
    })
}

pub fn transaction_upsert_event(id: &str, description: &str) -> Value {
    json!({ "onTransactionUpdate": transaction_body(id, description) })
}

pub fn transaction_delete_event(id: &str) -> Value {
    json!({ "onTransactionDelete": transaction_body(id, "deleted") })
}

pub fn test_config() -> HubConfig {
    HubConfig {
        establish_timeout: Duration::from_millis(500),
        ..Default::default()
    }
}

pub fn service_with(transport: Arc<FakeTransport>) -> SubscriptionService {
    init_tracing();
    SubscriptionService::new(
        transport,
        Arc::new(StaticIdentity::signed_in("user-1")),
        Arc::new(FakeUnsealer),
        test_config(),
    )
}

// --- Subscribers ---

/// Records every callback in order.
#[derive(Default)]
pub struct Recorder {
    pub states: Mutex<Vec<ConnectionState>>,
    pub funding_sources: Mutex<Vec<FundingSource>>,
    pub transactions: Mutex<Vec<(Transaction, ChangeType)>>,
    pub legacy_upserts: Mutex<Vec<Transaction>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn states(&self) -> Vec<ConnectionState> {
        self.states.lock().clone()
    }

    pub fn funding_source_versions(&self) -> Vec<u64> {
        self.funding_sources.lock().iter().map(|f| f.version).collect()
    }

    pub fn transaction_ids(&self) -> Vec<(String, ChangeType)> {
        self.transactions
            .lock()
            .iter()
            .map(|(tx, change)| (tx.id.clone(), *change))
            .collect()
    }
}

impl Subscriber for Recorder {
    fn connection_status_changed(&self, state: ConnectionState) {
        self.states.lock().push(state);
    }
}

impl FundingSourceSubscriber for Recorder {
    fn funding_source_changed(&self, funding_source: &FundingSource) {
        self.funding_sources.lock().push(funding_source.clone());
    }
}

impl TransactionSubscriber for Recorder {
    fn transaction_changed(&self, transaction: &Transaction, change: ChangeType) {
        self.transactions.lock().push((transaction.clone(), change));
    }

    fn transaction_upserted(&self, transaction: &Transaction) {
        self.legacy_upserts.lock().push(transaction.clone());
    }
}
