//! Fan-out benchmarks for the subscription service.

use cardstream::{
    ConnectionState, FundingSource, FundingSourceSubscriber, HubConfig, Result, SealedAttribute,
    SignalSink, StaticIdentity, StreamRequest, Subscriber, SubscriptionService, Transport,
    UnsealError, Unsealer, UpstreamHandle,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Handle(AtomicBool);

impl UpstreamHandle for Handle {
    fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Establishes immediately and keeps the sink for the benchmark to drive.
#[derive(Default)]
struct LoopbackTransport {
    sink: Mutex<Option<SignalSink>>,
}

impl Transport for LoopbackTransport {
    fn open(&self, _request: StreamRequest, sink: SignalSink) -> Result<Arc<dyn UpstreamHandle>> {
        sink.established();
        *self.sink.lock() = Some(sink);
        Ok(Arc::new(Handle::default()))
    }
}

struct PassThrough;

impl Unsealer for PassThrough {
    fn unseal(&self, sealed: &SealedAttribute) -> std::result::Result<String, UnsealError> {
        Ok(sealed.base64_encoded_sealed_data.clone())
    }
}

/// Counts deliveries across all subscribers.
struct Counter(Arc<AtomicU64>);

impl Subscriber for Counter {
    fn connection_status_changed(&self, _state: ConnectionState) {}
}

impl FundingSourceSubscriber for Counter {
    fn funding_source_changed(&self, _funding_source: &FundingSource) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

fn event(version: u64) -> Value {
    json!({
        "onFundingSourceUpdate": {
            "id": "fs-1",
            "owner": "user-1",
            "version": version,
            "createdAtEpochMs": 1.0,
            "updatedAtEpochMs": 2.0,
            "state": "ACTIVE",
            "currency": "USD",
            "last4": "4242",
            "network": "VISA",
            "institutionName": {
                "keyId": "k1",
                "algorithm": "AES/CBC/PKCS7Padding",
                "base64EncodedSealedData": "First Bank"
            }
        }
    })
}

/// Benchmark one event delivered to a growing number of subscribers
fn bench_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("fanout");

    for subscribers in [1u64, 10, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::new("subscribers", subscribers),
            &subscribers,
            |b, &count| {
                let transport = Arc::new(LoopbackTransport::default());
                let service = SubscriptionService::new(
                    transport.clone(),
                    Arc::new(StaticIdentity::signed_in("user-1")),
                    Arc::new(PassThrough),
                    HubConfig::default(),
                );
                let delivered = Arc::new(AtomicU64::new(0));
                for i in 0..count {
                    service
                        .subscribe_to_funding_sources(
                            format!("s{i}"),
                            Arc::new(Counter(Arc::clone(&delivered))),
                        )
                        .unwrap();
                }
                let sink = transport.sink.lock().clone().unwrap();

                let mut version = 0;
                b.iter(|| {
                    version += 1;
                    let target = delivered.load(Ordering::Relaxed) + count;
                    sink.event(event(version));
                    while delivered.load(Ordering::Relaxed) < target {
                        std::hint::spin_loop();
                    }
                });

                service.close();
            },
        );
    }

    group.finish();
}

/// Benchmark subscribe/unsubscribe churn on a live topic
fn bench_churn(c: &mut Criterion) {
    let transport = Arc::new(LoopbackTransport::default());
    let service = SubscriptionService::new(
        transport,
        Arc::new(StaticIdentity::signed_in("user-1")),
        Arc::new(PassThrough),
        HubConfig::default(),
    );
    let delivered = Arc::new(AtomicU64::new(0));
    service
        .subscribe_to_funding_sources("anchor", Arc::new(Counter(Arc::clone(&delivered))))
        .unwrap();

    c.bench_function("subscribe_unsubscribe", |b| {
        b.iter(|| {
            service
                .subscribe_to_funding_sources("churn", Arc::new(Counter(Arc::clone(&delivered))))
                .unwrap();
            service.unsubscribe_from_funding_sources("churn");
        });
    });
}

criterion_group!(benches, bench_fanout, bench_churn);
criterion_main!(benches);
