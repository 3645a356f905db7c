//! Criterion micro-benchmarks for the discovery poll path.
//!
//! The poll loop calls every request manager on every turn, so the idle
//! paths must stay cheap:
//! - Known coordinator
//! - Unknown with a lookup in flight
//! - Unknown and waiting out the backoff
//!
//! Run with: `cargo bench --bench poll_bench`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use findcoord::client::{
    ClientError, CoordinatorRequestManager, DisconnectTracker, DiscoveryConfig,
    ExponentialBackoff, RequestCompletion,
};
use findcoord::protocol::FindCoordinatorResponseData;

fn manager() -> CoordinatorRequestManager {
    CoordinatorRequestManager::new(DiscoveryConfig::new("bench-group"))
        .expect("valid bench config")
}

fn known_manager() -> CoordinatorRequestManager {
    let mut manager = manager();
    manager.poll(0);
    manager.on_complete(RequestCompletion::Response {
        response: FindCoordinatorResponseData::legacy_success(1, "h", 9092),
        received_time_ms: 0,
    });
    manager
}

fn in_flight_manager() -> CoordinatorRequestManager {
    let mut manager = manager();
    manager.poll(0);
    manager
}

fn backing_off_manager() -> CoordinatorRequestManager {
    let mut manager = manager();
    manager.poll(0);
    manager.on_complete(RequestCompletion::Failed {
        error: ClientError::Network("refused".to_string()),
        completion_time_ms: 0,
    });
    manager
}

fn bench_idle_poll(c: &mut Criterion) {
    let mut group = c.benchmark_group("idle_poll");

    let cases: [(&str, fn() -> CoordinatorRequestManager); 3] = [
        ("known", known_manager),
        ("in_flight", in_flight_manager),
        ("backing_off", backing_off_manager),
    ];

    for (name, build) in cases {
        let mut manager = build();
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| black_box(manager.poll(black_box(1))))
        });
    }

    group.finish();
}

fn bench_discovery_round_trip(c: &mut Criterion) {
    c.bench_function("discovery_round_trip", |b| {
        b.iter(|| {
            let mut manager = manager();
            let result = manager.poll(0);
            manager.on_complete(RequestCompletion::Response {
                response: FindCoordinatorResponseData::legacy_success(1, "h", 9092),
                received_time_ms: 1,
            });
            black_box((result, manager.coordinator().is_some()))
        })
    });
}

fn bench_backoff(c: &mut Criterion) {
    let mut group = c.benchmark_group("backoff");
    for jitter in [0.0, 0.2] {
        let backoff = ExponentialBackoff::new(100, 2, 1000, jitter);
        group.bench_with_input(BenchmarkId::new("attempts_5", jitter), &jitter, |b, _| {
            b.iter(|| black_box(backoff.backoff(black_box(5))))
        });
    }
    group.finish();
}

fn bench_disconnect_observe(c: &mut Criterion) {
    c.bench_function("disconnect_observe", |b| {
        let mut tracker = DisconnectTracker::new(60_000);
        tracker.start(0);
        let mut now = 0u64;
        b.iter(|| {
            now += 1;
            black_box(tracker.observe(now))
        })
    });
}

criterion_group!(
    benches,
    bench_idle_poll,
    bench_discovery_round_trip,
    bench_backoff,
    bench_disconnect_observe
);
criterion_main!(benches);
