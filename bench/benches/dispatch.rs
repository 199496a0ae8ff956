//! Bus microbenchmarks using Criterion.
//!
//! These benchmarks measure individual bus operations in isolation:
//! - Dispatch fan-out on the single-threaded and shared buses
//! - Subscribe/unsubscribe churn
//! - Dispatch with no listeners under a lenient configuration

use std::rc::Rc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use potion::{Bus, Config};
use potion_bench::{
    local_bus,
    messages::{Collision, Damage},
    receivers::Counter,
    shared_bus,
};

// =============================================================================
// Dispatch Benchmarks
// =============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    for fanout in [1, 10, 100, 1_000] {
        group.throughput(Throughput::Elements(fanout as u64));

        group.bench_with_input(BenchmarkId::new("local", fanout), &fanout, |b, &n| {
            let (bus, _counters) = local_bus(n);
            b.iter(|| black_box(bus.dispatch(Damage::default())));
        });

        group.bench_with_input(BenchmarkId::new("shared", fanout), &fanout, |b, &n| {
            let (bus, _counters) = shared_bus(n);
            b.iter(|| black_box(bus.dispatch(Collision::default())));
        });
    }

    group.finish();
}

fn bench_dispatch_without_listener(c: &mut Criterion) {
    let bus = Bus::with_config(Config::lenient());

    c.bench_function("dispatch/no_listener", |b| {
        b.iter(|| black_box(bus.dispatch(Damage::default())));
    });
}

// =============================================================================
// Subscription Benchmarks
// =============================================================================

fn bench_subscription_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("subscription");

    for existing in [0, 10, 100] {
        group.bench_with_input(
            BenchmarkId::new("subscribe_unsubscribe", existing),
            &existing,
            |b, &n| {
                let (mut bus, _counters) = local_bus(n);
                let churner = Rc::new(Counter::default());
                b.iter(|| {
                    bus.subscribe::<Damage, _>(&churner);
                    black_box(bus.unsubscribe::<Damage, _>(&churner))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_dispatch,
    bench_dispatch_without_listener,
    bench_subscription_churn
);
criterion_main!(benches);
