//! Benchmark utilities for Potion.
//!
//! Provides representative message types and receivers, plus helpers that build buses
//! with a given fan-out, for the Criterion benchmarks under `benches/`.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p potion_bench
//!
//! # Run a specific benchmark group
//! cargo bench -p potion_bench -- dispatch
//! ```
//!
//! Results are written to `target/criterion/` with HTML reports.

pub mod messages;
pub mod receivers;

use std::{rc::Rc, sync::Arc};

use potion::{Bus, SharedBus};

use crate::{
    messages::{Collision, Damage},
    receivers::{Counter, SharedCounter},
};

/// A bus with `fanout` counters subscribed to [`Damage`] and [`Collision`].
///
/// The counters are returned so they stay alive for the duration of the benchmark.
pub fn local_bus(fanout: usize) -> (Bus, Vec<Rc<Counter>>) {
    let mut bus = Bus::new();
    let counters: Vec<_> = (0..fanout).map(|_| Rc::new(Counter::default())).collect();
    for counter in &counters {
        bus.subscribe::<Damage, _>(counter);
        bus.subscribe::<Collision, _>(counter);
    }
    (bus, counters)
}

/// The thread-safe counterpart of [`local_bus`].
pub fn shared_bus(fanout: usize) -> (SharedBus, Vec<Arc<SharedCounter>>) {
    let bus = SharedBus::new();
    let counters: Vec<_> = (0..fanout)
        .map(|_| Arc::new(SharedCounter::default()))
        .collect();
    for counter in &counters {
        bus.subscribe::<Damage, _>(counter);
        bus.subscribe::<Collision, _>(counter);
    }
    (bus, counters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_bus_has_requested_fanout() {
        // Given
        let (bus, counters) = local_bus(8);

        // When
        let delivered = bus.dispatch(Damage::default()).unwrap();

        // Then
        assert_eq!(delivered, 8);
        assert!(counters.iter().all(|counter| counter.seen() == 1));
    }

    #[test]
    fn shared_bus_has_requested_fanout() {
        // Given
        let (bus, counters) = shared_bus(8);

        // When
        let delivered = bus.dispatch(Collision::default()).unwrap();

        // Then
        assert_eq!(delivered, 8);
        assert!(counters.iter().all(|counter| counter.seen() == 1));
    }
}
