//! Receivers that do a minimal amount of work per message.

use std::{
    cell::Cell,
    sync::atomic::{AtomicU64, Ordering},
};

use potion::{HandlerResult, Receiver};

use crate::messages::{Collision, Damage};

/// Counts messages on a single thread.
#[derive(Default)]
pub struct Counter {
    seen: Cell<u64>,
}

impl Counter {
    pub fn seen(&self) -> u64 {
        self.seen.get()
    }
}

impl Receiver<Damage> for Counter {
    #[inline]
    fn handle(&self, _message: &Damage) -> HandlerResult {
        self.seen.set(self.seen.get() + 1);
        Ok(())
    }
}

impl Receiver<Collision> for Counter {
    #[inline]
    fn handle(&self, _message: &Collision) -> HandlerResult {
        self.seen.set(self.seen.get() + 1);
        Ok(())
    }
}

/// Counts messages from any thread.
#[derive(Default)]
pub struct SharedCounter {
    seen: AtomicU64,
}

impl SharedCounter {
    pub fn seen(&self) -> u64 {
        self.seen.load(Ordering::Relaxed)
    }
}

impl Receiver<Damage> for SharedCounter {
    #[inline]
    fn handle(&self, _message: &Damage) -> HandlerResult {
        self.seen.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl Receiver<Collision> for SharedCounter {
    #[inline]
    fn handle(&self, _message: &Collision) -> HandlerResult {
        self.seen.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
