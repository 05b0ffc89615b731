//! # Ordered fan-out to multiple sinks.
//!
//! [`SubscriberSet`] is itself a [`Subscribe`]: it forwards every event to
//! each member in registration order.
//!
//! ## Panic handling
//! Each delivery runs under `catch_unwind`; a panicking sink is skipped for
//! that event and counted in [`SubscriberSet::panicked`], so a faulty sink
//! never changes the supervisor's control flow.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a sink panics while holding a lock.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Fan-out coordinator for multiple sinks.
pub struct SubscriberSet {
    subs: Vec<Arc<dyn Subscribe>>,
    panicked: AtomicU64,
}

impl SubscriberSet {
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self {
            subs,
            panicked: AtomicU64::new(0),
        }
    }

    /// Delivers `event` to every member, in order.
    pub fn emit(&self, event: &Event) {
        for sub in &self.subs {
            if catch_unwind(AssertUnwindSafe(|| sub.on_event(event))).is_err() {
                self.panicked.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Number of deliveries that panicked so far.
    pub fn panicked(&self) -> u64 {
        self.panicked.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.subs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }
}

impl Subscribe for SubscriberSet {
    fn on_event(&self, event: &Event) {
        self.emit(event);
    }

    fn name(&self) -> &'static str {
        "subscriber-set"
    }
}
