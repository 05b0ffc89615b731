//! # Log sink trait.
//!
//! Provides [`Subscribe`], the extension point receiving the supervisor's
//! lifecycle [`Event`]s, and [`SubscribeFn`], a closure-backed implementation.
//!
//! ## Rules
//! - `on_event` runs inline on the thread calling `Supervisor::evaluate`.
//! - Sinks are purely observational: keep them fast and do not panic
//!   (wrap sinks in a [`SubscriberSet`](crate::SubscriberSet) to isolate panics).
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tickvisor::{Event, EventKind, Subscribe};
//!
//! struct Audit;
//!
//! impl Subscribe for Audit {
//!     fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::ObjectiveFaulted) {
//!             eprintln!("audit: {ev}");
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "audit" }
//! }
//!
//! let sink: Arc<dyn Subscribe> = Arc::new(Audit);
//! # let _ = sink;
//! ```

use std::sync::Arc;

use crate::events::Event;

/// Receiver of supervisor lifecycle events.
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in diagnostics.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Closure-backed sink.
pub struct SubscribeFn<F> {
    name: &'static str,
    f: F,
}

impl<F> SubscribeFn<F>
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }

    /// Creates the sink and returns it as a shared handle.
    pub fn arc(name: &'static str, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> Subscribe for SubscribeFn<F>
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    fn on_event(&self, event: &Event) {
        (self.f)(event)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
