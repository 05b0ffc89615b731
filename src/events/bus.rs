//! # Event bus for observing the supervisor from async code.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. It implements
//! [`Subscribe`], so it can be installed as (or inside) the supervisor's log
//! sink; async consumers then `subscribe()` and `recv().await` the trace.
//!
//! ```text
//! Supervisor::evaluate ── on_event ──► Bus ──► rx 1 (metrics task)
//!                                          └─► rx 2 (ui task)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: never waits, works outside a runtime.
//! - **Bounded capacity**: slow receivers get `RecvError::Lagged(n)`.
//! - **No persistence**: events are lost if there are no receivers at send time.

use tokio::sync::broadcast;

use super::event::Event;
use crate::subscribers::Subscribe;

/// Broadcast channel for supervisor events.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus; capacity is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver for events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Subscribe for Bus {
    fn on_event(&self, event: &Event) {
        self.publish(event.clone());
    }

    fn name(&self) -> &'static str {
        "bus"
    }
}
