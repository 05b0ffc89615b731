//! Supervisor events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] lifecycle classification and metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`, usable as a log sink
//!
//! ## Quick reference
//! - **Publisher**: `Supervisor::evaluate` (one event per lifecycle transition).
//! - **Consumers**: the configured [`Subscribe`](crate::Subscribe) sink.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
