//! # Log sinks for the supervisor's lifecycle trace.
//!
//! ```text
//! Supervisor::evaluate ── Event ──► configured sink (Arc<dyn Subscribe>)
//!                                        │
//!                         ┌──────────────┼──────────────┐
//!                         ▼              ▼              ▼
//!                     LogWriter      Bus (async)    SubscriberSet ──► sinks…
//! ```
//!
//! - [`Subscribe`] the sink trait; [`SubscribeFn`] closure-backed sink
//! - [`SubscriberSet`] ordered fan-out with panic isolation
//! - `LogWriter` stdout printer (feature `logging`)

#[cfg(feature = "logging")]
mod log;
mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::{Subscribe, SubscribeFn};
pub use subscriber_set::SubscriberSet;
