//! Virtual time collaborators.
//!
//! ## Contents
//! - [`Clock`] / [`ClockRef`] monotonic virtual "now" plus primitive suspension
//! - [`VirtualClock`] manually advanced clock (used by [`TickDriver`](crate::TickDriver))
//! - [`RateGovernor`] throttle for expensive condition checks
//! - [`Trigger`] / [`ManualTrigger`] one-shot subscription primitive
//!
//! Nothing in this module reads wall-clock time.

mod clock;
mod governor;
mod trigger;

pub use clock::{Clock, ClockRef, VirtualClock};
pub use governor::RateGovernor;
pub use trigger::{ManualTrigger, Trigger, TriggerCallback};
