//! # Rate governor.
//!
//! [`RateGovernor`] bounds how often an expensive check is re-evaluated,
//! measured in virtual time.
//!
//! ```text
//! interval = 10ms, last_fire = 0ms
//!   should_fire(4ms)  → false  (state untouched)
//!   should_fire(10ms) → true   (last_fire = 10ms)
//!   should_fire(15ms) → false
//!   should_fire(21ms) → true   (last_fire = 21ms)
//! ```

use std::time::Duration;

/// Throttle that fires at most once per `interval` of virtual time.
///
/// One instance per wait call; it is never shared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateGovernor {
    interval: Duration,
    last_fire: Duration,
}

impl RateGovernor {
    /// Creates a governor that considers `last_fire` its most recent firing.
    pub fn new(interval: Duration, last_fire: Duration) -> Self {
        Self {
            interval,
            last_fire,
        }
    }

    /// Returns `true` iff `now - last_fire >= interval`, and then records `now`.
    ///
    /// A `now` earlier than the last firing never fires.
    pub fn should_fire(&mut self, now: Duration) -> bool {
        match now.checked_sub(self.last_fire) {
            Some(elapsed) if elapsed >= self.interval => {
                self.last_fire = now;
                true
            }
            _ => false,
        }
    }

    /// Configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Virtual time of the most recent firing.
    pub fn last_fire(&self) -> Duration {
        self.last_fire
    }
}
