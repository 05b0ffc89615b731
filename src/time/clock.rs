//! # Virtual clock.
//!
//! [`Clock`] is the collaborator the focus suspends on. It reports a monotonic
//! virtual "now" and hands out the two primitive suspensions:
//! - `delay(d)` pending until `now` has advanced by `d`, and for at least one
//!   poll (so `delay(Duration::ZERO)` still gives the tick back);
//! - `yield_once()` pending for exactly one poll (one scheduling quantum).
//!
//! The focus is re-polled by the supervisor once per tick, so these futures
//! re-check time on every poll instead of registering wakers.
//!
//! [`VirtualClock`] is the in-crate implementation: time only moves when the
//! driver calls [`VirtualClock::advance`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::BoxFuture;

/// Source of virtual time and primitive suspension.
pub trait Clock: Send + Sync + 'static {
    /// Current virtual time (monotonic, measured from the clock's epoch).
    fn now(&self) -> Duration;

    /// Suspends until `duration` of virtual time has elapsed.
    fn delay(&self, duration: Duration) -> BoxFuture<'static, ()>;

    /// Suspends for exactly one scheduling quantum.
    fn yield_once(&self) -> BoxFuture<'static, ()>;
}

/// Shared clock handle injected into supervisors and tasks.
pub type ClockRef = Arc<dyn Clock>;

/// Manually advanced virtual clock.
///
/// Cloning is cheap; all clones observe the same time.
#[derive(Clone, Debug, Default)]
pub struct VirtualClock {
    nanos: Arc<AtomicU64>,
}

impl VirtualClock {
    /// Creates a clock at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves virtual time forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(to_nanos(by), Ordering::AcqRel);
    }

    /// Moves virtual time to `to`; earlier values are ignored (time is monotonic).
    pub fn set(&self, to: Duration) {
        self.nanos.fetch_max(to_nanos(to), Ordering::AcqRel);
    }

    /// Returns this clock as a [`ClockRef`].
    pub fn shared(&self) -> ClockRef {
        Arc::new(self.clone())
    }

    fn read(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Acquire))
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        self.read()
    }

    fn delay(&self, duration: Duration) -> BoxFuture<'static, ()> {
        let deadline = self.read().saturating_add(duration);
        Box::pin(Sleep {
            clock: self.clone(),
            deadline,
            polled: false,
        })
    }

    fn yield_once(&self) -> BoxFuture<'static, ()> {
        Box::pin(YieldOnce { yielded: false })
    }
}

fn to_nanos(d: Duration) -> u64 {
    d.as_nanos().min(u128::from(u64::MAX)) as u64
}

/// Pending until the clock reaches `deadline`; never ready on the first poll.
struct Sleep {
    clock: VirtualClock,
    deadline: Duration,
    polled: bool,
}

impl Future for Sleep {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if self.polled && self.clock.read() >= self.deadline {
            return Poll::Ready(());
        }
        self.polled = true;
        Poll::Pending
    }
}

/// Pending exactly once.
struct YieldOnce {
    yielded: bool,
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            Poll::Pending
        }
    }
}
