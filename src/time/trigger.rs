//! # One-shot trigger.
//!
//! [`Trigger`] is the event collaborator awaited by
//! [`TaskContext::delay_until_triggered`](crate::TaskContext::delay_until_triggered).
//! A subscription fires at most once: the next time the trigger fires, or
//! immediately when it already has (no missed wakeup).

use std::sync::{Mutex, PoisonError};

/// Callback handed to [`Trigger::subscribe_once`].
pub type TriggerCallback = Box<dyn FnOnce() + Send + 'static>;

/// One-shot subscription primitive.
pub trait Trigger: Send + Sync {
    /// Registers `callback` to run at most once when the trigger fires.
    fn subscribe_once(&self, callback: TriggerCallback);
}

#[derive(Default)]
struct TriggerState {
    fired: bool,
    waiting: Vec<TriggerCallback>,
}

/// Trigger fired explicitly by the caller.
///
/// Once fired it stays fired until [`reset`](ManualTrigger::reset); late
/// subscribers are invoked immediately.
#[derive(Default)]
pub struct ManualTrigger {
    state: Mutex<TriggerState>,
}

impl ManualTrigger {
    /// Creates an unfired trigger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the trigger and runs every pending subscription once.
    ///
    /// Callbacks run outside the lock, so they may subscribe again.
    pub fn fire(&self) {
        let waiting = {
            let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            st.fired = true;
            std::mem::take(&mut st.waiting)
        };
        for cb in waiting {
            cb();
        }
    }

    /// Re-arms the trigger; pending subscriptions are kept.
    pub fn reset(&self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fired = false;
    }

    /// Whether the trigger has fired since creation or the last reset.
    pub fn has_fired(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fired
    }
}

impl Trigger for ManualTrigger {
    fn subscribe_once(&self, callback: TriggerCallback) {
        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if st.fired {
            drop(st);
            callback();
        } else {
            st.waiting.push(callback);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, TriggerCallback) {
        let n = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&n);
        (
            n,
            Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }

    #[test]
    fn test_subscription_fires_once() {
        let t = ManualTrigger::new();
        let (n, cb) = counter();
        t.subscribe_once(cb);
        assert_eq!(n.load(Ordering::SeqCst), 0);
        t.fire();
        t.fire();
        assert_eq!(n.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_late_subscriber_runs_immediately() {
        let t = ManualTrigger::new();
        t.fire();
        let (n, cb) = counter();
        t.subscribe_once(cb);
        assert_eq!(n.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reset_rearms() {
        let t = ManualTrigger::new();
        t.fire();
        t.reset();
        assert!(!t.has_fired());
        let (n, cb) = counter();
        t.subscribe_once(cb);
        assert_eq!(n.load(Ordering::SeqCst), 0);
        t.fire();
        assert_eq!(n.load(Ordering::SeqCst), 1);
    }
}
