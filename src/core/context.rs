//! # Task context: the suspend primitives of a focus.
//!
//! Every run of the objective receives a [`TaskContext`]. It owns the run's
//! interjection queue and clock handle and exposes the only places where the
//! objective may suspend:
//!
//! | primitive                                   | suspends via              |
//! |---------------------------------------------|---------------------------|
//! | [`delay`](TaskContext::delay)               | `Clock::delay`            |
//! | [`yield_now`](TaskContext::yield_now)       | `Clock::yield_once`       |
//! | [`try_delay_until`](TaskContext::try_delay_until) / [`delay_until`](TaskContext::delay_until) | repeated `yield_now` |
//! | [`delay_until_triggered`](TaskContext::delay_until_triggered) | `delay_until` on a fired flag |
//!
//! Each primitive drains every pending interjection (FIFO, sequentially) before
//! it suspends. An interjection error is returned from the primitive.
//!
//! `TaskContext` is `Clone + Send + Sync`; a clone moved to another thread can
//! interject work into the focus it belongs to.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::FutureExt;

use crate::core::interjections::InterjectionQueue;
use crate::error::{RuntimeError, TaskError};
use crate::time::{ClockRef, RateGovernor, Trigger};

/// Deadline and throttling knobs for condition and trigger waits.
///
/// - `timeout`: virtual-time deadline measured from wait entry (`None` = wait forever)
/// - `eval_every`: minimum virtual time between two condition checks (`None` = every quantum)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WaitOptions {
    pub timeout: Option<Duration>,
    pub eval_every: Option<Duration>,
}

impl WaitOptions {
    /// No deadline, no throttling.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[inline]
    pub fn with_eval_every(mut self, every: Duration) -> Self {
        self.eval_every = Some(every);
        self
    }
}

struct ContextInner {
    clock: ClockRef,
    interjections: InterjectionQueue,
}

/// Handle to one focus: its clock, its interjection queue, its suspend primitives.
#[derive(Clone)]
pub struct TaskContext {
    inner: Arc<ContextInner>,
}

impl TaskContext {
    pub(crate) fn new(clock: ClockRef, interjection_capacity: Option<usize>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                clock,
                interjections: InterjectionQueue::new(interjection_capacity),
            }),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.inner.clock.now()
    }

    /// The clock this context suspends on.
    pub fn clock(&self) -> &ClockRef {
        &self.inner.clock
    }

    /// Queues `work` to run at the focus's next suspend point.
    ///
    /// Safe from any thread. Work queued on a focus that never suspends again
    /// is dropped with it, unexecuted.
    pub fn interject<F, Fut>(&self, work: F) -> Result<(), RuntimeError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.inner
            .interjections
            .push(Box::new(move || work().boxed()))
    }

    /// Number of interjections waiting for the next drain.
    pub fn pending_interjections(&self) -> usize {
        self.inner.interjections.len()
    }

    /// Drains interjections, then suspends for `duration` of virtual time.
    pub async fn delay(&self, duration: Duration) -> Result<(), TaskError> {
        self.drain().await?;
        self.inner.clock.delay(duration).await;
        Ok(())
    }

    /// Drains interjections, then suspends for one scheduling quantum.
    pub async fn yield_now(&self) -> Result<(), TaskError> {
        self.drain().await?;
        self.inner.clock.yield_once().await;
        Ok(())
    }

    /// Waits until `trigger` fires.
    ///
    /// Subscribes once before the first suspension; a trigger that already
    /// fired resolves the wait on the first check.
    pub async fn delay_until_triggered<T>(
        &self,
        trigger: &T,
        opts: WaitOptions,
    ) -> Result<(), TaskError>
    where
        T: Trigger + ?Sized,
    {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        trigger.subscribe_once(Box::new(move || flag.store(true, Ordering::Release)));

        self.delay_until(move || fired.load(Ordering::Acquire), opts)
            .await
    }

    /// Waits until `condition` holds, failing with [`TaskError::Timeout`] at the deadline.
    pub async fn delay_until<C>(&self, condition: C, opts: WaitOptions) -> Result<(), TaskError>
    where
        C: FnMut() -> bool + Send,
    {
        if self.try_delay_until(condition, opts).await? {
            return Ok(());
        }
        Err(TaskError::Timeout {
            timeout: opts.timeout.unwrap_or_default(),
        })
    }

    /// Waits until `condition` holds; `Ok(false)` when the deadline elapsed first.
    ///
    /// ### Loop
    /// ```text
    /// governor configured and not due → drain + yield
    /// condition()                     → Ok(true)
    /// now - entry >= timeout          → Ok(false)
    /// otherwise                       → drain + yield
    /// ```
    /// The governor starts with its last firing at wait entry, so a throttled
    /// condition is first checked one `eval_every` after entry.
    ///
    /// The deadline is only checked on iterations where the condition is
    /// checked. With `eval_every > timeout` the wait reports `Ok(false)` at the
    /// first governed check, which can be well after `timeout`; `timeout` is a
    /// lower bound on the wait, not an upper one.
    pub async fn try_delay_until<C>(
        &self,
        mut condition: C,
        opts: WaitOptions,
    ) -> Result<bool, TaskError>
    where
        C: FnMut() -> bool + Send,
    {
        let clock = &self.inner.clock;
        let entered = clock.now();
        let mut governor = opts
            .eval_every
            .map(|every| RateGovernor::new(every, entered));

        loop {
            let due = governor
                .as_mut()
                .is_none_or(|g| g.should_fire(clock.now()));

            if due {
                if condition() {
                    return Ok(true);
                }
                if let Some(timeout) = opts.timeout {
                    if clock.now().saturating_sub(entered) >= timeout {
                        return Ok(false);
                    }
                }
            }
            self.yield_now().await?;
        }
    }

    /// Executes the current snapshot of interjections in FIFO order.
    ///
    /// On error the rest of the snapshot is discarded and the error returned.
    async fn drain(&self) -> Result<(), TaskError> {
        for work in self.inner.interjections.take_all() {
            work().await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskContext")
            .field("now", &self.now())
            .field("pending_interjections", &self.pending_interjections())
            .finish()
    }
}
