//! # Supervisor: keeps the objective in focus, one tick at a time.
//!
//! The [`Supervisor`] owns at most one [`CooperativeTask`] (the *focus*) and
//! advances it from [`evaluate`](Supervisor::evaluate), which the driver calls
//! exactly once per tick.
//!
//! ## evaluate()
//! ```text
//! fatal fault stored?  ─► return Unhandled (until reset())
//!
//! Recovery::decide(focus)
//!   ├─ Create        ─► new focus,             emit FocusStarting
//!   ├─ Continue      ─► (nothing)
//!   ├─ AfterAbort    ─► on_abort(reason),      new focus, emit RefocusAfterAbort
//!   ├─ AfterFault    ─► on_fault(&fault),      new focus, emit RefocusAfterFault
//!   ├─ Fatal         ─► emit ObjectiveFaulted, store fault, return Unhandled
//!   └─ AfterSuccess  ─► new focus,             emit ObjectiveMet
//!
//! focus unstarted? ─► start()   (a refocused task waits a tick under StartMode::NextTick)
//! focus running?   ─► resume()  (one poll: runs to the next suspend point)
//!
//! watches[0..n](&self)          (an error stops the tick and is returned)
//! ```
//!
//! ## Rules
//! - At most one focus exists; it is replaced, never mutated back to life.
//! - A completion is observed by the `evaluate()` *after* the one in which the
//!   focus completed.
//! - Faults of watches and of interjected work are not recovered here: watch
//!   errors return from `evaluate()`, interjection errors surface inside the
//!   objective's suspend call.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tickvisor::{ObjectiveFn, ObjectiveRef, Supervisor, SupervisorConfig, TaskContext, TaskError, VirtualClock};
//!
//! let clock = VirtualClock::new();
//! let main: ObjectiveRef = ObjectiveFn::arc("main", |ctx: TaskContext| async move {
//!     ctx.delay(Duration::from_millis(30)).await?;
//!     Ok::<_, TaskError>(())
//! });
//! let mut sup = Supervisor::new(SupervisorConfig::new(main), clock.shared());
//!
//! for _ in 0..10 {
//!     sup.evaluate().unwrap();
//!     clock.advance(Duration::from_millis(10));
//! }
//! assert_eq!(sup.generation(), 3);
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::core::config::SupervisorConfig;
use crate::core::context::{TaskContext, WaitOptions};
use crate::core::task::{CooperativeTask, TaskStatus};
use crate::error::{RuntimeError, TaskError};
use crate::events::{Event, EventKind};
use crate::policies::{Recovery, StartMode};
use crate::time::{ClockRef, Trigger};

/// Drives the objective's focus and applies the recovery policy.
pub struct Supervisor {
    cfg: SupervisorConfig,
    clock: ClockRef,
    focus: Option<CooperativeTask>,
    fatal: Option<TaskError>,
    generation: u64,
    ticks: u64,
}

impl Supervisor {
    /// Creates a supervisor with no focus; the first `evaluate()` creates it.
    pub fn new(cfg: SupervisorConfig, clock: ClockRef) -> Self {
        Self {
            cfg,
            clock,
            focus: None,
            fatal: None,
            generation: 0,
            ticks: 0,
        }
    }

    /// Advances the supervisor by one tick.
    ///
    /// ### Errors
    /// - [`RuntimeError::Unhandled`] the focus faulted without a fault handler
    ///   (returned again on every later call until [`reset`](Self::reset))
    /// - [`RuntimeError::MissingAbortHandler`] the objective aborted without an abort handler
    /// - [`RuntimeError::WatchFailed`] a watch returned an error
    pub fn evaluate(&mut self) -> Result<(), RuntimeError> {
        self.ticks += 1;
        if let Some(fault) = &self.fatal {
            return Err(RuntimeError::Unhandled {
                fault: fault.clone(),
            });
        }

        let refocused = self.refocus()?;
        self.advance_focus(refocused)?;
        self.run_watches()
    }

    /// Applies the recovery policy; returns whether the focus was replaced after completion.
    fn refocus(&mut self) -> Result<bool, RuntimeError> {
        let decision = Recovery::decide(self.focus.as_ref(), self.cfg.has_fault_handler());
        let refocused = decision.refocuses();

        match decision {
            Recovery::Continue => {}
            Recovery::Create => {
                self.replace_focus();
                self.emit(EventKind::FocusStarting, None);
            }
            Recovery::AfterAbort { reason } => {
                let Some(on_abort) = &self.cfg.on_abort else {
                    return Err(RuntimeError::MissingAbortHandler { reason });
                };
                on_abort(&reason);
                self.replace_focus();
                self.emit(EventKind::RefocusAfterAbort, Some(reason));
            }
            Recovery::AfterFault(fault) => {
                if let Some(on_fault) = &self.cfg.on_fault {
                    on_fault(&fault);
                }
                self.replace_focus();
                self.emit(EventKind::RefocusAfterFault, Some(fault.to_string()));
            }
            Recovery::Fatal(fault) => {
                self.emit(EventKind::ObjectiveFaulted, Some(fault.to_string()));
                self.fatal = Some(fault.clone());
                return Err(RuntimeError::Unhandled { fault });
            }
            Recovery::AfterSuccess => {
                self.replace_focus();
                self.emit(EventKind::ObjectiveMet, None);
            }
        }
        Ok(refocused)
    }

    /// Starts an unstarted focus or resumes a running one.
    fn advance_focus(&mut self, refocused: bool) -> Result<(), RuntimeError> {
        let defer = refocused && self.cfg.start_mode == StartMode::NextTick;
        let Some(focus) = self.focus.as_mut() else {
            return Ok(());
        };

        if focus.has_started() {
            focus.resume();
        } else if !defer {
            focus.start()?;
        }
        Ok(())
    }

    fn run_watches(&self) -> Result<(), RuntimeError> {
        for (index, watch) in self.cfg.watches.iter().enumerate() {
            watch(self).map_err(|error| RuntimeError::WatchFailed { index, error })?;
        }
        Ok(())
    }

    fn replace_focus(&mut self) {
        let ctx = TaskContext::new(Arc::clone(&self.clock), self.cfg.interjection_limit());
        self.focus = Some(CooperativeTask::new(Arc::clone(&self.cfg.main), ctx));
        self.generation += 1;
    }

    fn emit(&self, kind: EventKind, reason: Option<String>) {
        let Some(log) = &self.cfg.log else {
            return;
        };
        let mut ev = Event::new(kind)
            .with_objective(self.cfg.main.name())
            .with_generation(self.generation)
            .at(self.clock.now());
        if let Some(reason) = reason {
            ev = ev.with_reason(reason);
        }
        log.on_event(&ev);
    }

    /// Clears the focus and any fatal state; the next `evaluate()` starts a fresh focus.
    pub fn reset(&mut self) {
        self.focus = None;
        self.fatal = None;
    }

    /// Whether an unhandled fault has put the supervisor in its terminal state.
    pub fn is_faulted(&self) -> bool {
        self.fatal.is_some()
    }

    /// Number of foci created so far (1 after the first `evaluate()`).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of `evaluate()` calls so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Lifecycle of the current focus, if any.
    pub fn focus_status(&self) -> Option<TaskStatus> {
        self.focus.as_ref().map(CooperativeTask::status)
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.cfg
    }

    pub fn clock(&self) -> &ClockRef {
        &self.clock
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    // ---- Pass-throughs to the current focus ----

    /// Context of the current focus.
    ///
    /// Fails with [`RuntimeError::NoFocus`] before the first `evaluate()`.
    pub fn context(&self) -> Result<TaskContext, RuntimeError> {
        self.focus
            .as_ref()
            .map(|focus| focus.context().clone())
            .ok_or(RuntimeError::NoFocus)
    }

    /// Queues `work` on the current focus. See [`TaskContext::interject`].
    pub fn interject<F, Fut>(&self, work: F) -> Result<(), RuntimeError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.focus
            .as_ref()
            .ok_or(RuntimeError::NoFocus)?
            .interject(work)
    }

    /// [`TaskContext::delay`] on the current focus.
    pub fn delay(
        &self,
        duration: Duration,
    ) -> Result<BoxFuture<'static, Result<(), TaskError>>, RuntimeError> {
        let ctx = self.context()?;
        Ok(async move { ctx.delay(duration).await }.boxed())
    }

    /// [`TaskContext::yield_now`] on the current focus.
    pub fn yield_now(&self) -> Result<BoxFuture<'static, Result<(), TaskError>>, RuntimeError> {
        let ctx = self.context()?;
        Ok(async move { ctx.yield_now().await }.boxed())
    }

    /// [`TaskContext::delay_until`] on the current focus.
    pub fn delay_until<C>(
        &self,
        condition: C,
        opts: WaitOptions,
    ) -> Result<BoxFuture<'static, Result<(), TaskError>>, RuntimeError>
    where
        C: FnMut() -> bool + Send + 'static,
    {
        let ctx = self.context()?;
        Ok(async move { ctx.delay_until(condition, opts).await }.boxed())
    }

    /// [`TaskContext::try_delay_until`] on the current focus.
    pub fn try_delay_until<C>(
        &self,
        condition: C,
        opts: WaitOptions,
    ) -> Result<BoxFuture<'static, Result<bool, TaskError>>, RuntimeError>
    where
        C: FnMut() -> bool + Send + 'static,
    {
        let ctx = self.context()?;
        Ok(async move { ctx.try_delay_until(condition, opts).await }.boxed())
    }

    /// [`TaskContext::delay_until_triggered`] on the current focus.
    pub fn delay_until_triggered<T>(
        &self,
        trigger: Arc<T>,
        opts: WaitOptions,
    ) -> Result<BoxFuture<'static, Result<(), TaskError>>, RuntimeError>
    where
        T: Trigger + ?Sized + 'static,
    {
        let ctx = self.context()?;
        Ok(async move { ctx.delay_until_triggered(trigger.as_ref(), opts).await }.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{ObjectiveFn, ObjectiveRef};
    use crate::time::VirtualClock;

    fn instant() -> ObjectiveRef {
        ObjectiveFn::arc("instant", |_ctx: TaskContext| async { Ok::<_, TaskError>(()) })
    }

    #[test]
    fn test_first_evaluate_creates_and_starts_focus() {
        let clock = VirtualClock::new();
        let main: ObjectiveRef = ObjectiveFn::arc("main", |ctx: TaskContext| async move {
            ctx.yield_now().await?;
            Ok::<_, TaskError>(())
        });
        let mut sup = Supervisor::new(SupervisorConfig::new(main), clock.shared());
        assert_eq!(sup.focus_status(), None);

        sup.evaluate().unwrap();
        assert_eq!(sup.generation(), 1);
        assert_eq!(sup.focus_status(), Some(TaskStatus::Running));

        sup.evaluate().unwrap();
        assert_eq!(sup.focus_status(), Some(TaskStatus::Completed));
        assert_eq!(sup.generation(), 1);
    }

    #[test]
    fn test_pass_throughs_fail_fast_without_focus() {
        let clock = VirtualClock::new();
        let sup = Supervisor::new(SupervisorConfig::new(instant()), clock.shared());
        assert_eq!(
            sup.interject(|| async { Ok::<_, TaskError>(()) }).unwrap_err(),
            RuntimeError::NoFocus
        );
        assert!(matches!(sup.delay(Duration::from_millis(1)), Err(RuntimeError::NoFocus)));
        assert!(matches!(sup.yield_now(), Err(RuntimeError::NoFocus)));
        assert!(matches!(sup.context(), Err(RuntimeError::NoFocus)));
    }

    #[test]
    fn test_missing_abort_handler_is_reported() {
        let clock = VirtualClock::new();
        let main: ObjectiveRef = ObjectiveFn::arc("main", |_ctx: TaskContext| async {
            Err::<(), _>(TaskError::abort("quit"))
        });
        let mut sup = Supervisor::new(SupervisorConfig::new(main), clock.shared());
        sup.evaluate().unwrap();
        assert_eq!(
            sup.evaluate(),
            Err(RuntimeError::MissingAbortHandler {
                reason: "quit".into()
            })
        );
    }

    #[test]
    fn test_reset_leaves_faulted_state() {
        let clock = VirtualClock::new();
        let main: ObjectiveRef = ObjectiveFn::arc("main", |_ctx: TaskContext| async {
            Err::<(), _>(TaskError::fail("boom"))
        });
        let mut sup = Supervisor::new(SupervisorConfig::new(main), clock.shared());
        sup.evaluate().unwrap();
        assert!(sup.evaluate().is_err());
        assert!(sup.is_faulted());
        assert!(sup.evaluate().is_err());

        sup.reset();
        assert!(!sup.is_faulted());
        sup.evaluate().unwrap();
        assert_eq!(sup.generation(), 2);
    }
}
