//! # Recovery policy for the focus.
//!
//! [`Recovery`] is the decision the supervisor takes at the top of every
//! `evaluate()`, based solely on the state of the current focus:
//!
//! ```text
//! no focus                          → Create
//! focus not complete                → Continue
//! completed with Abort(reason)      → AfterAbort   (abort handler, refocus)
//! completed with fault + handler    → AfterFault   (fault handler, refocus)
//! completed with fault, no handler  → Fatal        (propagate, no refocus)
//! completed without fault           → AfterSuccess (refocus)
//! ```
//!
//! [`StartMode`] decides when a focus created by a refocus is started.

use crate::core::CooperativeTask;
use crate::error::TaskError;

/// When a refocused (recovered) focus is started.
///
/// The very first focus is always started by the `evaluate()` that creates it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StartMode {
    /// Start the new focus in the same `evaluate()` that created it (default).
    #[default]
    Immediate,
    /// Leave the new focus unstarted for one full tick; the next `evaluate()` starts it.
    NextTick,
}

/// Outcome of inspecting the current focus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Recovery {
    /// No focus exists yet.
    Create,
    /// The focus is still running (or waiting to start).
    Continue,
    /// The focus ended with the abort signal.
    AfterAbort { reason: String },
    /// The focus faulted and a fault handler will take the fault.
    AfterFault(TaskError),
    /// The focus faulted with nobody to handle it.
    Fatal(TaskError),
    /// The objective was met.
    AfterSuccess,
}

impl Recovery {
    /// Classifies `focus`; `can_handle_faults` reports whether a fault handler is configured.
    pub fn decide(focus: Option<&CooperativeTask>, can_handle_faults: bool) -> Self {
        let Some(focus) = focus else {
            return Recovery::Create;
        };
        if !focus.is_complete() {
            return Recovery::Continue;
        }
        match focus.fault() {
            None => Recovery::AfterSuccess,
            Some(TaskError::Abort { reason }) => Recovery::AfterAbort {
                reason: reason.clone(),
            },
            Some(fault) if can_handle_faults => Recovery::AfterFault(fault.clone()),
            Some(fault) => Recovery::Fatal(fault.clone()),
        }
    }

    /// Whether this decision replaces the focus with a fresh one.
    pub fn refocuses(&self) -> bool {
        matches!(
            self,
            Recovery::AfterAbort { .. } | Recovery::AfterFault(_) | Recovery::AfterSuccess
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TaskContext;
    use crate::tasks::{ObjectiveFn, ObjectiveRef};
    use crate::time::VirtualClock;

    fn completed_with(result: Result<(), TaskError>) -> CooperativeTask {
        let main: ObjectiveRef = ObjectiveFn::arc("main", move |_ctx: TaskContext| {
            let result = result.clone();
            async move { result }
        });
        let mut task = CooperativeTask::new(main, TaskContext::new(VirtualClock::new().shared(), None));
        task.start().unwrap();
        task
    }

    #[test]
    fn test_no_focus_creates() {
        assert_eq!(Recovery::decide(None, false), Recovery::Create);
    }

    #[test]
    fn test_unstarted_focus_continues() {
        let main: ObjectiveRef =
            ObjectiveFn::arc("main", |_ctx: TaskContext| async { Ok::<_, TaskError>(()) });
        let task = CooperativeTask::new(main, TaskContext::new(VirtualClock::new().shared(), None));
        assert_eq!(Recovery::decide(Some(&task), false), Recovery::Continue);
    }

    #[test]
    fn test_abort_wins_over_fault_handler() {
        let task = completed_with(Err(TaskError::abort("reset")));
        let expected = Recovery::AfterAbort {
            reason: "reset".into(),
        };
        assert_eq!(Recovery::decide(Some(&task), true), expected);
        assert_eq!(Recovery::decide(Some(&task), false), expected);
    }

    #[test]
    fn test_fault_is_fatal_without_handler() {
        let task = completed_with(Err(TaskError::fail("boom")));
        assert_eq!(
            Recovery::decide(Some(&task), true),
            Recovery::AfterFault(TaskError::fail("boom"))
        );
        let fatal = Recovery::decide(Some(&task), false);
        assert_eq!(fatal, Recovery::Fatal(TaskError::fail("boom")));
        assert!(!fatal.refocuses());
    }

    #[test]
    fn test_success_refocuses() {
        let task = completed_with(Ok(()));
        let decision = Recovery::decide(Some(&task), false);
        assert_eq!(decision, Recovery::AfterSuccess);
        assert!(decision.refocuses());
    }
}
