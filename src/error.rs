//! Error types used by the tickvisor runtime and objectives.
//!
//! This module defines two main error enums:
//!
//! - [`TaskError`]: faults raised by a run of the main objective (or by work
//!   interjected into it). These are captured by the focus and routed by the
//!   supervisor's recovery policy.
//! - [`RuntimeError`]: errors raised by the supervisor itself out of
//!   [`Supervisor::evaluate`](crate::Supervisor::evaluate) and its pass-throughs.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logs/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by an objective run.
///
/// [`TaskError::Abort`] is the expected early-exit signal: it is routed to the
/// abort handler and always triggers a refocus. Every other variant is a fault
/// that needs a fault handler to be recovered from.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Expected, recognized early exit of the objective.
    #[error("objective aborted: {reason}")]
    Abort {
        /// Human-readable reason handed to the abort handler.
        reason: String,
    },

    /// Ordinary fault raised by the objective or by interjected work.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// A condition or trigger wait reached its deadline first.
    #[error("timed out awaiting delay condition after {timeout:?}")]
    Timeout {
        /// The virtual-time deadline that elapsed.
        timeout: Duration,
    },

    /// The objective panicked; the panic was captured by the focus.
    #[error("objective panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl TaskError {
    /// Builds an abort signal.
    ///
    /// # Example
    /// ```
    /// use tickvisor::TaskError;
    ///
    /// let err = TaskError::abort("player died");
    /// assert!(err.is_abort());
    /// assert_eq!(err.as_label(), "task_aborted");
    /// ```
    pub fn abort(reason: impl Into<String>) -> Self {
        TaskError::Abort {
            reason: reason.into(),
        }
    }

    /// Builds an ordinary fault.
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Whether this is the recognized abort signal (dispatch is by variant, never by message).
    pub fn is_abort(&self) -> bool {
        matches!(self, TaskError::Abort { .. })
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Abort { .. } => "task_aborted",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Panicked { .. } => "task_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Abort { reason } => reason.clone(),
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            TaskError::Panicked { info } => format!("panic: {info}"),
        }
    }
}

/// # Errors produced by the supervisor.
///
/// These surface out of [`Supervisor::evaluate`](crate::Supervisor::evaluate)
/// (fatal faults, failing watches) or flag a broken caller contract.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The focus faulted and no fault handler is configured. The supervisor
    /// stays in this state until [`Supervisor::reset`](crate::Supervisor::reset).
    #[error("unhandled objective fault: {fault}")]
    Unhandled {
        /// The captured fault of the focus.
        fault: TaskError,
    },

    /// A pass-through was called before the first `evaluate()`.
    #[error("no focus: evaluate() has not been called yet")]
    NoFocus,

    /// `start()` was called on a task that already started.
    #[error("cooperative task already started")]
    AlreadyStarted,

    /// The objective aborted but no abort handler was configured.
    #[error("objective aborted with no abort handler configured: {reason}")]
    MissingAbortHandler {
        /// The abort reason that could not be delivered.
        reason: String,
    },

    /// A watch callback failed; the remaining watches of this tick were skipped.
    #[error("watch #{index} failed: {error}")]
    WatchFailed {
        /// Registration index of the failing watch.
        index: usize,
        /// The error returned by the watch.
        error: TaskError,
    },

    /// The bounded interjection queue is full.
    #[error("interjection queue full (capacity {capacity})")]
    InterjectionOverflow {
        /// Configured queue capacity.
        capacity: usize,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use tickvisor::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::NoFocus.as_label(), "runtime_no_focus");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Unhandled { .. } => "runtime_unhandled_fault",
            RuntimeError::NoFocus => "runtime_no_focus",
            RuntimeError::AlreadyStarted => "runtime_already_started",
            RuntimeError::MissingAbortHandler { .. } => "runtime_missing_abort_handler",
            RuntimeError::WatchFailed { .. } => "runtime_watch_failed",
            RuntimeError::InterjectionOverflow { .. } => "runtime_interjection_overflow",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::Unhandled { fault } => format!("unhandled fault; {}", fault.as_message()),
            RuntimeError::NoFocus => "no focus yet".to_string(),
            RuntimeError::AlreadyStarted => "task already started".to_string(),
            RuntimeError::MissingAbortHandler { reason } => {
                format!("abort without handler; reason={reason}")
            }
            RuntimeError::WatchFailed { index, error } => {
                format!("watch={index} {}", error.as_message())
            }
            RuntimeError::InterjectionOverflow { capacity } => {
                format!("interjections full; capacity={capacity}")
            }
        }
    }

    /// The objective fault wrapped by this error, if any.
    pub fn fault(&self) -> Option<&TaskError> {
        match self {
            RuntimeError::Unhandled { fault } => Some(fault),
            RuntimeError::WatchFailed { error, .. } => Some(error),
            _ => None,
        }
    }
}
