//! # Lifecycle events emitted by the supervisor.
//!
//! [`EventKind`] classifies the supervisor's lifecycle transitions; [`Event`]
//! carries the metadata (sequence number, virtual timestamp, focus generation,
//! reason). An event's `Display` is the trace line written to the log sink.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tickvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RefocusAfterAbort)
//!     .with_reason("player died")
//!     .with_generation(3)
//!     .at(Duration::from_millis(500));
//!
//! assert_eq!(ev.to_string(), "refocusing after player died");
//! assert_eq!(ev.generation, 3);
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::Duration;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of supervisor lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// First focus created.
    ///
    /// Sets: `objective`, `generation`, `at`, `seq`
    FocusStarting,

    /// Focus ended with the abort signal; the abort handler ran and a new focus was created.
    ///
    /// Sets: `objective`, `generation` (new focus), `reason` (abort message), `at`, `seq`
    RefocusAfterAbort,

    /// Focus faulted; the fault handler ran and a new focus was created.
    ///
    /// Sets: `objective`, `generation` (new focus), `reason` (fault message), `at`, `seq`
    RefocusAfterFault,

    /// Focus completed without fault; a new focus was created.
    ///
    /// Sets: `objective`, `generation` (new focus), `at`, `seq`
    ObjectiveMet,

    /// Focus faulted with no fault handler; the supervisor is now faulted.
    ///
    /// Sets: `objective`, `generation` (faulted focus), `reason`, `at`, `seq`
    ObjectiveFaulted,
}

impl EventKind {
    /// Short stable label for logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::FocusStarting => "starting",
            EventKind::RefocusAfterAbort => "aborted",
            EventKind::RefocusAfterFault => "fault-handled",
            EventKind::ObjectiveMet => "met",
            EventKind::ObjectiveFaulted => "faulted",
        }
    }
}

/// Supervisor event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Virtual time of the transition.
    pub at: Duration,
    /// Generation of the focus the event refers to (1 = first focus).
    pub generation: u64,
    /// Human-readable reason (abort message, fault text).
    pub reason: Option<Arc<str>>,
    /// Name of the objective.
    pub objective: Option<Arc<str>>,
    /// Event classification.
    pub kind: EventKind,
}

impl Event {
    /// Creates a new event of the given kind with the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: Duration::ZERO,
            generation: 0,
            reason: None,
            objective: None,
            kind,
        }
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn with_objective(mut self, name: impl Into<Arc<str>>) -> Self {
        self.objective = Some(name.into());
        self
    }

    #[inline]
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    /// Stamps the event with a virtual time.
    #[inline]
    pub fn at(mut self, at: Duration) -> Self {
        self.at = at;
        self
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = self.reason.as_deref().unwrap_or("unknown");
        match self.kind {
            EventKind::FocusStarting => f.write_str("starting main objective"),
            EventKind::RefocusAfterAbort => write!(f, "refocusing after {reason}"),
            EventKind::RefocusAfterFault => f.write_str("refocusing after handled fault"),
            EventKind::ObjectiveMet => f.write_str("objective met, refocusing"),
            EventKind::ObjectiveFaulted => write!(f, "objective faulted: {reason}"),
        }
    }
}
