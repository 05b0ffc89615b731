//! # Supervisor configuration.
//!
//! [`SupervisorConfig`] is built once through [`SupervisorConfig::builder`] and
//! never mutated afterwards. It holds:
//! - **Objective**: the main procedure (required)
//! - **Watches**: callbacks run after every tick, in registration order
//! - **Handlers**: `on_fault` (optional), `on_abort` (required if the objective aborts)
//! - **Log sink**: optional [`Subscribe`] receiving lifecycle events
//! - **Scheduling knobs**: [`StartMode`] and interjection queue capacity
//!
//! ## Sentinel values
//! - `interjection_capacity = 0` → unbounded queue (same as not setting it)

use std::sync::Arc;

use crate::core::builder::SupervisorConfigBuilder;
use crate::core::supervisor::Supervisor;
use crate::error::TaskError;
use crate::policies::StartMode;
use crate::subscribers::Subscribe;
use crate::tasks::ObjectiveRef;

/// Callback run once per `evaluate()`, after the focus has been advanced.
pub type Watch = Arc<dyn Fn(&Supervisor) -> Result<(), TaskError> + Send + Sync>;

/// Receives the full fault of a focus that faulted.
pub type FaultHandler = Arc<dyn Fn(&TaskError) + Send + Sync>;

/// Receives the message of an abort signal.
pub type AbortHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Immutable supervisor configuration.
#[derive(Clone)]
pub struct SupervisorConfig {
    pub(crate) main: ObjectiveRef,
    pub(crate) watches: Vec<Watch>,
    pub(crate) on_fault: Option<FaultHandler>,
    pub(crate) on_abort: Option<AbortHandler>,
    pub(crate) log: Option<Arc<dyn Subscribe>>,
    pub(crate) start_mode: StartMode,
    pub(crate) interjection_capacity: usize,
}

impl SupervisorConfig {
    /// Starts building a configuration around `main`.
    pub fn builder(main: ObjectiveRef) -> SupervisorConfigBuilder {
        SupervisorConfigBuilder::new(main)
    }

    /// Configuration with no watches, handlers or sink.
    pub fn new(main: ObjectiveRef) -> Self {
        Self::builder(main).build()
    }

    pub fn main(&self) -> &ObjectiveRef {
        &self.main
    }

    pub fn watches(&self) -> &[Watch] {
        &self.watches
    }

    pub fn has_fault_handler(&self) -> bool {
        self.on_fault.is_some()
    }

    pub fn has_abort_handler(&self) -> bool {
        self.on_abort.is_some()
    }

    pub fn start_mode(&self) -> StartMode {
        self.start_mode
    }

    /// Returns the interjection queue capacity as an `Option`.
    ///
    /// - `None` → unbounded
    /// - `Some(n)` → at most `n` pending interjections per focus
    #[inline]
    pub fn interjection_limit(&self) -> Option<usize> {
        if self.interjection_capacity == 0 {
            None
        } else {
            Some(self.interjection_capacity)
        }
    }
}
