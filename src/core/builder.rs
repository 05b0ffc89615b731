use std::sync::Arc;

use crate::core::config::{AbortHandler, FaultHandler, SupervisorConfig, Watch};
use crate::core::supervisor::Supervisor;
use crate::error::TaskError;
use crate::policies::StartMode;
use crate::subscribers::Subscribe;
use crate::tasks::ObjectiveRef;

/// Builder for [`SupervisorConfig`].
pub struct SupervisorConfigBuilder {
    main: ObjectiveRef,
    watches: Vec<Watch>,
    on_fault: Option<FaultHandler>,
    on_abort: Option<AbortHandler>,
    log: Option<Arc<dyn Subscribe>>,
    start_mode: StartMode,
    interjection_capacity: usize,
}

impl SupervisorConfigBuilder {
    pub(crate) fn new(main: ObjectiveRef) -> Self {
        Self {
            main,
            watches: Vec::new(),
            on_fault: None,
            on_abort: None,
            log: None,
            start_mode: StartMode::default(),
            interjection_capacity: 0,
        }
    }

    /// Appends a watch; watches run in the order they were added.
    pub fn with_watch<F>(mut self, watch: F) -> Self
    where
        F: Fn(&Supervisor) -> Result<(), TaskError> + Send + Sync + 'static,
    {
        self.watches.push(Arc::new(watch));
        self
    }

    /// Appends several prepared watches.
    pub fn with_watches(mut self, watches: impl IntoIterator<Item = Watch>) -> Self {
        self.watches.extend(watches);
        self
    }

    /// Installs the fault handler; without one, a fault is fatal.
    pub fn on_fault<F>(mut self, handler: F) -> Self
    where
        F: Fn(&TaskError) + Send + Sync + 'static,
    {
        self.on_fault = Some(Arc::new(handler));
        self
    }

    /// Installs the abort handler.
    pub fn on_abort<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_abort = Some(Arc::new(handler));
        self
    }

    /// Sets the log sink receiving lifecycle events.
    pub fn with_log(mut self, sink: Arc<dyn Subscribe>) -> Self {
        self.log = Some(sink);
        self
    }

    pub fn with_start_mode(mut self, mode: StartMode) -> Self {
        self.start_mode = mode;
        self
    }

    /// Bounds each focus's interjection queue (`0` = unbounded).
    pub fn with_interjection_capacity(mut self, capacity: usize) -> Self {
        self.interjection_capacity = capacity;
        self
    }

    pub fn build(self) -> SupervisorConfig {
        SupervisorConfig {
            main: self.main,
            watches: self.watches,
            on_fault: self.on_fault,
            on_abort: self.on_abort,
            log: self.log,
            start_mode: self.start_mode,
            interjection_capacity: self.interjection_capacity,
        }
    }
}
