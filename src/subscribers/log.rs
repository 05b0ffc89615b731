//! # LogWriter: simple trace printer
//!
//! A minimal sink that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [starting] objective="main" generation=1 at=0ns starting main objective
//! [met] objective="main" generation=2 at=48ms objective met, refocusing
//! [aborted] objective="main" generation=3 at=96ms refocusing after player died
//! [faulted] objective="main" generation=3 at=112ms objective faulted: execution failed: boom
//! ```

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Event writer sink.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Subscribe for LogWriter {
    fn on_event(&self, e: &Event) {
        println!(
            "[{}] objective={:?} generation={} at={:?} {}",
            e.kind.as_label(),
            e.objective.as_deref().unwrap_or("main"),
            e.generation,
            e.at,
            e
        );
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
