//! # Objective abstraction.
//!
//! An [`Objective`] is the long-running main procedure a
//! [`Supervisor`](crate::Supervisor) keeps in focus. Each run receives a fresh
//! [`TaskContext`] bound to that run's focus; the objective suspends only by
//! awaiting the context's primitives (`delay`, `yield_now`, `delay_until`,
//! `try_delay_until`, `delay_until_triggered`).
//!
//! Returning `Ok(())` means the objective was met and the supervisor refocuses.
//! Returning [`TaskError::Abort`] is the expected early exit; any other error
//! is a fault.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::TaskContext;
use crate::error::TaskError;

/// # Restartable main procedure.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use std::time::Duration;
/// use tickvisor::{Objective, TaskContext, TaskError};
///
/// struct Patrol;
///
/// #[async_trait]
/// impl Objective for Patrol {
///     fn name(&self) -> &str { "patrol" }
///
///     async fn run(&self, ctx: TaskContext) -> Result<(), TaskError> {
///         for _ in 0..3 {
///             ctx.delay(Duration::from_millis(100)).await?;
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Objective: Send + Sync + 'static {
    /// Returns a stable, human-readable name.
    fn name(&self) -> &str {
        "main"
    }

    /// Executes one run of the objective.
    async fn run(&self, ctx: TaskContext) -> Result<(), TaskError>;
}

/// Shared handle to an objective (`Arc<dyn Objective>`).
pub type ObjectiveRef = Arc<dyn Objective>;
