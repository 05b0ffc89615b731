//! # Function-backed objective (`ObjectiveFn`)
//!
//! [`ObjectiveFn`] wraps a closure `F: Fn(TaskContext) -> Fut`, producing a
//! fresh future per run. Nothing leaks between runs; state that must survive a
//! refocus has to be captured explicitly (e.g. an `Arc<...>`).
//!
//! ## Example
//! ```rust
//! use tickvisor::{ObjectiveFn, ObjectiveRef, TaskContext, TaskError};
//!
//! let main: ObjectiveRef = ObjectiveFn::arc("main", |ctx: TaskContext| async move {
//!     ctx.yield_now().await?;
//!     Ok::<_, TaskError>(())
//! });
//!
//! assert_eq!(main.name(), "main");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::TaskContext;
use crate::error::TaskError;
use crate::tasks::task::Objective;

/// Function-backed objective.
#[derive(Debug)]
pub struct ObjectiveFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ObjectiveFn<F> {
    /// Creates a new function-backed objective.
    ///
    /// Prefer [`ObjectiveFn::arc`] when you immediately need an [`ObjectiveRef`](crate::ObjectiveRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the objective and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Objective for ObjectiveFn<F>
where
    F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: TaskContext) -> Result<(), TaskError> {
        (self.f)(ctx).await
    }
}
