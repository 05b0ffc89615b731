//! # CooperativeTask: one run of the objective.
//!
//! Wraps a single run of an [`Objective`](crate::Objective) as an explicitly
//! resumable computation:
//!
//! ```text
//! NotStarted ──start()──► Running ──resume() × N──► Completed(Ok | Err(fault))
//!                 │                                   ▲
//!                 └── first poll ─────────────────────┘ (objective never suspended)
//! ```
//!
//! ## Rules
//! - `start()` polls the objective once; it may be called at most once.
//! - `resume()` polls once more; it is a no-op unless the task is running.
//! - Faults (including panics) are captured as the terminal state, never
//!   propagated to the caller of `start()`/`resume()`.
//! - Completion is final; a completed task is discarded, never reused.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use futures::task::noop_waker_ref;

use crate::core::context::TaskContext;
use crate::error::{RuntimeError, TaskError};
use crate::tasks::ObjectiveRef;

/// Observable lifecycle of a [`CooperativeTask`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    NotStarted,
    Running,
    Completed,
}

enum State {
    NotStarted,
    Running(BoxFuture<'static, Result<(), TaskError>>),
    Completed(Option<TaskError>),
}

/// A single run of the objective with its own interjection queue.
pub struct CooperativeTask {
    objective: ObjectiveRef,
    ctx: TaskContext,
    state: State,
}

impl CooperativeTask {
    /// Creates an unstarted task bound to `ctx`.
    pub fn new(objective: ObjectiveRef, ctx: TaskContext) -> Self {
        Self {
            objective,
            ctx,
            state: State::NotStarted,
        }
    }

    /// Begins executing the objective, running it up to its first suspend point.
    pub fn start(&mut self) -> Result<(), RuntimeError> {
        if !matches!(self.state, State::NotStarted) {
            return Err(RuntimeError::AlreadyStarted);
        }

        let objective = Arc::clone(&self.objective);
        let ctx = self.ctx.clone();
        let run = async move { objective.run(ctx).await };
        let fut = AssertUnwindSafe(run).catch_unwind().map(|res| {
            res.unwrap_or_else(|panic| {
                Err(TaskError::Panicked {
                    info: panic_info(&*panic),
                })
            })
        });

        self.state = State::Running(fut.boxed());
        self.resume();
        Ok(())
    }

    /// Runs the objective until its next suspend point (or completion).
    pub fn resume(&mut self) {
        let State::Running(fut) = &mut self.state else {
            return;
        };
        let mut cx = Context::from_waker(noop_waker_ref());
        if let Poll::Ready(res) = fut.poll_unpin(&mut cx) {
            self.state = State::Completed(res.err());
        }
    }

    /// Queues work for the next suspend point. See [`TaskContext::interject`].
    pub fn interject<F, Fut>(&self, work: F) -> Result<(), RuntimeError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.ctx.interject(work)
    }

    /// The context handed to the objective.
    pub fn context(&self) -> &TaskContext {
        &self.ctx
    }

    pub fn has_started(&self) -> bool {
        !matches!(self.state, State::NotStarted)
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, State::Completed(_))
    }

    /// The captured fault, once completed.
    pub fn fault(&self) -> Option<&TaskError> {
        match &self.state {
            State::Completed(fault) => fault.as_ref(),
            _ => None,
        }
    }

    pub fn status(&self) -> TaskStatus {
        match self.state {
            State::NotStarted => TaskStatus::NotStarted,
            State::Running(_) => TaskStatus::Running,
            State::Completed(_) => TaskStatus::Completed,
        }
    }

    /// Name of the objective this task runs.
    pub fn name(&self) -> &str {
        self.objective.name()
    }
}

fn panic_info(any: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
