//! # Interjection queue.
//!
//! The one piece of state shared across execution contexts: producers on any
//! thread push work, the focus drains it at its next suspend point.
//!
//! ```text
//! producer A ──┐
//! producer B ──┼── push ──► [ Mutex<VecDeque> ] ── take_all (one critical section)
//! watch      ──┘                                          │
//!                                                         ▼
//!                                    snapshot executed FIFO, outside the lock
//! ```
//!
//! ## Rules
//! - Order is the order in which `push` acquired the lock.
//! - `take_all` removes everything queued at that instant; work pushed while a
//!   snapshot executes waits for the next drain.
//! - Unbounded unless a capacity is configured.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use futures::future::BoxFuture;

use crate::error::{RuntimeError, TaskError};

/// One unit of deferred work.
pub(crate) type Interjection =
    Box<dyn FnOnce() -> BoxFuture<'static, Result<(), TaskError>> + Send + 'static>;

pub(crate) struct InterjectionQueue {
    pending: Mutex<VecDeque<Interjection>>,
    capacity: Option<usize>,
}

impl InterjectionQueue {
    pub(crate) fn new(capacity: Option<usize>) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    /// Enqueues `work`, rejecting it when a configured capacity is reached.
    pub(crate) fn push(&self, work: Interjection) -> Result<(), RuntimeError> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(capacity) = self.capacity {
            if pending.len() >= capacity {
                return Err(RuntimeError::InterjectionOverflow { capacity });
            }
        }
        pending.push_back(work);
        Ok(())
    }

    /// Atomically removes and returns every queued item.
    pub(crate) fn take_all(&self) -> VecDeque<Interjection> {
        std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub(crate) fn len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
