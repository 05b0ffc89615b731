//! Runtime core: focus supervision and cooperative suspension.
//!
//! Public API from this module: [`Supervisor`], [`SupervisorConfig`],
//! [`CooperativeTask`], [`TaskContext`], [`TickDriver`].
//!
//! Internal modules:
//! - [`supervisor`]: recovery policy, pass-throughs, watches;
//! - [`task`]: one resumable run of the objective;
//! - [`context`]: suspend primitives and condition waits;
//! - [`interjections`]: the cross-thread work queue;
//! - [`config`] / [`builder`]: immutable configuration;
//! - [`driver`] / [`shutdown`]: the tick loop and its OS-signal stop.

mod builder;
mod config;
mod context;
mod driver;
mod interjections;
mod shutdown;
mod supervisor;
mod task;

pub use builder::SupervisorConfigBuilder;
pub use config::{AbortHandler, FaultHandler, SupervisorConfig, Watch};
pub use context::{TaskContext, WaitOptions};
pub use driver::{DriverConfig, TickDriver};
pub use supervisor::Supervisor;
pub use task::{CooperativeTask, TaskStatus};
