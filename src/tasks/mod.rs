//! # Objective abstractions.
//!
//! - [`Objective`] - trait for the restartable main procedure
//! - [`ObjectiveFn`] - function-backed implementation
//! - [`ObjectiveRef`] - shared reference (`Arc<dyn Objective>`)

mod task;
mod task_fn;

pub use task::{Objective, ObjectiveRef};
pub use task_fn::ObjectiveFn;
