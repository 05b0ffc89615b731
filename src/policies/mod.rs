//! Recovery policy.
//!
//! This module groups the knobs that control **what** happens when the focus
//! completes and **when** its replacement starts.
//!
//! ## Contents
//! - [`Recovery`]  decision derived from the focus's terminal state
//! - [`StartMode`] whether a refocused task starts in the same tick or the next
//!
//! ## Quick wiring
//! ```text
//! SupervisorConfig { on_fault, on_abort, start_mode, .. }
//!      └─► core::Supervisor::evaluate uses:
//!           - Recovery::decide(focus, on_fault.is_some()) to refocus or fail
//!           - start_mode to start the refocused task now or next tick
//! ```

mod recovery;

pub use recovery::{Recovery, StartMode};
