//! # tickvisor
//!
//! **Tickvisor** is a cooperative, virtual-time supervisor for one long-running
//! objective.
//!
//! An external driver calls [`Supervisor::evaluate`] once per tick. The
//! supervisor keeps exactly one run of the objective in focus, resumes it up to
//! its next explicit suspend point, and, when the run ends, decides how to
//! refocus: success and the abort signal always restart it, other faults restart
//! it only when a fault handler is configured and are fatal otherwise.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   driver (TickDriver or your game loop)
//!        │ evaluate() once per tick                  clock.advance(tick)
//!        ▼                                                  │
//! ┌──────────────────────────────────────────────────────────┼───────┐
//! │  Supervisor                                              ▼       │
//! │  - SupervisorConfig (objective, watches, handlers, sink) Clock   │
//! │  - Recovery policy (Create/Continue/AfterAbort/…/Fatal)          │
//! │  - focus: CooperativeTask ──► TaskContext                        │
//! │                               ├─ InterjectionQueue ◄── interject()│
//! │                               │   (Mutex<VecDeque>)   any thread  │
//! │                               └─ delay / yield_now / delay_until  │
//! │                                  (drain, then suspend on Clock)   │
//! └──────┬───────────────────────────────────────────────────────────┘
//!        │ Event (FocusStarting, ObjectiveMet, RefocusAfter…, Faulted)
//!        ▼
//!   log sink: Subscribe ─► LogWriter | Bus (broadcast) | SubscriberSet
//! ```
//!
//! ### Tick
//! ```text
//! evaluate():
//!   ├─► Recovery::decide(focus)   → create / keep / refocus / fail
//!   ├─► start() or resume() focus → runs until the next suspend point
//!   └─► watches (in order)
//!
//! suspend point (inside the objective):
//!   ├─► drain interjections snapshot (FIFO)
//!   └─► Clock::delay / Clock::yield_once   → Pending until a later tick
//! ```
//!
//! ## Features
//! | Area              | Description                                               | Key types                                   |
//! |-------------------|-----------------------------------------------------------|---------------------------------------------|
//! | **Supervision**   | Focus lifecycle and recovery policy.                      | [`Supervisor`], [`Recovery`], [`StartMode`] |
//! | **Objectives**    | Define the main procedure as a trait or a closure.        | [`Objective`], [`ObjectiveFn`]              |
//! | **Suspension**    | Delays, yields, throttled condition and trigger waits.    | [`TaskContext`], [`WaitOptions`]            |
//! | **Virtual time**  | Injected clock, rate governor, one-shot triggers.         | [`Clock`], [`VirtualClock`], [`RateGovernor`], [`ManualTrigger`] |
//! | **Observability** | Lifecycle events to a pluggable sink.                     | [`Subscribe`], [`Event`], [`Bus`]           |
//! | **Errors**        | Typed errors for objectives and the supervisor.           | [`TaskError`], [`RuntimeError`]             |
//! | **Driving**       | Paced or offline tick loops with graceful stop.           | [`TickDriver`], [`DriverConfig`]            |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::time::Duration;
//! use tickvisor::{
//!     ObjectiveFn, ObjectiveRef, Supervisor, SupervisorConfig, TaskContext, TaskError,
//!     VirtualClock, WaitOptions,
//! };
//!
//! let clock = VirtualClock::new();
//! let score = Arc::new(AtomicU32::new(0));
//!
//! let main: ObjectiveRef = {
//!     let score = score.clone();
//!     ObjectiveFn::arc("collect", move |ctx: TaskContext| {
//!         let score = score.clone();
//!         async move {
//!             let opts = WaitOptions::new().with_eval_every(Duration::from_millis(10));
//!             ctx.delay_until(move || score.load(Ordering::SeqCst) >= 3, opts).await?;
//!             Err::<(), _>(TaskError::abort("level complete"))
//!         }
//!     })
//! };
//!
//! let cfg = SupervisorConfig::builder(main)
//!     .with_watch({
//!         let score = score.clone();
//!         move |_sup: &Supervisor| {
//!             score.fetch_add(1, Ordering::SeqCst);
//!             Ok(())
//!         }
//!     })
//!     .on_abort(|reason: &str| println!("aborted: {reason}"))
//!     .build();
//!
//! let mut sup = Supervisor::new(cfg, clock.shared());
//! for _ in 0..10 {
//!     sup.evaluate()?;
//!     clock.advance(Duration::from_millis(5));
//! }
//! assert!(sup.generation() >= 2);
//! # Ok::<(), tickvisor::RuntimeError>(())
//! ```
mod core;
mod error;
mod events;
mod policies;
mod subscribers;
mod tasks;
mod time;

// ---- Public re-exports ----

pub use crate::core::{
    AbortHandler, CooperativeTask, DriverConfig, FaultHandler, Supervisor, SupervisorConfig,
    SupervisorConfigBuilder, TaskContext, TaskStatus, TickDriver, WaitOptions, Watch,
};
pub use error::{RuntimeError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use policies::{Recovery, StartMode};
pub use subscribers::{Subscribe, SubscribeFn, SubscriberSet};
pub use tasks::{Objective, ObjectiveFn, ObjectiveRef};
pub use time::{Clock, ClockRef, ManualTrigger, RateGovernor, Trigger, TriggerCallback, VirtualClock};

// Optional: expose a simple built-in stdout sink (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
