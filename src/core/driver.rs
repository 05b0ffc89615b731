//! # TickDriver: the external caller of `evaluate()`.
//!
//! [`TickDriver`] owns the [`VirtualClock`] and turns it forward one tick per
//! `evaluate()`:
//!
//! ```text
//! step():  sup.evaluate()?  ──►  clock.advance(tick)
//!
//! run():   loop {
//!            max_ticks reached?       ─► Ok(ticks)
//!            select! {
//!              token.cancelled()      ─► Ok(ticks)
//!              interval.tick()        ─► step()?   (first error stops the loop)
//!            }
//!          }
//! ```
//!
//! `run_until_signal()` cancels the loop on SIGINT/SIGTERM/SIGQUIT (Ctrl-C on Windows).

use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::core::shutdown;
use crate::core::supervisor::Supervisor;
use crate::error::RuntimeError;
use crate::time::VirtualClock;

/// Pacing of the tick loop.
///
/// ## Field semantics
/// - `tick`: virtual time added after every `evaluate()`
/// - `period`: wall-clock time between two ticks in [`TickDriver::run`]
/// - `max_ticks`: stop after this many ticks (`0` = unlimited)
#[derive(Clone, Debug)]
pub struct DriverConfig {
    pub tick: Duration,
    pub period: Duration,
    pub max_ticks: u64,
}

impl DriverConfig {
    /// Returns the tick limit as an `Option` (`None` = unlimited).
    #[inline]
    pub fn tick_limit(&self) -> Option<u64> {
        if self.max_ticks == 0 {
            None
        } else {
            Some(self.max_ticks)
        }
    }
}

impl Default for DriverConfig {
    /// Default configuration:
    ///
    /// - `tick = 16ms` (one frame of virtual time)
    /// - `period = 16ms` (real-time pacing)
    /// - `max_ticks = 0` (unlimited)
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(16),
            period: Duration::from_millis(16),
            max_ticks: 0,
        }
    }
}

/// Calls [`Supervisor::evaluate`] once per tick and advances virtual time.
pub struct TickDriver {
    cfg: DriverConfig,
    clock: VirtualClock,
}

impl TickDriver {
    /// `clock` must be the clock the supervisor was built with.
    pub fn new(cfg: DriverConfig, clock: VirtualClock) -> Self {
        Self { cfg, clock }
    }

    pub fn clock(&self) -> &VirtualClock {
        &self.clock
    }

    pub fn config(&self) -> &DriverConfig {
        &self.cfg
    }

    /// One tick: evaluate, then advance virtual time by `tick`.
    pub fn step(&self, sup: &mut Supervisor) -> Result<(), RuntimeError> {
        sup.evaluate()?;
        self.clock.advance(self.cfg.tick);
        Ok(())
    }

    /// Runs `ticks` steps back to back, without wall-clock pacing.
    pub fn run_for(&self, sup: &mut Supervisor, ticks: u64) -> Result<(), RuntimeError> {
        for _ in 0..ticks {
            self.step(sup)?;
        }
        Ok(())
    }

    /// Runs the paced tick loop until `token` is cancelled, `max_ticks` is
    /// reached, or `evaluate()` fails. Returns the number of ticks executed.
    pub async fn run(
        &self,
        sup: &mut Supervisor,
        token: CancellationToken,
    ) -> Result<u64, RuntimeError> {
        let mut interval = time::interval(self.cfg.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks: u64 = 0;

        loop {
            if self.cfg.tick_limit().is_some_and(|max| ticks >= max) {
                break;
            }
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = interval.tick() => {
                    self.step(sup)?;
                    ticks += 1;
                }
            }
        }
        Ok(ticks)
    }

    /// [`run`](Self::run), cancelled by an OS termination signal.
    pub async fn run_until_signal(&self, sup: &mut Supervisor) -> Result<u64, RuntimeError> {
        let token = CancellationToken::new();
        let trip = token.clone();
        let listener = tokio::spawn(async move {
            if shutdown::wait_for_shutdown_signal().await.is_ok() {
                trip.cancel();
            }
        });

        let res = self.run(sup, token).await;
        listener.abort();
        res
    }
}
