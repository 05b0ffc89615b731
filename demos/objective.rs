//! # Example: objective
//!
//! A small "game loop" driven by [`TickDriver`]: the main objective waits for
//! a door trigger, collects coins until a throttled condition holds, and then
//! aborts to restart the level. A watch drops coins and opens the door.
//!
//! Demonstrates how to:
//! - Define the main objective with [`ObjectiveFn`].
//! - Wait on a [`ManualTrigger`] and on a throttled condition.
//! - Interject work into the focus from a watch.
//! - Observe the lifecycle through [`LogWriter`].
//!
//! ## Flow
//! ```text
//! TickDriver::run() ──► Supervisor::evaluate() every 16ms
//!     ├─► focus: delay_until_triggered(door) ─► delay_until(coins >= 3)
//!     │          └─► Err(Abort("level complete"))
//!     ├─► on_abort ─► refocus (generation + 1)
//!     └─► watch: open door / drop a coin via interject()
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example objective --features logging
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tickvisor::{
    DriverConfig, LogWriter, ManualTrigger, ObjectiveFn, ObjectiveRef, Supervisor,
    SupervisorConfig, TaskContext, TaskError, TickDriver, VirtualClock, WaitOptions,
};
use tokio_util::sync::CancellationToken;

fn level(door: Arc<ManualTrigger>, coins: Arc<AtomicU32>) -> ObjectiveRef {
    ObjectiveFn::arc("level", move |ctx: TaskContext| {
        let door = Arc::clone(&door);
        let coins = Arc::clone(&coins);
        async move {
            println!("[level] waiting for the door at {:?}", ctx.now());
            ctx.delay_until_triggered(door.as_ref(), WaitOptions::new())
                .await?;

            let opts = WaitOptions::new()
                .with_eval_every(Duration::from_millis(50))
                .with_timeout(Duration::from_secs(2));
            ctx.delay_until(move || coins.load(Ordering::SeqCst) >= 3, opts)
                .await?;

            println!("[level] all coins collected at {:?}", ctx.now());
            Err::<(), _>(TaskError::abort("level complete"))
        }
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let clock = VirtualClock::new();
    let door = Arc::new(ManualTrigger::new());
    let coins = Arc::new(AtomicU32::new(0));

    let cfg = SupervisorConfig::builder(level(Arc::clone(&door), Arc::clone(&coins)))
        .with_watch({
            let door = Arc::clone(&door);
            let coins = Arc::clone(&coins);
            move |sup: &Supervisor| {
                if sup.ticks() % 10 == 0 {
                    door.fire();
                }
                if sup.ticks() % 7 == 0 {
                    let coins = Arc::clone(&coins);
                    sup.interject(move || async move {
                        coins.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, TaskError>(())
                    })
                    .map_err(|e| TaskError::fail(e.to_string()))?;
                }
                Ok(())
            }
        })
        .on_abort({
            let door = Arc::clone(&door);
            let coins = Arc::clone(&coins);
            move |reason: &str| {
                println!("[on_abort] {reason}; resetting level");
                door.reset();
                coins.store(0, Ordering::SeqCst);
            }
        })
        .with_log(Arc::new(LogWriter::new()))
        .build();

    let mut sup = Supervisor::new(cfg, clock.shared());
    let driver = TickDriver::new(
        DriverConfig {
            max_ticks: 200,
            ..DriverConfig::default()
        },
        clock,
    );

    let ticks = driver.run(&mut sup, CancellationToken::new()).await?;
    println!(
        "done: ticks={ticks} generation={} virtual={:?}",
        sup.generation(),
        sup.now()
    );
    Ok(())
}
