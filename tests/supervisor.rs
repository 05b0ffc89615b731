use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use futures::task::noop_waker_ref;

use tickvisor::{
    Event, EventKind, ManualTrigger, ObjectiveFn, ObjectiveRef, RuntimeError, StartMode,
    Subscribe, SubscribeFn, Supervisor, SupervisorConfig, TaskContext, TaskError, TaskStatus, VirtualClock,
    WaitOptions,
};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn instant() -> ObjectiveRef {
    ObjectiveFn::arc("instant", |_ctx: TaskContext| async { Ok::<_, TaskError>(()) })
}

fn recorder() -> (Arc<Mutex<Vec<String>>>, Arc<dyn Subscribe>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink: Arc<dyn Subscribe> = {
        let lines = Arc::clone(&lines);
        SubscribeFn::arc("recorder", move |ev: &Event| {
            lines.lock().unwrap().push(ev.to_string())
        })
    };
    (lines, sink)
}

fn poll<T>(fut: &mut BoxFuture<'static, T>) -> Poll<T> {
    let mut cx = Context::from_waker(noop_waker_ref());
    fut.poll_unpin(&mut cx)
}

/// Queues work on the focus that flips the returned flag when it runs.
fn interject_flag(sup: &Supervisor) -> Arc<AtomicU32> {
    let ran = Arc::new(AtomicU32::new(0));
    let flag = Arc::clone(&ran);
    sup.interject(move || async move {
        flag.fetch_add(1, Ordering::SeqCst);
        Ok::<_, TaskError>(())
    })
    .unwrap();
    ran
}

async fn spin(ctx: TaskContext) -> Result<(), TaskError> {
    loop {
        ctx.yield_now().await?;
    }
}

async fn suspend_loop(ctx: TaskContext, log: Arc<Mutex<Vec<String>>>) -> Result<(), TaskError> {
    loop {
        log.lock().unwrap().push("suspend".to_string());
        ctx.delay(ms(10)).await?;
        log.lock().unwrap().push("resumed".to_string());
    }
}

#[test]
fn test_restart_on_success_refocuses_every_tick() {
    let clock = VirtualClock::new();
    let (lines, sink) = recorder();
    let cfg = SupervisorConfig::builder(instant()).with_log(sink).build();
    let mut sup = Supervisor::new(cfg, clock.shared());

    sup.evaluate().unwrap();
    assert_eq!(sup.generation(), 1);
    for n in 2..=5 {
        sup.evaluate().unwrap();
        assert_eq!(sup.generation(), n);
    }

    let lines = lines.lock().unwrap();
    assert_eq!(lines[0], "starting main objective");
    assert!(lines[1..].iter().all(|l| l == "objective met, refocusing"));
    assert_eq!(lines.len(), 5);
}

#[test]
fn test_abort_round_trip() {
    let clock = VirtualClock::new();
    let aborts = Arc::new(Mutex::new(Vec::new()));
    let (lines, sink) = recorder();
    let main: ObjectiveRef = ObjectiveFn::arc("main", |ctx: TaskContext| async move {
        ctx.yield_now().await?;
        Err::<(), _>(TaskError::abort("player fell"))
    });
    let cfg = SupervisorConfig::builder(main)
        .on_abort({
            let aborts = Arc::clone(&aborts);
            move |reason: &str| aborts.lock().unwrap().push(reason.to_string())
        })
        .with_start_mode(StartMode::NextTick)
        .with_log(sink)
        .build();
    let mut sup = Supervisor::new(cfg, clock.shared());

    sup.evaluate().unwrap(); // create + start
    sup.evaluate().unwrap(); // resume → aborts
    assert!(aborts.lock().unwrap().is_empty());

    sup.evaluate().unwrap(); // observe abort, refocus
    assert_eq!(*aborts.lock().unwrap(), vec!["player fell".to_string()]);
    assert_eq!(sup.generation(), 2);
    assert_eq!(sup.focus_status(), Some(TaskStatus::NotStarted));
    assert_eq!(
        lines.lock().unwrap().last().map(String::as_str),
        Some("refocusing after player fell")
    );
}

#[test]
fn test_handled_fault_refocuses() {
    let clock = VirtualClock::new();
    let faults = Arc::new(Mutex::new(Vec::new()));
    let (lines, sink) = recorder();
    let main: ObjectiveRef = ObjectiveFn::arc("main", |_ctx: TaskContext| async {
        Err::<(), _>(TaskError::fail("door jammed"))
    });
    let cfg = SupervisorConfig::builder(main)
        .on_fault({
            let faults = Arc::clone(&faults);
            move |fault: &TaskError| faults.lock().unwrap().push(fault.clone())
        })
        .with_log(sink)
        .build();
    let mut sup = Supervisor::new(cfg, clock.shared());

    sup.evaluate().unwrap();
    sup.evaluate().unwrap();
    assert_eq!(*faults.lock().unwrap(), vec![TaskError::fail("door jammed")]);
    assert_eq!(sup.generation(), 2);
    assert!(!sup.is_faulted());
    assert_eq!(
        lines.lock().unwrap().last().map(String::as_str),
        Some("refocusing after handled fault")
    );
}

#[test]
fn test_unhandled_fault_is_fatal() {
    let clock = VirtualClock::new();
    let watched = Arc::new(AtomicU32::new(0));
    let main: ObjectiveRef = ObjectiveFn::arc("main", |_ctx: TaskContext| async {
        Err::<(), _>(TaskError::fail("boom"))
    });
    let cfg = SupervisorConfig::builder(main)
        .with_watch({
            let watched = Arc::clone(&watched);
            move |_sup: &Supervisor| {
                watched.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .build();
    let mut sup = Supervisor::new(cfg, clock.shared());

    sup.evaluate().unwrap();
    let err = sup.evaluate().unwrap_err();
    assert_eq!(err.fault(), Some(&TaskError::fail("boom")));
    assert!(sup.is_faulted());
    assert_eq!(sup.generation(), 1);

    // Stays faulted; watches no longer run.
    assert!(matches!(sup.evaluate(), Err(RuntimeError::Unhandled { .. })));
    assert_eq!(watched.load(Ordering::SeqCst), 1);
}

#[test]
fn test_interjections_run_in_order_before_suspend() {
    let clock = VirtualClock::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let main: ObjectiveRef = {
        let log = Arc::clone(&log);
        ObjectiveFn::arc("main", move |ctx: TaskContext| suspend_loop(ctx, Arc::clone(&log)))
    };
    let mut sup = Supervisor::new(SupervisorConfig::new(main), clock.shared());
    sup.evaluate().unwrap();
    log.lock().unwrap().clear();

    for w in ["W1", "W2", "W3"] {
        let log = Arc::clone(&log);
        sup.interject(move || async move {
            log.lock().unwrap().push(w.to_string());
            Ok::<_, TaskError>(())
        })
        .unwrap();
    }
    clock.advance(ms(10));
    sup.evaluate().unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["resumed", "suspend", "W1", "W2", "W3"]
    );
}

#[test]
fn test_interjections_from_other_threads_are_drained() {
    let clock = VirtualClock::new();
    let main: ObjectiveRef = ObjectiveFn::arc("main", spin);
    let mut sup = Supervisor::new(SupervisorConfig::new(main), clock.shared());
    sup.evaluate().unwrap();

    let done = Arc::new(AtomicUsize::new(0));
    let ctx = sup.context().unwrap();
    let producers: Vec<_> = (0..4)
        .map(|_| {
            let ctx = ctx.clone();
            let done = Arc::clone(&done);
            std::thread::spawn(move || {
                for _ in 0..25 {
                    let done = Arc::clone(&done);
                    ctx.interject(move || async move {
                        done.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, TaskError>(())
                    })
                    .unwrap();
                }
            })
        })
        .collect();
    for p in producers {
        p.join().unwrap();
    }

    sup.evaluate().unwrap();
    assert_eq!(done.load(Ordering::SeqCst), 100);
    assert_eq!(ctx.pending_interjections(), 0);
}

#[test]
fn test_failing_interjection_faults_the_focus() {
    let clock = VirtualClock::new();
    let main: ObjectiveRef = ObjectiveFn::arc("main", spin);
    let mut sup = Supervisor::new(SupervisorConfig::new(main), clock.shared());
    sup.evaluate().unwrap();
    sup.interject(|| async { Err::<(), _>(TaskError::fail("bad interjection")) })
        .unwrap();

    sup.evaluate().unwrap(); // drained inside yield_now → objective returns the error
    assert_eq!(
        sup.evaluate(),
        Err(RuntimeError::Unhandled {
            fault: TaskError::fail("bad interjection")
        })
    );
}

#[test]
fn test_condition_wait_times_out_without_raising() {
    let clock = VirtualClock::new();
    let outcome = Arc::new(Mutex::new(None));
    let main: ObjectiveRef = {
        let outcome = Arc::clone(&outcome);
        ObjectiveFn::arc("main", move |ctx: TaskContext| {
            let outcome = Arc::clone(&outcome);
            async move {
                let entered = ctx.now();
                let met = ctx
                    .try_delay_until(|| false, WaitOptions::new().with_timeout(ms(100)))
                    .await?;
                *outcome.lock().unwrap() = Some((met, ctx.now() - entered));
                Ok::<_, TaskError>(())
            }
        })
    };
    let mut sup = Supervisor::new(SupervisorConfig::new(main), clock.shared());

    while outcome.lock().unwrap().is_none() {
        sup.evaluate().unwrap();
        clock.advance(ms(7));
    }
    let (met, waited) = outcome.lock().unwrap().take().unwrap();
    assert!(!met);
    assert!(waited >= ms(100));
    assert!(waited < ms(107));
}

#[test]
fn test_throttled_condition_wait() {
    let clock = VirtualClock::new();
    let counter = Arc::new(AtomicU32::new(0));
    let evals = Arc::new(AtomicU32::new(0));
    let met_at = Arc::new(Mutex::new(None));

    let main: ObjectiveRef = {
        let (counter, evals, met_at) = (counter.clone(), evals.clone(), met_at.clone());
        ObjectiveFn::arc("main", move |ctx: TaskContext| {
            let (counter, evals, met_at) = (counter.clone(), evals.clone(), met_at.clone());
            async move {
                let opts = WaitOptions::new().with_eval_every(ms(10));
                let met = ctx
                    .try_delay_until(
                        move || {
                            evals.fetch_add(1, Ordering::SeqCst);
                            counter.load(Ordering::SeqCst) >= 5
                        },
                        opts,
                    )
                    .await?;
                *met_at.lock().unwrap() = Some((met, ctx.now()));
                std::future::pending::<()>().await;
                Ok::<_, TaskError>(())
            }
        })
    };
    let cfg = SupervisorConfig::builder(main)
        .with_watch({
            let counter = counter.clone();
            move |sup: &Supervisor| {
                // One increment every 10ms of virtual time.
                if sup.now().as_millis() % 10 == 0 {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
                Ok(())
            }
        })
        .build();
    let mut sup = Supervisor::new(cfg, clock.shared());

    // 1ms ticks: counter reaches 5 after the watch at 40ms.
    for _ in 0..=100 {
        sup.evaluate().unwrap();
        clock.advance(ms(1));
    }

    let (met, at) = met_at.lock().unwrap().unwrap();
    assert!(met);
    assert_eq!(at, ms(50));
    // Checked at 10, 20, 30, 40, 50ms only.
    assert_eq!(evals.load(Ordering::SeqCst), 5);
}

#[test]
fn test_trigger_fired_before_wait_has_no_missed_wakeup() {
    let clock = VirtualClock::new();
    let trigger = Arc::new(ManualTrigger::new());
    let resolved = Arc::new(AtomicU32::new(0));
    let main: ObjectiveRef = {
        let (trigger, resolved) = (trigger.clone(), resolved.clone());
        ObjectiveFn::arc("main", move |ctx: TaskContext| {
            let (trigger, resolved) = (trigger.clone(), resolved.clone());
            async move {
                ctx.delay(ms(10)).await?;
                ctx.delay_until_triggered(trigger.as_ref(), WaitOptions::new())
                    .await?;
                resolved.fetch_add(1, Ordering::SeqCst);
                std::future::pending::<()>().await;
                Ok::<_, TaskError>(())
            }
        })
    };
    let mut sup = Supervisor::new(SupervisorConfig::new(main), clock.shared());

    sup.evaluate().unwrap();
    trigger.fire(); // fires before the wait subscribes
    clock.advance(ms(10));
    sup.evaluate().unwrap();

    assert_eq!(resolved.load(Ordering::SeqCst), 1);
}

#[test]
fn test_trigger_wait_resolves_on_later_fire() {
    let clock = VirtualClock::new();
    let trigger = Arc::new(ManualTrigger::new());
    let mut sup = {
        let trigger = trigger.clone();
        let main: ObjectiveRef = ObjectiveFn::arc("main", move |ctx: TaskContext| {
            let trigger = trigger.clone();
            async move {
                ctx.delay_until_triggered(trigger.as_ref(), WaitOptions::new())
                    .await
            }
        });
        Supervisor::new(SupervisorConfig::new(main), clock.shared())
    };

    sup.evaluate().unwrap();
    sup.evaluate().unwrap();
    assert_eq!(sup.focus_status(), Some(TaskStatus::Running));

    trigger.fire();
    sup.evaluate().unwrap();
    assert_eq!(sup.focus_status(), Some(TaskStatus::Completed));
}

#[test]
fn test_watch_runs_once_per_evaluate() {
    let clock = VirtualClock::new();
    let calls = Arc::new(AtomicU32::new(0));
    let cfg = SupervisorConfig::builder(instant())
        .with_watch({
            let calls = Arc::clone(&calls);
            move |_sup: &Supervisor| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .build();
    let mut sup = Supervisor::new(cfg, clock.shared());

    for _ in 0..17 {
        sup.evaluate().unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 17);
    assert_eq!(sup.generation(), 17);
}

#[test]
fn test_watch_error_propagates_and_skips_later_watches() {
    let clock = VirtualClock::new();
    let later = Arc::new(AtomicU32::new(0));
    let cfg = SupervisorConfig::builder(instant())
        .with_watch(|_sup: &Supervisor| Err(TaskError::fail("watch broke")))
        .with_watch({
            let later = Arc::clone(&later);
            move |_sup: &Supervisor| {
                later.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .build();
    let mut sup = Supervisor::new(cfg, clock.shared());

    assert_eq!(
        sup.evaluate(),
        Err(RuntimeError::WatchFailed {
            index: 0,
            error: TaskError::fail("watch broke")
        })
    );
    assert_eq!(later.load(Ordering::SeqCst), 0);
}

#[test]
fn test_start_mode_immediate_starts_refocused_task_same_tick() {
    let clock = VirtualClock::new();
    let cfg = SupervisorConfig::builder(instant())
        .with_start_mode(StartMode::Immediate)
        .build();
    let mut sup = Supervisor::new(cfg, clock.shared());

    sup.evaluate().unwrap();
    sup.evaluate().unwrap();
    assert_eq!(sup.generation(), 2);
    assert_eq!(sup.focus_status(), Some(TaskStatus::Completed));
}

#[test]
fn test_start_mode_next_tick_defers_refocused_task() {
    let clock = VirtualClock::new();
    let cfg = SupervisorConfig::builder(instant())
        .with_start_mode(StartMode::NextTick)
        .build();
    let mut sup = Supervisor::new(cfg, clock.shared());

    sup.evaluate().unwrap();
    assert_eq!(sup.focus_status(), Some(TaskStatus::Completed));

    sup.evaluate().unwrap();
    assert_eq!(sup.generation(), 2);
    assert_eq!(sup.focus_status(), Some(TaskStatus::NotStarted));

    sup.evaluate().unwrap();
    assert_eq!(sup.generation(), 2);
    assert_eq!(sup.focus_status(), Some(TaskStatus::Completed));
}

#[test]
fn test_watch_can_interject_into_focus() {
    let clock = VirtualClock::new();
    let hits = Arc::new(AtomicU32::new(0));
    let main: ObjectiveRef = ObjectiveFn::arc("main", spin);
    let cfg = SupervisorConfig::builder(main)
        .with_watch({
            let hits = Arc::clone(&hits);
            move |sup: &Supervisor| {
                let hits = Arc::clone(&hits);
                sup.interject(move || async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, TaskError>(())
                })
                .map_err(|e| TaskError::fail(e.to_string()))
            }
        })
        .build();
    let mut sup = Supervisor::new(cfg, clock.shared());

    for _ in 0..4 {
        sup.evaluate().unwrap();
    }
    // Work queued by the watch of tick N runs at the suspend point of tick N+1.
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[test]
fn test_bounded_interjection_queue_rejects_overflow() {
    let clock = VirtualClock::new();
    let main: ObjectiveRef = ObjectiveFn::arc("main", |ctx: TaskContext| async move {
        ctx.delay(ms(1_000)).await
    });
    let cfg = SupervisorConfig::builder(main)
        .with_interjection_capacity(2)
        .build();
    let mut sup = Supervisor::new(cfg, clock.shared());
    sup.evaluate().unwrap();

    let noop = || async { Ok::<_, TaskError>(()) };
    sup.interject(noop).unwrap();
    sup.interject(noop).unwrap();
    assert_eq!(
        sup.interject(noop),
        Err(RuntimeError::InterjectionOverflow { capacity: 2 })
    );
}

#[test]
fn test_event_metadata() {
    let clock = VirtualClock::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let events = Arc::clone(&events);
        SubscribeFn::arc("events", move |ev: &Event| events.lock().unwrap().push(ev.clone()))
    };
    let cfg = SupervisorConfig::builder(instant()).with_log(sink).build();
    let mut sup = Supervisor::new(cfg, clock.shared());

    sup.evaluate().unwrap();
    clock.advance(ms(16));
    sup.evaluate().unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events[0].kind, EventKind::FocusStarting);
    assert_eq!(events[0].generation, 1);
    assert_eq!(events[1].kind, EventKind::ObjectiveMet);
    assert_eq!(events[1].generation, 2);
    assert_eq!(events[1].at, ms(16));
    assert_eq!(events[1].objective.as_deref(), Some("instant"));
    assert!(events[1].seq > events[0].seq);
}

async fn zero_delay_loop(ctx: TaskContext, iterations: Arc<AtomicU32>) -> Result<(), TaskError> {
    loop {
        iterations.fetch_add(1, Ordering::SeqCst);
        ctx.delay(Duration::ZERO).await?;
    }
}

#[test]
fn test_zero_delay_gives_the_tick_back() {
    let clock = VirtualClock::new();
    let iterations = Arc::new(AtomicU32::new(0));
    let main: ObjectiveRef = {
        let iterations = Arc::clone(&iterations);
        ObjectiveFn::arc("main", move |ctx: TaskContext| {
            zero_delay_loop(ctx, Arc::clone(&iterations))
        })
    };
    let mut sup = Supervisor::new(SupervisorConfig::new(main), clock.shared());

    sup.evaluate().unwrap();
    assert_eq!(iterations.load(Ordering::SeqCst), 1);
    sup.evaluate().unwrap();
    assert_eq!(iterations.load(Ordering::SeqCst), 2);
}

#[test]
fn test_delay_pass_through_drains_and_waits_on_focus_clock() {
    let clock = VirtualClock::new();
    let mut sup = Supervisor::new(SupervisorConfig::new(ObjectiveFn::arc("main", spin)), clock.shared());
    sup.evaluate().unwrap();

    let ran = interject_flag(&sup);
    let mut fut = sup.delay(ms(20)).unwrap();
    assert!(poll(&mut fut).is_pending());
    assert_eq!(ran.load(Ordering::SeqCst), 1);
    assert_eq!(sup.context().unwrap().pending_interjections(), 0);

    clock.advance(ms(10));
    assert!(poll(&mut fut).is_pending());
    clock.advance(ms(10));
    assert_eq!(poll(&mut fut), Poll::Ready(Ok(())));
}

#[test]
fn test_yield_pass_through_drains_then_suspends_once() {
    let clock = VirtualClock::new();
    let mut sup = Supervisor::new(SupervisorConfig::new(ObjectiveFn::arc("main", spin)), clock.shared());
    sup.evaluate().unwrap();

    let ran = interject_flag(&sup);
    let mut fut = sup.yield_now().unwrap();
    assert!(poll(&mut fut).is_pending());
    assert_eq!(ran.load(Ordering::SeqCst), 1);
    assert_eq!(poll(&mut fut), Poll::Ready(Ok(())));
}

#[test]
fn test_condition_pass_throughs_resolve_against_shared_clock() {
    let clock = VirtualClock::new();
    let mut sup = Supervisor::new(SupervisorConfig::new(ObjectiveFn::arc("main", spin)), clock.shared());
    sup.evaluate().unwrap();

    // try_delay_until: times out without raising.
    let ran = interject_flag(&sup);
    let mut timed = sup
        .try_delay_until(|| false, WaitOptions::new().with_timeout(ms(30)))
        .unwrap();
    let mut polls = 0;
    let met = loop {
        polls += 1;
        if let Poll::Ready(res) = poll(&mut timed) {
            break res;
        }
        clock.advance(ms(10));
    };
    assert_eq!(met, Ok(false));
    assert_eq!(polls, 4);
    assert_eq!(ran.load(Ordering::SeqCst), 1);

    // delay_until: resolves once the condition holds.
    let open = Arc::new(AtomicU32::new(0));
    let mut cond = {
        let open = Arc::clone(&open);
        sup.delay_until(move || open.load(Ordering::SeqCst) > 0, WaitOptions::new())
            .unwrap()
    };
    assert!(poll(&mut cond).is_pending());
    assert!(poll(&mut cond).is_pending());
    open.store(1, Ordering::SeqCst);
    assert_eq!(poll(&mut cond), Poll::Ready(Ok(())));

    // delay_until: raises at the deadline.
    let mut raising = sup
        .delay_until(|| false, WaitOptions::new().with_timeout(ms(10)))
        .unwrap();
    assert!(poll(&mut raising).is_pending());
    clock.advance(ms(10));
    assert_eq!(
        poll(&mut raising),
        Poll::Ready(Err(TaskError::Timeout { timeout: ms(10) }))
    );
}

#[test]
fn test_trigger_pass_through_on_live_focus() {
    let clock = VirtualClock::new();
    let mut sup = Supervisor::new(SupervisorConfig::new(ObjectiveFn::arc("main", spin)), clock.shared());
    sup.evaluate().unwrap();

    let fired = Arc::new(ManualTrigger::new());
    fired.fire();
    let done = sup
        .delay_until_triggered(Arc::clone(&fired), WaitOptions::new())
        .unwrap()
        .now_or_never();
    assert_eq!(done, Some(Ok(())));

    let trigger = Arc::new(ManualTrigger::new());
    let ran = interject_flag(&sup);
    let mut fut = sup
        .delay_until_triggered(Arc::clone(&trigger), WaitOptions::new())
        .unwrap();
    assert!(poll(&mut fut).is_pending());
    assert_eq!(ran.load(Ordering::SeqCst), 1);
    assert!(poll(&mut fut).is_pending());

    trigger.fire();
    assert_eq!(poll(&mut fut), Poll::Ready(Ok(())));
}
