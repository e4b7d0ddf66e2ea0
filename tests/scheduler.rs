//! End-to-end scheduling behavior on private runtimes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use taskloom::{
    make_event_task, make_interval_task, make_once_task, time, Config, Runtime, ScheduleError,
    TaskError,
};

/// Polls `probe` until it returns true or `budget` elapses.
fn eventually(budget: Duration, probe: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + budget;
    while Instant::now() < deadline {
        if probe() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    probe()
}

#[test]
fn square_once() {
    let rt = Runtime::new(Config::default());
    let x = 7;
    let (task, handle) = make_once_task(move || x * x);
    rt.scheduler().schedule_now(&task).unwrap();
    assert_eq!(handle.wait().unwrap(), 49);
    rt.shutdown();
}

#[test]
fn wrong_kind_is_rejected_everywhere() {
    let rt = Runtime::new(Config::default());
    let scheduler = rt.scheduler();

    let interval = make_interval_task(|| ());
    let event = make_event_task(|| ());
    let (once, _) = make_once_task(|| ());

    assert!(matches!(
        scheduler.schedule_now(&interval),
        Err(ScheduleError::WrongKind { .. })
    ));
    assert!(matches!(
        scheduler.schedule_at(&event, time::after(time::ms(1))),
        Err(ScheduleError::WrongKind { .. })
    ));
    assert!(matches!(
        scheduler.schedule_interval(&once, time::ms(1)),
        Err(ScheduleError::WrongKind { .. })
    ));
    assert!(matches!(
        scheduler.schedule_event(&once, "ping"),
        Err(ScheduleError::WrongKind { .. })
    ));
    rt.shutdown();
}

#[test]
fn delayed_task_never_runs_early() {
    let rt = Runtime::new(Config::default());
    rt.start();

    let target = time::after(time::ms(50));
    let (task, handle) = make_once_task(time::now);
    rt.scheduler().schedule_at(&task, target).unwrap();

    let ran_at = handle.wait().unwrap();
    assert!(ran_at >= target, "task ran before its deadline");
    let excess = ran_at - target;
    assert!(excess < time::ms(250), "excess latency {excess:?}");
    rt.shutdown();
}

#[test]
fn short_delay_takes_the_spin_path() {
    let rt = Runtime::new(Config::default());
    rt.start();

    // Under the default 20ms spin threshold.
    let target = time::after(time::ms(5));
    let (task, handle) = make_once_task(time::now);
    rt.scheduler().schedule_at(&task, target).unwrap();

    let ran_at = handle.wait().unwrap();
    assert!(ran_at >= target);
    rt.shutdown();
}

#[test]
fn deadline_in_the_past_runs_immediately() {
    let rt = Runtime::new(Config::default());
    rt.start();

    let (task, handle) = make_once_task(|| 11);
    rt.scheduler()
        .schedule_at(&task, Instant::now() - Duration::from_millis(5))
        .unwrap();
    assert_eq!(handle.wait_timeout(time::secs(2)).unwrap(), 11);
    rt.shutdown();
}

#[test]
fn interval_ticks_then_cancel_leaks_no_late_tick() {
    let rt = Runtime::new(Config::default());
    rt.start();

    let ticks = Arc::new(AtomicUsize::new(0));
    let in_action = Arc::clone(&ticks);
    let task = make_interval_task(move || {
        in_action.fetch_add(1, Ordering::SeqCst);
    });
    rt.scheduler().schedule_interval(&task, time::ms(5)).unwrap();

    assert!(
        eventually(Duration::from_secs(2), || ticks.load(Ordering::SeqCst) >= 5),
        "interval never reached 5 ticks"
    );

    task.cancel_interval();
    // Let the one permissible in-flight tick drain.
    thread::sleep(Duration::from_millis(50));
    let settled = ticks.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(ticks.load(Ordering::SeqCst), settled, "tick after cancel");
    rt.shutdown();
}

#[test]
fn first_interval_tick_is_immediate() {
    let rt = Runtime::new(Config::default());
    // No timer thread: the first tick goes straight to the pool.
    let ticks = Arc::new(AtomicUsize::new(0));
    let in_action = Arc::clone(&ticks);
    let task = make_interval_task(move || {
        in_action.fetch_add(1, Ordering::SeqCst);
    });
    rt.scheduler().schedule_interval(&task, time::secs(60)).unwrap();

    assert!(eventually(Duration::from_secs(2), || {
        ticks.load(Ordering::SeqCst) == 1
    }));
    task.cancel_interval();
    rt.shutdown();
}

#[test]
fn strict_priority_on_a_single_worker() {
    let mut cfg = Config::default();
    cfg.workers = 1;
    let rt = Runtime::new(cfg);

    // Occupy the only worker so the queue backs up.
    let (gate_tx, gate_rx) = mpsc::channel::<()>();
    let (gate, gate_done) = make_once_task(move || {
        let _ = gate_rx.recv();
    });
    rt.scheduler().schedule_now(&gate).unwrap();

    let order = Arc::new(Mutex::new(Vec::new()));
    let mut handles = Vec::new();
    // Submit the urgent task last; it must still run first.
    for priority in [5usize, 1] {
        let order = Arc::clone(&order);
        let (task, handle) = make_once_task(move || {
            order.lock().unwrap().push(priority);
        });
        task.set_priority(priority);
        rt.scheduler().schedule_now(&task).unwrap();
        handles.push(handle);
    }

    gate_tx.send(()).unwrap();
    gate_done.wait().unwrap();
    for handle in handles {
        handle.wait().unwrap();
    }
    assert_eq!(*order.lock().unwrap(), vec![1, 5]);
    rt.shutdown();
}

#[test]
fn every_accepted_task_runs_exactly_once() {
    let rt = Runtime::new(Config::default());
    let hits = Arc::new(AtomicUsize::new(0));
    let mut handles = Vec::new();
    for _ in 0..64 {
        let hits = Arc::clone(&hits);
        let (task, handle) = make_once_task(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        });
        rt.scheduler().schedule_now(&task).unwrap();
        handles.push(handle);
    }
    for handle in handles {
        handle.wait().unwrap();
    }
    assert_eq!(hits.load(Ordering::SeqCst), 64);
    rt.shutdown();
}

#[test]
fn panicking_action_reports_and_pool_survives() {
    let rt = Runtime::new(Config::default());

    let (bad, bad_handle) = make_once_task(|| -> u32 { panic!("exploded") });
    rt.scheduler().schedule_now(&bad).unwrap();
    match bad_handle.wait() {
        Err(TaskError::Panicked { reason }) => assert_eq!(reason, "exploded"),
        other => panic!("expected Panicked, got {other:?}"),
    }

    // Workers keep draining after a panic.
    let (ok, ok_handle) = make_once_task(|| 3);
    rt.scheduler().schedule_now(&ok).unwrap();
    assert_eq!(ok_handle.wait().unwrap(), 3);
    rt.shutdown();
}

#[test]
fn submissions_after_shutdown_are_discarded() {
    let rt = Runtime::new(Config::default());
    rt.shutdown();

    let (task, handle) = make_once_task(|| 1);
    assert!(matches!(
        rt.scheduler().schedule_now(&task),
        Err(ScheduleError::ShutdownInProgress)
    ));

    // The discarded task never runs; dropping it resolves the handle.
    drop(task);
    assert!(matches!(handle.wait(), Err(TaskError::Dropped)));
}
