//! The process-wide default runtime and module-level helpers.
//!
//! A single test exercises the whole surface: the default runtime is
//! shared process state, so sequencing inside one test keeps it
//! deterministic.

use std::thread;

use taskloom::{make_once_task, time};

#[test]
fn default_runtime_surface_end_to_end() {
    // Donate a thread to the timer loop, as a driver program's main
    // thread would.
    let timer = thread::spawn(taskloom::run);

    let (task, handle) = make_once_task(|| 7 * 7);
    taskloom::schedule_now(&task).unwrap();
    assert_eq!(handle.wait().unwrap(), 49);

    let target = time::after(time::ms(30));
    let (delayed, delayed_handle) = make_once_task(time::now);
    taskloom::schedule_at(&delayed, target).unwrap();
    assert!(delayed_handle.wait().unwrap() >= target);

    let subscriber = taskloom::subscribe("greetings", |m: &String| {
        assert_eq!(m, "hi");
    });
    taskloom::publish("greetings", "hi".to_string());
    assert!(subscriber.spin(false));
    assert!(taskloom::unsubscribe(&subscriber));

    taskloom::shutdown();
    timer.join().unwrap();

    // A fresh default comes up after shutdown.
    let (again, again_handle) = make_once_task(|| 1 + 1);
    taskloom::schedule_now(&again).unwrap();
    assert_eq!(again_handle.wait().unwrap(), 2);
    taskloom::shutdown();
}
