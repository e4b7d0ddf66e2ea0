//! Cross-subsystem scenario: an interval publisher feeding an
//! event-triggered bus consumer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use taskloom::{make_event_task, make_interval_task, time, Config, Runtime};

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

#[derive(Clone, Copy)]
struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

#[test]
fn interval_publisher_drives_event_consumer() {
    let rt = Runtime::new(Config::default());
    rt.start();

    let delivered = Arc::new(AtomicUsize::new(0));
    let in_cb = Arc::clone(&delivered);
    let subscriber = rt.bus().subscribe("color", move |m: &Rgb| {
        assert_eq!((m.r, m.g, m.b), (100, 200, 255));
        in_cb.fetch_add(1, Ordering::SeqCst);
    });

    // The event task drains one bus message per trigger.
    let spinner = Arc::clone(&subscriber);
    let consumer = make_event_task(move || {
        spinner.spin(false);
    });
    rt.scheduler()
        .schedule_event(&consumer, "color_event")
        .unwrap();

    // The publisher task publishes, then emits the event.
    let bus = rt.bus().clone();
    let scheduler = Arc::clone(rt.scheduler());
    let publisher = make_interval_task(move || {
        bus.publish(
            "color",
            Rgb {
                r: 100,
                g: 200,
                b: 255,
            },
        );
        scheduler.emit_event("color_event");
    });
    rt.scheduler()
        .schedule_interval(&publisher, time::ms(10))
        .unwrap();

    assert!(
        eventually(Duration::from_secs(3), || {
            delivered.load(Ordering::SeqCst) >= 3
        }),
        "consumer callback never reached 3 deliveries"
    );

    publisher.cancel_interval();
    rt.shutdown();
}
