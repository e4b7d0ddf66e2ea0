//! Pub/sub bus behavior through the public surface.

use std::sync::{Arc, Mutex};

use taskloom::{Bus, Config, Runtime};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

#[test]
fn both_subscribers_see_the_same_message_body() {
    let bus = Bus::default();
    let first = Arc::new(Mutex::new(None));
    let second = Arc::new(Mutex::new(None));

    let (a, b) = (Arc::clone(&first), Arc::clone(&second));
    let s1 = bus.subscribe("color", move |m: &Rgb| {
        *a.lock().unwrap() = Some(*m);
    });
    let s2 = bus.subscribe("color", move |m: &Rgb| {
        *b.lock().unwrap() = Some(*m);
    });

    let sent = Rgb {
        r: 100,
        g: 200,
        b: 255,
    };
    bus.publish("color", sent);
    assert!(s1.spin(false));
    assert!(s2.spin(false));
    assert_eq!(*first.lock().unwrap(), Some(sent));
    assert_eq!(*second.lock().unwrap(), Some(sent));
}

#[test]
fn slow_subscriber_drops_past_capacity() {
    let bus = Bus::default();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let in_cb = Arc::clone(&seen);
    // Default capacity is 10; the 11th and 12th messages are dropped.
    let sub = bus.subscribe("burst", move |m: &u32| {
        in_cb.lock().unwrap().push(*m);
    });

    for i in 0..12u32 {
        bus.publish("burst", i);
    }
    while sub.spin(false) {}

    assert_eq!(*seen.lock().unwrap(), (0..10).collect::<Vec<_>>());
}

#[test]
fn unsubscribed_handles_receive_nothing_more() {
    let bus = Bus::default();
    let sub = bus.subscribe("t", |_: &u32| {});

    bus.publish("t", 1u32);
    assert!(bus.unsubscribe(&sub));
    bus.publish("t", 2u32);

    // Only the pre-unsubscribe message is queued.
    assert!(sub.spin(false));
    assert!(!sub.spin(false));
    assert!(!bus.unsubscribe(&sub));
}

#[test]
fn runtime_bus_clones_share_the_topic_table() {
    let rt = Runtime::new(Config::default());
    let bus = rt.bus().clone();

    let seen = Arc::new(Mutex::new(0u32));
    let in_cb = Arc::clone(&seen);
    let sub = rt.bus().subscribe("shared", move |m: &u32| {
        *in_cb.lock().unwrap() = *m;
    });

    bus.publish("shared", 41u32);
    assert!(sub.spin(false));
    assert_eq!(*seen.lock().unwrap(), 41);
    rt.shutdown();
}
