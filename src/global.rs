//! # Process-wide default runtime and module-level helpers.
//!
//! The default [`Runtime`] is built lazily on the first call into this
//! surface and lives until [`shutdown`]. After a shutdown the next call
//! builds a fresh default, which keeps tests isolated; tests that want
//! full control instantiate their own [`Runtime`] and never touch the
//! default.
//!
//! All helpers are re-entrant and thread-safe.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::bus::Subscriber;
use crate::config::Config;
use crate::error::ScheduleError;
use crate::runtime::Runtime;
use crate::sync::recover;
use crate::tasks::{Flow, Task};

static DEFAULT: Mutex<Option<Arc<Runtime>>> = Mutex::new(None);

/// The process-wide default runtime, built on first use.
pub fn default_runtime() -> Arc<Runtime> {
    let mut slot = recover(DEFAULT.lock());
    Arc::clone(slot.get_or_insert_with(|| Arc::new(Runtime::new(Config::default()))))
}

/// Enters the default runtime's timer loop on the calling thread;
/// returns once [`shutdown`] is called.
pub fn run() {
    default_runtime().run();
}

/// Tears down the default runtime. The next call into this surface
/// builds a fresh one.
pub fn shutdown() {
    let runtime = recover(DEFAULT.lock()).take();
    if let Some(runtime) = runtime {
        runtime.shutdown();
    }
}

/// Submits a one-shot task for immediate execution on the default
/// runtime.
pub fn schedule_now(task: &Arc<Task>) -> Result<(), ScheduleError> {
    default_runtime().scheduler().schedule_now(task)
}

/// Submits a finished flow to the default runtime.
pub fn schedule_flow(flow: &Flow) -> Result<(), ScheduleError> {
    default_runtime().scheduler().schedule_flow(flow)
}

/// Schedules a one-shot task at `deadline` on the default runtime.
pub fn schedule_at(task: &Arc<Task>, deadline: Instant) -> Result<(), ScheduleError> {
    default_runtime().scheduler().schedule_at(task, deadline)
}

/// Schedules an interval task on the default runtime; the first tick is
/// immediate.
pub fn schedule_interval(task: &Arc<Task>, every: Duration) -> Result<(), ScheduleError> {
    default_runtime().scheduler().schedule_interval(task, every)
}

/// Registers an event task on the default runtime.
pub fn schedule_event(task: &Arc<Task>, event: &str) -> Result<(), ScheduleError> {
    default_runtime().scheduler().schedule_event(task, event)
}

/// Drains the event's registered tasks to the default worker pool.
pub fn emit_event(event: &str) {
    default_runtime().scheduler().emit_event(event);
}

/// Publishes a message on the default bus.
pub fn publish<T: Send + Sync + 'static>(topic: &str, message: T) {
    default_runtime().bus().publish(topic, message);
}

/// Subscribes to a topic on the default bus with the default queue
/// capacity.
pub fn subscribe<T, F>(topic: &str, callback: F) -> Arc<Subscriber<T>>
where
    T: Send + Sync + 'static,
    F: Fn(&T) + Send + Sync + 'static,
{
    default_runtime().bus().subscribe(topic, callback)
}

/// Removes a subscriber from the default bus.
pub fn unsubscribe<T: Send + Sync + 'static>(handle: &Arc<Subscriber<T>>) -> bool {
    default_runtime().bus().unsubscribe(handle)
}
