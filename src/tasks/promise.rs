//! # One-shot completion slot.
//!
//! A one-shot task carries a typed fulfilment slot: the action writes its
//! return value (or captured failure) into the slot exactly once, and the
//! submitter observes it through a [`CompletionHandle`].
//!
//! ## Rules
//! - Single producer: the [`Fulfiller`] is moved into the task's action.
//! - Single consumer: `wait`/`wait_timeout` take the handle by value.
//! - Dropping the producer without fulfilling resolves the handle with
//!   [`TaskError::Dropped`], so a task discarded at shutdown (or removed
//!   from a flow) never leaves its submitter blocked.

use std::mem;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::error::TaskError;
use crate::sync::recover;

enum SlotState<R> {
    Pending,
    Ready(Result<R, TaskError>),
    Taken,
}

struct Slot<R> {
    state: Mutex<SlotState<R>>,
    ready: Condvar,
}

/// Creates a connected fulfiller/handle pair.
pub(crate) fn slot<R>() -> (Fulfiller<R>, CompletionHandle<R>) {
    let shared = Arc::new(Slot {
        state: Mutex::new(SlotState::Pending),
        ready: Condvar::new(),
    });
    (
        Fulfiller {
            slot: Arc::clone(&shared),
        },
        CompletionHandle { slot: shared },
    )
}

/// Producer half, owned by the task's action.
pub(crate) struct Fulfiller<R> {
    slot: Arc<Slot<R>>,
}

impl<R> Fulfiller<R> {
    /// Writes the outcome. Later writes are ignored.
    pub(crate) fn fulfil(&self, outcome: Result<R, TaskError>) {
        let mut state = recover(self.slot.state.lock());
        if matches!(*state, SlotState::Pending) {
            *state = SlotState::Ready(outcome);
            self.slot.ready.notify_all();
        }
    }
}

impl<R> Drop for Fulfiller<R> {
    fn drop(&mut self) {
        let mut state = recover(self.slot.state.lock());
        if matches!(*state, SlotState::Pending) {
            *state = SlotState::Ready(Err(TaskError::Dropped));
            self.slot.ready.notify_all();
        }
    }
}

/// One-time handle to a one-shot task's outcome.
///
/// Returned by [`make_once_task`](crate::make_once_task). Resolves with
/// the action's return value, with [`TaskError::Panicked`] if the action
/// panicked, or with [`TaskError::Dropped`] if the task was released
/// without ever running.
pub struct CompletionHandle<R> {
    slot: Arc<Slot<R>>,
}

impl<R> CompletionHandle<R> {
    /// Blocks until the task completes and returns its outcome.
    pub fn wait(self) -> Result<R, TaskError> {
        let mut state = recover(self.slot.state.lock());
        loop {
            match mem::replace(&mut *state, SlotState::Taken) {
                SlotState::Ready(outcome) => return outcome,
                SlotState::Taken => return Err(TaskError::Dropped),
                SlotState::Pending => {
                    *state = SlotState::Pending;
                    state = recover(self.slot.ready.wait(state));
                }
            }
        }
    }

    /// Blocks until the task completes or `timeout` elapses.
    pub fn wait_timeout(self, timeout: Duration) -> Result<R, TaskError> {
        let deadline = Instant::now() + timeout;
        let mut state = recover(self.slot.state.lock());
        loop {
            match mem::replace(&mut *state, SlotState::Taken) {
                SlotState::Ready(outcome) => return outcome,
                SlotState::Taken => return Err(TaskError::Dropped),
                SlotState::Pending => {
                    *state = SlotState::Pending;
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(TaskError::WaitTimeout { timeout });
                    }
                    let (guard, _) = recover(self.slot.ready.wait_timeout(state, deadline - now));
                    state = guard;
                }
            }
        }
    }

    /// True once an outcome is available; does not consume it.
    pub fn is_ready(&self) -> bool {
        matches!(*recover(self.slot.state.lock()), SlotState::Ready(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn resolves_with_value() {
        let (tx, rx) = slot::<u32>();
        tx.fulfil(Ok(7));
        assert!(rx.is_ready());
        assert_eq!(rx.wait().unwrap(), 7);
    }

    #[test]
    fn first_write_wins() {
        let (tx, rx) = slot::<u32>();
        tx.fulfil(Ok(1));
        tx.fulfil(Ok(2));
        assert_eq!(rx.wait().unwrap(), 1);
    }

    #[test]
    fn dropped_producer_resolves_dropped() {
        let (tx, rx) = slot::<u32>();
        drop(tx);
        match rx.wait() {
            Err(TaskError::Dropped) => {}
            other => panic!("expected Dropped, got {other:?}"),
        }
    }

    #[test]
    fn wait_timeout_elapses() {
        let (_tx, rx) = slot::<u32>();
        match rx.wait_timeout(Duration::from_millis(10)) {
            Err(TaskError::WaitTimeout { .. }) => {}
            other => panic!("expected WaitTimeout, got {other:?}"),
        }
    }

    #[test]
    fn wait_blocks_until_fulfilled() {
        let (tx, rx) = slot::<&'static str>();
        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            tx.fulfil(Ok("done"));
        });
        assert_eq!(rx.wait().unwrap(), "done");
        producer.join().unwrap();
    }
}
