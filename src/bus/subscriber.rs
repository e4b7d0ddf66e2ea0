//! # Bounded subscriber queue.
//!
//! Each subscriber owns a FIFO of shared messages of a single type plus
//! the user callback. The queue has a fixed capacity; overflow drops the
//! incoming message and reports the failed push, so a slow subscriber
//! only ever loses its own messages.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};

use crate::sync::recover;

type Callback<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Bounded FIFO + callback, bound to one topic and one message type.
///
/// Created by [`Bus::subscribe`](crate::Bus::subscribe); lives until
/// explicit [`Bus::unsubscribe`](crate::Bus::unsubscribe).
pub struct Subscriber<T> {
    topic: String,
    capacity: usize,
    queue: Mutex<VecDeque<Arc<T>>>,
    arrived: Condvar,
    callback: Callback<T>,
}

impl<T: Send + Sync + 'static> Subscriber<T> {
    pub(crate) fn new<F>(topic: &str, capacity: usize, callback: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Self {
            topic: topic.to_string(),
            capacity,
            queue: Mutex::new(VecDeque::new()),
            arrived: Condvar::new(),
            callback: Box::new(callback),
        }
    }

    /// Topic this subscriber is registered under.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Maximum queued messages.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Currently queued messages.
    pub fn len(&self) -> usize {
        recover(self.queue.lock()).len()
    }

    /// True when no messages are queued.
    pub fn is_empty(&self) -> bool {
        recover(self.queue.lock()).is_empty()
    }

    /// Pops the oldest message and invokes the callback with it; one
    /// message per call, never a loop.
    ///
    /// With `block = false` returns immediately; with `block = true`
    /// waits until a message arrives. The callback runs outside the
    /// queue lock, so publishers are never blocked by it. Returns true
    /// if a message was processed.
    pub fn spin(&self, block: bool) -> bool {
        let message = {
            let mut queue = recover(self.queue.lock());
            if block {
                while queue.is_empty() {
                    queue = recover(self.arrived.wait(queue));
                }
            }
            queue.pop_front()
        };
        match message {
            Some(message) => {
                (self.callback)(&message);
                true
            }
            None => false,
        }
    }

    /// Appends a message unless the queue is at capacity. A full queue
    /// drops the incoming message and reports `false`.
    pub(crate) fn push(&self, message: Arc<T>) -> bool {
        let mut queue = recover(self.queue.lock());
        if queue.len() >= self.capacity {
            return false;
        }
        queue.push_back(message);
        self.arrived.notify_one();
        true
    }
}
