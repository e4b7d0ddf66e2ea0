//! # Priority-ordered ready queue.
//!
//! The store feeding the worker pool. Ordered by task priority,
//! ascending (lower value = more urgent); ties pop in unspecified
//! order. One mutex/condvar pair guards the heap; the close latch makes
//! workers drain out after their current action and turns later pushes
//! into silent discards.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Condvar, Mutex};

use crate::sync::recover;
use crate::tasks::Task;

/// Heap entry carrying a snapshot of the task's priority at enqueue
/// time, so later `set_priority` calls cannot disturb the heap order.
struct ReadyEntry {
    priority: usize,
    task: Arc<Task>,
}

impl PartialEq for ReadyEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}

impl Eq for ReadyEntry {}

impl PartialOrd for ReadyEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReadyEntry {
    // Reversed: BinaryHeap is a max-heap, we pop the lowest priority
    // value first.
    fn cmp(&self, other: &Self) -> Ordering {
        other.priority.cmp(&self.priority)
    }
}

pub(crate) struct ReadyQueue {
    heap: Mutex<BinaryHeap<ReadyEntry>>,
    available: Condvar,
    closed: AtomicBool,
}

impl ReadyQueue {
    pub(crate) fn new() -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
            available: Condvar::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Enqueues `task`. Pushes after `close` are discarded.
    pub(crate) fn push(&self, task: Arc<Task>) {
        if self.closed.load(AtomicOrdering::Acquire) {
            log::debug!("ready queue closed; task {:?} discarded", task.id());
            return;
        }
        let entry = ReadyEntry {
            priority: task.priority(),
            task,
        };
        let mut heap = recover(self.heap.lock());
        heap.push(entry);
        // Signal under the lock so a racing waiter cannot miss it.
        self.available.notify_one();
    }

    /// Blocks until a task is available or the queue is closed.
    ///
    /// Returns `None` on close, even if entries remain: workers exit
    /// after their current action.
    pub(crate) fn pop(&self) -> Option<Arc<Task>> {
        let mut heap = recover(self.heap.lock());
        loop {
            if self.closed.load(AtomicOrdering::Acquire) {
                return None;
            }
            if let Some(entry) = heap.pop() {
                return Some(entry.task);
            }
            heap = recover(self.available.wait(heap));
        }
    }

    /// Latches the queue closed and wakes every worker.
    pub(crate) fn close(&self) {
        self.closed.store(true, AtomicOrdering::Release);
        let _heap = recover(self.heap.lock());
        self.available.notify_all();
    }
}
