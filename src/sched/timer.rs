//! # Timer queue and timer loop.
//!
//! A min-heap of tasks keyed by wake-up deadline, drained by a single
//! dedicated thread. The loop uses a hybrid wait:
//!
//! - deadlines within the spin threshold — and interval tasks whose
//!   period is at or under it — are met by busy-waiting, trading CPU for
//!   jitter on short intervals;
//! - longer sleeps are condition-variable driven with a half-duration
//!   wake, so an insertion sooner than the current sleep target (which
//!   signals the condvar) is re-evaluated promptly.
//!
//! Ties at equal deadlines drain in insertion order. Cancelled interval
//! tasks are dropped at dequeue instead of being pushed to the pool, so
//! a cancel can never leak a late tick past the one already in flight.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::pool::WorkerPool;
use crate::sync::recover;
use crate::tasks::{Task, TaskKind};

struct TimedEntry {
    at: Instant,
    seq: u64,
    task: Arc<Task>,
}

impl PartialEq for TimedEntry {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for TimedEntry {}

impl PartialOrd for TimedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimedEntry {
    // Reversed: soonest deadline pops first, sequence breaks ties.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

pub(crate) struct TimerQueue {
    heap: Mutex<BinaryHeap<TimedEntry>>,
    arrived: Condvar,
    seq: AtomicU64,
}

impl TimerQueue {
    pub(crate) fn new() -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
            arrived: Condvar::new(),
            seq: AtomicU64::new(0),
        }
    }

    /// Inserts `task` with its wake-up deadline and signals the timer
    /// thread, which re-evaluates its sleep target.
    pub(crate) fn insert(&self, at: Instant, task: Arc<Task>) {
        let seq = self.seq.fetch_add(1, AtomicOrdering::Relaxed);
        let mut heap = recover(self.heap.lock());
        heap.push(TimedEntry { at, seq, task });
        // Signal under the lock so a racing sleeper cannot miss it.
        self.arrived.notify_all();
    }

    /// Wakes the timer thread so it can observe the stop latch.
    pub(crate) fn wake(&self) {
        let _heap = recover(self.heap.lock());
        self.arrived.notify_all();
    }

    /// The timer loop. Occupies the calling thread until `stop` is
    /// latched.
    pub(crate) fn run(&self, pool: &WorkerPool, stop: &AtomicBool, spin_threshold: Duration) {
        loop {
            let heap = recover(self.heap.lock());
            let mut heap = recover(
                self.arrived
                    .wait_while(heap, |h| h.is_empty() && !stop.load(AtomicOrdering::Acquire)),
            );
            if stop.load(AtomicOrdering::Acquire) {
                return;
            }
            let Some(head) = heap.peek() else {
                continue;
            };
            let at = head.at;
            let short_period = head.task.kind() == TaskKind::Interval
                && head.task.interval_period() <= spin_threshold;
            let now = Instant::now();

            if at > now {
                let remaining = at - now;
                if short_period || remaining <= spin_threshold {
                    // Latency floor: busy-wait to meet the deadline.
                    drop(heap);
                    while Instant::now() < at {
                        std::hint::spin_loop();
                    }
                } else {
                    // Half-duration wake: re-evaluate on sooner inserts.
                    let (guard, _) = recover(self.arrived.wait_timeout(heap, remaining / 2));
                    drop(guard);
                }
                if stop.load(AtomicOrdering::Acquire) {
                    return;
                }
                continue;
            }

            // Everything due drains in deadline order.
            let mut due = Vec::new();
            loop {
                match heap.peek() {
                    Some(entry) if entry.at <= now => {}
                    _ => break,
                }
                if let Some(entry) = heap.pop() {
                    due.push(entry);
                }
            }
            drop(heap);

            for entry in due {
                if entry.task.kind() == TaskKind::Interval && entry.task.is_interval_cancelled() {
                    log::debug!("interval task {:?} cancelled; dropped at dequeue", entry.task.id());
                    continue;
                }
                pool.push(entry.task);
            }
        }
    }
}
