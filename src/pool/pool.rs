//! # Fixed-size worker pool.
//!
//! Workers block on the ready queue, pop the most urgent task, run its
//! action and fire its completion hook. The hook re-enters the scheduler
//! (dependent fan-out, interval re-arm, event re-registration), so
//! workers are also submitters.
//!
//! ## Shutdown
//! `shutdown` latches the queue closed, wakes every worker and joins
//! them. In-flight actions are never interrupted; queued tasks that were
//! not picked up are dropped with the pool.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::sync::recover;
use crate::tasks::Task;

use super::queue::ReadyQueue;

/// Fixed set of workers draining the priority-ordered ready queue.
pub struct WorkerPool {
    queue: Arc<ReadyQueue>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Spawns `count` workers (clamped to ≥ 1).
    pub fn new(count: usize) -> Self {
        let queue = Arc::new(ReadyQueue::new());
        let count = count.max(1);
        let mut workers = Vec::with_capacity(count);
        for i in 0..count {
            let queue = Arc::clone(&queue);
            let spawned = thread::Builder::new()
                .name(format!("taskloom-worker-{i}"))
                .spawn(move || worker_loop(&queue));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => log::error!("failed to spawn worker {i}: {e}"),
            }
        }
        Self {
            queue,
            workers: Mutex::new(workers),
        }
    }

    /// Number of live workers.
    pub fn worker_count(&self) -> usize {
        recover(self.workers.lock()).len()
    }

    /// Enqueues a task for execution.
    pub(crate) fn push(&self, task: Arc<Task>) {
        self.queue.push(task);
    }

    /// Stops the workers and joins them. Idempotent.
    pub fn shutdown(&self) {
        self.queue.close();
        let handles = std::mem::take(&mut *recover(self.workers.lock()));
        for handle in handles {
            let _ = handle.join();
        }
    }
}

fn worker_loop(queue: &ReadyQueue) {
    while let Some(task) = queue.pop() {
        task.run();
    }
}
