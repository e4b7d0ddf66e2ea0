//! # Runtime: pool + scheduler + bus under one roof.
//!
//! [`Runtime`] wires the three subsystems together from a [`Config`]
//! and owns their lifecycle. Programs that want the process-wide
//! default use the crate-level free functions instead; tests and
//! embedders create private runtimes for isolation.
//!
//! ## Timer thread
//! The timer loop needs a thread. Either donate the calling thread with
//! [`Runtime::run`] (the usual shape for a driver program's main
//! thread) or let [`Runtime::start`] spawn the dedicated timer thread.
//!
//! ## Shutdown
//! `shutdown` latches the scheduler's stop flag, wakes and joins the
//! timer thread (if one was spawned), then closes the worker pool and
//! joins the workers. In-flight actions finish; everything still parked
//! in a waiting store is released. Dropping the runtime shuts it down.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::bus::Bus;
use crate::config::Config;
use crate::pool::WorkerPool;
use crate::sched::Scheduler;
use crate::sync::recover;

/// One self-contained orchestration instance.
pub struct Runtime {
    pool: Arc<WorkerPool>,
    scheduler: Arc<Scheduler>,
    bus: Bus,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Runtime {
    /// Builds the worker pool, scheduler and bus from `config`.
    pub fn new(config: Config) -> Self {
        let pool = Arc::new(WorkerPool::new(config.workers));
        let scheduler = Scheduler::new(Arc::clone(&pool), &config);
        let bus = Bus::new(config.queue_capacity);
        Self {
            pool,
            scheduler,
            bus,
            timer: Mutex::new(None),
        }
    }

    /// The scheduler of this runtime.
    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    /// The worker pool of this runtime.
    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// The bus of this runtime.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Enters the timer loop on the calling thread; returns once
    /// `shutdown` is called from another thread.
    pub fn run(&self) {
        self.scheduler.run();
    }

    /// Spawns the dedicated timer thread. No-op if it is already
    /// running or the calling thread already entered [`run`](Self::run).
    pub fn start(&self) {
        let mut slot = recover(self.timer.lock());
        if slot.is_some() {
            return;
        }
        let scheduler = Arc::clone(&self.scheduler);
        match thread::Builder::new()
            .name("taskloom-timer".to_string())
            .spawn(move || scheduler.run())
        {
            Ok(handle) => *slot = Some(handle),
            Err(e) => log::error!("failed to spawn timer thread: {e}"),
        }
    }

    /// Stops the scheduler, joins the timer thread, closes the pool and
    /// joins the workers. Idempotent.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
        if let Some(handle) = recover(self.timer.lock()).take() {
            let _ = handle.join();
        }
        self.pool.shutdown();
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::make_once_task;

    #[test]
    fn runtime_executes_and_shuts_down() {
        let rt = Runtime::new(Config::default());
        rt.start();
        let (task, handle) = make_once_task(|| "ran");
        rt.scheduler().schedule_now(&task).unwrap();
        assert_eq!(handle.wait().unwrap(), "ran");
        rt.shutdown();
        rt.shutdown();
    }
}
