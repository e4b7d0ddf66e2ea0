//! # The scheduler.
//!
//! Routes tasks between the waiting stores and the worker pool:
//!
//! - **Pending table** — one-shot tasks whose dependency counter is
//!   still above zero, keyed by task identity.
//! - **Timer queue** — delayed one-shots and interval tasks, keyed by
//!   wake-up deadline, drained by the timer loop.
//! - **Event registry** — event tasks bucketed by event name, drained
//!   by `emit_event`.
//!
//! Completed tasks re-enter through the completion hook, which runs on
//! the worker that finished the action: dependents are decremented and
//! released, intervals re-arm, event tasks re-register.
//!
//! ## Locking
//! The hook performs dependent fan-out (pending-table side) before any
//! timer-queue or event-bucket work and never holds two stores at once;
//! the timer queue signals under its own lock. The tables are sharded
//! concurrent maps, so submitters, workers and the timer thread never
//! contend on a single scheduler-wide lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config::Config;
use crate::error::ScheduleError;
use crate::pool::WorkerPool;
use crate::tasks::{Flow, Task, TaskId, TaskKind};

use super::timer::TimerQueue;

/// Decides when each accepted task runs, and in what order.
///
/// Thread-safe; every operation may be called from any thread,
/// including workers (completion hooks re-enter the scheduler).
pub struct Scheduler {
    pool: Arc<WorkerPool>,
    pending: DashMap<TaskId, Arc<Task>>,
    timer: TimerQueue,
    events: DashMap<String, Vec<Arc<Task>>>,
    stop: AtomicBool,
    spin_threshold: Duration,
}

impl Scheduler {
    /// Creates a scheduler backed by `pool`.
    pub fn new(pool: Arc<WorkerPool>, config: &Config) -> Arc<Self> {
        Arc::new(Self {
            pool,
            pending: DashMap::new(),
            timer: TimerQueue::new(),
            events: DashMap::new(),
            stop: AtomicBool::new(false),
            spin_threshold: config.spin_threshold,
        })
    }

    /// Submits a one-shot task for immediate execution.
    ///
    /// Rejects tasks of any other kind and tasks with unresolved
    /// dependencies — unscoped submission of a dependency-laden task is
    /// ill-defined; submit its flow instead. Any previously installed
    /// completion hook is cleared: a bare one-shot has nothing to fan
    /// out to.
    pub fn schedule_now(&self, task: &Arc<Task>) -> Result<(), ScheduleError> {
        self.ensure_running()?;
        task.ensure_kind(TaskKind::Once)?;
        task.clear_completion_hook();
        if task.dependencies_remaining() != 0 {
            return Err(ScheduleError::UnresolvedDependencies);
        }
        self.pool.push(Arc::clone(task));
        Ok(())
    }

    /// Submits a finished flow.
    ///
    /// The lowest level goes straight to the worker pool; every level
    /// above it is parked in the pending table until its dependencies
    /// resolve. Upper levels are parked *before* the lowest level is
    /// released, so a completing task can never miss a parked dependent.
    pub fn schedule_flow(self: &Arc<Self>, flow: &Flow) -> Result<(), ScheduleError> {
        self.ensure_running()?;
        if !flow.is_finished() {
            return Err(ScheduleError::UnfinishedFlow);
        }
        let hook = self.completion_hook();
        for (depth, level) in flow.levels().iter().enumerate().rev() {
            for task in level {
                task.install_completion_hook(Arc::clone(&hook));
                if depth == 0 {
                    self.pool.push(Arc::clone(task));
                } else {
                    self.pending.insert(task.id(), Arc::clone(task));
                }
            }
        }
        Ok(())
    }

    /// Schedules a one-shot task to run at `deadline`.
    ///
    /// The task never runs before the steady clock reaches `deadline`;
    /// the excess is bounded by scheduling latency.
    pub fn schedule_at(
        self: &Arc<Self>,
        task: &Arc<Task>,
        deadline: Instant,
    ) -> Result<(), ScheduleError> {
        self.ensure_running()?;
        task.ensure_kind(TaskKind::Once)?;
        task.install_completion_hook(self.completion_hook());
        self.timer.insert(deadline, Arc::clone(task));
        Ok(())
    }

    /// Schedules an interval task. The first tick is immediate; each
    /// completion re-arms the next at `completion + every` (drift is
    /// absorbed, not recovered).
    pub fn schedule_interval(
        self: &Arc<Self>,
        task: &Arc<Task>,
        every: Duration,
    ) -> Result<(), ScheduleError> {
        self.ensure_running()?;
        task.ensure_kind(TaskKind::Interval)?;
        task.set_interval(every);
        task.install_completion_hook(self.completion_hook());
        self.pool.push(Arc::clone(task));
        Ok(())
    }

    /// Registers an event task under `event`. The task runs once per
    /// emit and re-registers itself after each completion.
    pub fn schedule_event(
        self: &Arc<Self>,
        task: &Arc<Task>,
        event: &str,
    ) -> Result<(), ScheduleError> {
        self.ensure_running()?;
        task.ensure_kind(TaskKind::Event)?;
        task.set_event_name(event);
        task.install_completion_hook(self.completion_hook());
        self.events
            .entry(event.to_string())
            .or_default()
            .push(Arc::clone(task));
        Ok(())
    }

    /// Drains every task registered under `event` to the worker pool,
    /// in registration order.
    ///
    /// The drain is atomic: tasks that re-register from their completion
    /// hook land in a fresh bucket and are not seen again by the current
    /// drain, so self-re-registration cannot starve other event tasks.
    pub fn emit_event(&self, event: &str) {
        if self.stop.load(Ordering::Acquire) {
            log::debug!("emit of '{event}' after shutdown discarded");
            return;
        }
        let drained = match self.events.remove(event) {
            Some((_, bucket)) => bucket,
            None => return,
        };
        for task in drained {
            self.pool.push(task);
        }
    }

    /// Enters the timer loop on the calling thread; returns once
    /// `shutdown` is called.
    pub fn run(&self) {
        self.timer.run(&self.pool, &self.stop, self.spin_threshold);
    }

    /// Latches the stop flag and wakes the timer thread. Submissions
    /// from here on are discarded.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::Release);
        self.timer.wake();
    }

    fn ensure_running(&self) -> Result<(), ScheduleError> {
        if self.stop.load(Ordering::Acquire) {
            log::debug!("submission after shutdown discarded");
            Err(ScheduleError::ShutdownInProgress)
        } else {
            Ok(())
        }
    }

    fn completion_hook(self: &Arc<Self>) -> crate::tasks::CompletionHook {
        let weak: Weak<Scheduler> = Arc::downgrade(self);
        Arc::new(move |task: &Arc<Task>| {
            if let Some(scheduler) = weak.upgrade() {
                scheduler.on_complete(task);
            }
        })
    }

    /// Runs on the worker that completed `task`.
    fn on_complete(&self, task: &Arc<Task>) {
        // Dependent fan-out first; pending-table work never overlaps the
        // timer queue or an event bucket.
        for dependent in task.take_dependents() {
            let Some(dependent) = dependent.upgrade() else {
                continue;
            };
            if dependent.resolve_dependency() {
                if let Some((_, parked)) = self.pending.remove(&dependent.id()) {
                    self.pool.push(parked);
                }
                // Absence is benign: the dependent may have been removed
                // from its flow before submission.
            }
        }

        match task.kind() {
            TaskKind::Interval => {
                if task.is_interval_cancelled() {
                    log::debug!("interval task {:?} cancelled; released", task.id());
                } else if !self.stop.load(Ordering::Acquire) {
                    self.timer
                        .insert(Instant::now() + task.interval_period(), Arc::clone(task));
                }
            }
            TaskKind::Event => {
                if !self.stop.load(Ordering::Acquire) {
                    if let Some(event) = task.event_name() {
                        self.events.entry(event).or_default().push(Arc::clone(task));
                    }
                }
            }
            TaskKind::Once => {}
        }
    }
}
