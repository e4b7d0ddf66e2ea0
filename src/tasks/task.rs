//! # The schedulable unit of work.
//!
//! A [`Task`] bundles an erased nullary action with the scheduling
//! metadata the runtime needs: kind, priority, dependency counters,
//! interval state and the scheduler-installed completion hook.
//!
//! ## Rules
//! - The kind is fixed when the action is bound and never changes.
//! - A task is owned jointly by at most one waiting store (pending table,
//!   timer queue or event bucket) and the worker pool; it never sits in
//!   two ready queues at once.
//! - Dependents are weak back-references: the pending table owns the
//!   dependent tasks, a completing task merely asks who to decrement.
//! - `set_priority` and `cancel_interval` are safe to call concurrently
//!   with scheduling; `cancel_interval` is a one-way latch.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use crate::error::{ScheduleError, TaskError};
use crate::sync::recover;

use super::promise::{self, CompletionHandle};

/// Process-unique task identity, used to key the pending table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(0);

impl TaskId {
    fn next() -> Self {
        TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Scheduling discipline of a task, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Runs exactly once per acceptance.
    Once,
    /// Re-arms itself on a fixed period until cancelled.
    Interval,
    /// Runs once per emit of its registered event.
    Event,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskKind::Once => "one-shot",
            TaskKind::Interval => "interval",
            TaskKind::Event => "event",
        };
        f.write_str(name)
    }
}

type Action = Box<dyn Fn() + Send + Sync>;
pub(crate) type CompletionHook = Arc<dyn Fn(&Arc<Task>) + Send + Sync>;

/// A unit of work with a kind, a priority and optional dependency edges.
///
/// Constructed through [`make_once_task`], [`make_interval_task`] or
/// [`make_event_task`] and handed to a
/// [`Scheduler`](crate::Scheduler); the runtime shares it between
/// waiting stores and the worker pool behind an `Arc`.
pub struct Task {
    id: TaskId,
    kind: TaskKind,
    action: Action,
    priority: AtomicUsize,
    dependencies_remaining: AtomicUsize,
    dependents: Mutex<Vec<Weak<Task>>>,
    interval_us: AtomicU64,
    interval_cancelled: AtomicBool,
    event_name: Mutex<Option<String>>,
    completion_hook: Mutex<Option<CompletionHook>>,
}

impl Task {
    fn new(kind: TaskKind, action: Action) -> Arc<Self> {
        Arc::new(Self {
            id: TaskId::next(),
            kind,
            action,
            priority: AtomicUsize::new(0),
            dependencies_remaining: AtomicUsize::new(0),
            dependents: Mutex::new(Vec::new()),
            interval_us: AtomicU64::new(0),
            interval_cancelled: AtomicBool::new(false),
            event_name: Mutex::new(None),
            completion_hook: Mutex::new(None),
        })
    }

    /// Binds `f` as a one-shot action and returns the task together with
    /// the one-time handle resolving with `f`'s return value.
    pub fn once<F, R>(f: F) -> (Arc<Self>, CompletionHandle<R>)
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (fulfiller, handle) = promise::slot::<R>();
        let cell = Mutex::new(Some(f));
        let action = move || {
            let f = recover(cell.lock()).take();
            if let Some(f) = f {
                match panic::catch_unwind(AssertUnwindSafe(f)) {
                    Ok(value) => fulfiller.fulfil(Ok(value)),
                    Err(payload) => fulfiller.fulfil(Err(TaskError::Panicked {
                        reason: panic_message(payload.as_ref()),
                    })),
                }
            }
        };
        (Self::new(TaskKind::Once, Box::new(action)), handle)
    }

    /// Binds `f` as an interval action. Its return value is discarded;
    /// callers that want side-channel results use the bus.
    pub fn interval<F, R>(f: F) -> Arc<Self>
    where
        F: Fn() -> R + Send + Sync + 'static,
    {
        Self::new(
            TaskKind::Interval,
            Box::new(move || {
                let _ = f();
            }),
        )
    }

    /// Binds `f` as an event action. Its return value is discarded.
    pub fn event<F, R>(f: F) -> Arc<Self>
    where
        F: Fn() -> R + Send + Sync + 'static,
    {
        Self::new(
            TaskKind::Event,
            Box::new(move || {
                let _ = f();
            }),
        )
    }

    /// Process-unique identity of this task.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Scheduling discipline this task was constructed with.
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Current priority. Lower values are more urgent.
    pub fn priority(&self) -> usize {
        self.priority.load(Ordering::Relaxed)
    }

    /// Sets the priority. Takes effect the next time the task enters the
    /// ready queue.
    pub fn set_priority(&self, priority: usize) {
        self.priority.store(priority, Ordering::Relaxed);
    }

    /// Latches interval cancellation. One-way: once set, the task is
    /// dropped at its next dequeue from the timer queue or at its next
    /// completion, whichever the latch is observed at first. At most one
    /// already-dispatched tick may still run.
    pub fn cancel_interval(&self) {
        self.interval_cancelled.store(true, Ordering::Release);
    }

    pub(crate) fn is_interval_cancelled(&self) -> bool {
        self.interval_cancelled.load(Ordering::Acquire)
    }

    pub(crate) fn ensure_kind(&self, expected: TaskKind) -> Result<(), ScheduleError> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(ScheduleError::WrongKind {
                expected,
                found: self.kind,
            })
        }
    }

    pub(crate) fn interval_period(&self) -> Duration {
        Duration::from_micros(self.interval_us.load(Ordering::Relaxed))
    }

    pub(crate) fn set_interval(&self, every: Duration) {
        self.interval_us
            .store(every.as_micros() as u64, Ordering::Relaxed);
    }

    pub(crate) fn event_name(&self) -> Option<String> {
        recover(self.event_name.lock()).clone()
    }

    pub(crate) fn set_event_name(&self, event: &str) {
        *recover(self.event_name.lock()) = Some(event.to_string());
    }

    pub(crate) fn dependencies_remaining(&self) -> usize {
        self.dependencies_remaining.load(Ordering::Acquire)
    }

    /// Records `dependent` as waiting on `self`. Called only while the
    /// owning flow is being finished, before anything is scheduled.
    pub(crate) fn add_dependent(&self, dependent: &Arc<Task>) {
        dependent
            .dependencies_remaining
            .fetch_add(1, Ordering::Relaxed);
        recover(self.dependents.lock()).push(Arc::downgrade(dependent));
    }

    /// Decrements the dependency counter; true when this call resolved
    /// the last outstanding dependency.
    pub(crate) fn resolve_dependency(&self) -> bool {
        self.dependencies_remaining.fetch_sub(1, Ordering::AcqRel) == 1
    }

    /// Drains the dependent back-references. The list is dead once the
    /// task has completed.
    pub(crate) fn take_dependents(&self) -> Vec<Weak<Task>> {
        std::mem::take(&mut *recover(self.dependents.lock()))
    }

    pub(crate) fn install_completion_hook(&self, hook: CompletionHook) {
        *recover(self.completion_hook.lock()) = Some(hook);
    }

    pub(crate) fn clear_completion_hook(&self) {
        *recover(self.completion_hook.lock()) = None;
    }

    /// Runs the action on the calling worker thread, then fires the
    /// completion hook.
    ///
    /// A panicking one-shot action is captured into its completion slot;
    /// interval and event panics are logged and swallowed. Either way the
    /// hook still runs, so dependents are unblocked and intervals re-arm.
    pub(crate) fn run(self: &Arc<Self>) {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| (self.action)())) {
            log::warn!(
                "{} task {:?} panicked: {}",
                self.kind,
                self.id,
                panic_message(payload.as_ref())
            );
        }
        let hook = recover(self.completion_hook.lock()).clone();
        if let Some(hook) = hook {
            hook(self);
        }
    }
}

/// Renders a panic payload for diagnostics and completion handles.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".to_string()
    }
}

/// Returns a one-shot task and its completion handle.
pub fn make_once_task<F, R>(f: F) -> (Arc<Task>, CompletionHandle<R>)
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    Task::once(f)
}

/// Returns an interval task. The action's return value is discarded.
pub fn make_interval_task<F, R>(f: F) -> Arc<Task>
where
    F: Fn() -> R + Send + Sync + 'static,
{
    Task::interval(f)
}

/// Returns an event task. The action's return value is discarded.
pub fn make_event_task<F, R>(f: F) -> Arc<Task>
where
    F: Fn() -> R + Send + Sync + 'static,
{
    Task::event(f)
}
