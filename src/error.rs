//! # Error types used by the taskloom runtime and tasks.
//!
//! This module defines three error enums:
//!
//! - [`ScheduleError`] — precondition violations at scheduling call sites.
//! - [`FlowError`] — violations while building a task flow.
//! - [`TaskError`] — failures of a one-shot action, observed through its
//!   completion handle.
//!
//! All types provide `as_label()` helpers returning short stable labels
//! for logs and metrics. Scheduling and flow errors are reported at the
//! offending call site and never propagate further; the only non-local
//! error surface is [`TaskError`] carried by a completion handle.

use std::time::Duration;

use thiserror::Error;

use crate::tasks::TaskKind;

/// # Errors produced by scheduling operations.
///
/// Every variant is a caller-side precondition failure: the scheduler
/// itself never fails once a task has been accepted.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// The operation requires a different task kind.
    #[error("expected a {expected} task, found a {found} task")]
    WrongKind {
        /// Kind the operation accepts.
        expected: TaskKind,
        /// Kind the task was constructed with.
        found: TaskKind,
    },
    /// `schedule_now` on a task that still has unresolved dependencies.
    ///
    /// A dependency-laden task only becomes well-defined as part of its
    /// flow; submit the whole flow instead.
    #[error("task has unresolved dependencies; submit it through its flow")]
    UnresolvedDependencies,
    /// A flow was submitted before `finish()` wired its dependency edges.
    #[error("flow has not been finished")]
    UnfinishedFlow,
    /// The runtime is shutting down; the submission was discarded.
    #[error("scheduler is shutting down")]
    ShutdownInProgress,
}

impl ScheduleError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ScheduleError::WrongKind { .. } => "schedule_wrong_kind",
            ScheduleError::UnresolvedDependencies => "schedule_unresolved_dependencies",
            ScheduleError::UnfinishedFlow => "schedule_unfinished_flow",
            ScheduleError::ShutdownInProgress => "schedule_shutdown_in_progress",
        }
    }
}

/// # Errors produced while building a [`Flow`](crate::Flow).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum FlowError {
    /// Only one-shot tasks can join a flow.
    #[error("only one-shot tasks can join a flow")]
    WrongKind,
    /// The flow is finished and read-only.
    #[error("flow is already finished")]
    AlreadyFinished,
    /// The addressed level does not exist.
    #[error("level {level} is out of range (flow has {levels} levels)")]
    LevelOutOfRange {
        /// Level the caller addressed.
        level: usize,
        /// Number of levels in the flow.
        levels: usize,
    },
}

impl FlowError {
    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            FlowError::WrongKind => "flow_wrong_kind",
            FlowError::AlreadyFinished => "flow_already_finished",
            FlowError::LevelOutOfRange { .. } => "flow_level_out_of_range",
        }
    }
}

/// # Failures of a one-shot action, delivered through its completion handle.
///
/// Interval and event actions have no completion handle; their failures
/// are logged and swallowed, and the task keeps its place in the system
/// (dependents are unblocked, intervals re-arm). A failed producer does
/// not poison its graph.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// The action panicked; the payload is preserved as a message.
    #[error("task panicked: {reason}")]
    Panicked {
        /// Stringified panic payload.
        reason: String,
    },
    /// The task was dropped before it could run (cancelled, or discarded
    /// during shutdown).
    #[error("task was dropped before it could run")]
    Dropped,
    /// `wait_timeout` elapsed without a completion.
    #[error("no completion within {timeout:?}")]
    WaitTimeout {
        /// The wait budget that elapsed.
        timeout: Duration,
    },
}

impl TaskError {
    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Dropped => "task_dropped",
            TaskError::WaitTimeout { .. } => "task_wait_timeout",
        }
    }
}
