//! # Task abstractions.
//!
//! This module provides the unit-of-work types:
//! - [`Task`] — a schedulable unit of work with a kind, priority and
//!   optional dependency edges
//! - [`TaskKind`] — one-shot / interval / event discipline, fixed at
//!   construction
//! - [`CompletionHandle`] — one-time handle resolving with a one-shot
//!   action's return value (or its captured failure)
//! - [`Flow`] — a level-partitioned DAG of one-shot tasks, submitted
//!   atomically

mod flow;
mod promise;
mod task;

pub use flow::Flow;
pub use promise::CompletionHandle;
pub use task::{make_event_task, make_interval_task, make_once_task, Task, TaskId, TaskKind};

pub(crate) use task::CompletionHook;
