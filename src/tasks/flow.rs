//! # Level-partitioned flows of one-shot tasks.
//!
//! A [`Flow`] expresses coarse-grained fork–join workflows: tasks are
//! grouped into levels, and `finish()` wires a dependency edge from
//! every task at level *i* to every task at level *i−1* (full bipartite
//! between adjacent levels). Anyone who needs sparser edges decomposes
//! into multiple flows.
//!
//! ## Rules
//! - Only one-shot tasks can join a flow.
//! - Every member is stamped with the flow priority on `add`.
//! - After `finish()` the flow is read-only and can be submitted with
//!   [`Scheduler::schedule_flow`](crate::Scheduler::schedule_flow).

use std::sync::Arc;

use crate::error::FlowError;

use super::task::{Task, TaskKind};

/// Default priority stamped on flow members.
const DEFAULT_FLOW_PRIORITY: usize = 20;

/// Builder for a level-partitioned DAG of one-shot tasks.
///
/// The smaller the level, the earlier it executes.
pub struct Flow {
    levels: Vec<Vec<Arc<Task>>>,
    priority: usize,
    finished: bool,
}

impl Flow {
    /// Creates a flow with `level_count` levels (clamped up to 2) and the
    /// default flow priority of 20.
    pub fn new(level_count: usize) -> Self {
        Self::with_priority(level_count, DEFAULT_FLOW_PRIORITY)
    }

    /// Creates a flow with an explicit priority for its members.
    pub fn with_priority(level_count: usize, priority: usize) -> Self {
        let level_count = level_count.max(2);
        Self {
            levels: (0..level_count).map(|_| Vec::new()).collect(),
            priority,
            finished: false,
        }
    }

    /// Number of levels.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// True once `finish()` has wired the dependency edges.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Adds `task` to `level`, stamping it with the flow priority.
    ///
    /// Rejects non-one-shot tasks, finished flows and out-of-range
    /// levels.
    pub fn add(&mut self, level: usize, task: &Arc<Task>) -> Result<(), FlowError> {
        if task.kind() != TaskKind::Once {
            return Err(FlowError::WrongKind);
        }
        if self.finished {
            return Err(FlowError::AlreadyFinished);
        }
        if level >= self.levels.len() {
            return Err(FlowError::LevelOutOfRange {
                level,
                levels: self.levels.len(),
            });
        }
        task.set_priority(self.priority);
        self.levels[level].push(Arc::clone(task));
        Ok(())
    }

    /// Empties a level. False if `level` is out of range or the flow is
    /// finished.
    pub fn clear_level(&mut self, level: usize) -> bool {
        if self.finished || level >= self.levels.len() {
            return false;
        }
        self.levels[level].clear();
        true
    }

    /// Removes the first occurrence of `task`, scanning every level.
    /// True on the first match, false if unseen across all levels.
    pub fn remove(&mut self, task: &Arc<Task>) -> bool {
        if self.finished {
            return false;
        }
        for level in &mut self.levels {
            if let Some(at) = level.iter().position(|t| Arc::ptr_eq(t, task)) {
                level.remove(at);
                return true;
            }
        }
        false
    }

    /// Removes `task` from `level` only. True if it was present.
    pub fn remove_at(&mut self, level: usize, task: &Arc<Task>) -> bool {
        if self.finished || level >= self.levels.len() {
            return false;
        }
        let members = &mut self.levels[level];
        match members.iter().position(|t| Arc::ptr_eq(t, task)) {
            Some(at) => {
                members.remove(at);
                true
            }
            None => false,
        }
    }

    /// Wires the dependency edges and latches the flow read-only.
    ///
    /// For each level *i* ≥ 1, every member acquires one dependency per
    /// member of level *i−1*, and those members record it as a
    /// dependent.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        for i in 1..self.levels.len() {
            let (below, rest) = self.levels.split_at(i);
            let lower = &below[i - 1];
            for dependent in &rest[0] {
                for child in lower {
                    child.add_dependent(dependent);
                }
            }
        }
        self.finished = true;
    }

    pub(crate) fn levels(&self) -> &[Vec<Arc<Task>>] {
        &self.levels
    }
}
