//! Read-only status views, serializable for reports.

use serde::{Deserialize, Serialize};

use crate::domain::{BusyState, TaskId, TaskKind, TaskResult, TaskState};
use crate::task::TrackedTask;

/// Point-in-time view of one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub id: TaskId,
    pub name: String,
    pub display_name: String,
    pub kind: TaskKind,
    pub state: TaskState,
    pub busy_state: BusyState,
    pub result: TaskResult,
    pub completed: u64,
    pub expected: Option<u64>,
    pub elapsed_ms: u64,
    pub parent: Option<TaskId>,
    /// Newest first.
    pub last_errors: Vec<String>,
}

impl TaskSnapshot {
    pub fn of<T: TrackedTask + ?Sized>(task: &T) -> Self {
        Self {
            id: task.id(),
            name: task.name(),
            display_name: task.display_name(),
            kind: task.kind(),
            state: task.state(),
            busy_state: task.busy_state(),
            result: task.result(),
            completed: task.current_progress(),
            expected: task.number_of_sub_tasks(),
            elapsed_ms: u64::try_from(task.elapsed_time().as_millis()).unwrap_or(u64::MAX),
            parent: task.parent_id(),
            last_errors: task.last_error_messages(None),
        }
    }

    /// `completed / expected` in `[0, 1]`, when the total is known and non-zero.
    pub fn fraction(&self) -> Option<f64> {
        match self.expected {
            Some(0) | None => None,
            Some(expected) => Some((self.completed as f64 / expected as f64).min(1.0)),
        }
    }
}

/// Number of tasks per lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounts {
    pub not_started: usize,
    pub busy: usize,
    pub paused: usize,
    pub stopped: usize,
    pub completed: usize,
}

impl TaskCounts {
    pub fn of<'a, T>(tasks: impl IntoIterator<Item = &'a T>) -> Self
    where
        T: TrackedTask + ?Sized + 'a,
    {
        let mut counts = Self::default();
        for task in tasks {
            counts.add(task.state());
        }
        counts
    }

    pub fn add(&mut self, state: TaskState) {
        let slot = match state {
            TaskState::NotStarted => &mut self.not_started,
            TaskState::Busy => &mut self.busy,
            TaskState::Paused => &mut self.paused,
            TaskState::Stopped => &mut self.stopped,
            TaskState::Completed => &mut self.completed,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        self.not_started + self.busy + self.paused + self.stopped + self.completed
    }

    /// Tasks with a run in progress.
    pub fn running(&self) -> usize {
        self.busy + self.paused
    }
}
