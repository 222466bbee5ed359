//! Task notifications.
//!
//! One [`TaskEvent`] per observable change, delivered synchronously in the
//! order the changes happened.

use std::time::Duration;

use super::outcome::TaskResult;
use super::severity::Severity;
use super::state::{BusyState, TaskState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    Started,
    SubtaskCompleted {
        completed: u64,
        expected: Option<u64>,
    },
    Completed(TaskResult),
    Paused,
    Resumed,
    Stopped,
    StateChanged {
        new: TaskState,
        old: TaskState,
    },
    BusyStateChanged {
        new: BusyState,
        old: BusyState,
    },
    DisplayNameChanged(String),
    MessageLogged {
        text: String,
        severity: Severity,
    },
    CanStartChanged(bool),
    CanStopChanged(bool),
    CanPauseChanged(bool),
    /// Periodic broadcast while Busy. Carries no state change.
    ElapsedTime(Duration),
    /// The task was retired (manually or by its lifetime policy).
    Destroyed,
}

impl TaskEvent {
    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskEvent::Started => "started",
            TaskEvent::SubtaskCompleted { .. } => "subtask_completed",
            TaskEvent::Completed(_) => "completed",
            TaskEvent::Paused => "paused",
            TaskEvent::Resumed => "resumed",
            TaskEvent::Stopped => "stopped",
            TaskEvent::StateChanged { .. } => "state_changed",
            TaskEvent::BusyStateChanged { .. } => "busy_state_changed",
            TaskEvent::DisplayNameChanged(_) => "displayed_name_changed",
            TaskEvent::MessageLogged { .. } => "message_logged",
            TaskEvent::CanStartChanged(_) => "can_start_changed",
            TaskEvent::CanStopChanged(_) => "can_stop_changed",
            TaskEvent::CanPauseChanged(_) => "can_pause_changed",
            TaskEvent::ElapsedTime(_) => "elapsed_time",
            TaskEvent::Destroyed => "destroyed",
        }
    }
}
