//! Error types.
//!
//! None of these are fatal. The task handle turns a [`TransitionError`] into a
//! diagnostic plus `false`; the others are returned to the caller.

use thiserror::Error;

use super::ids::TaskId;
use super::state::{Capability, TaskState};

/// A guarded state-machine operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("task is already running (state={state})")]
    NotIdle { state: TaskState },

    #[error("task is not busy (state={state})")]
    NotBusy { state: TaskState },

    #[error("task is not paused (state={state})")]
    NotPaused { state: TaskState },

    #[error("task cannot be completed from state={state}")]
    CannotComplete { state: TaskState },

    #[error("capability '{capability}' is disabled")]
    Disabled { capability: Capability },

    #[error("error history can only be resized while idle (state={state})")]
    ResizeWhileRunning { state: TaskState },

    #[error("task was stopped; its failed result stands")]
    AlreadyStopped,

    #[error("task has been destroyed")]
    Destroyed,
}

impl TransitionError {
    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TransitionError::NotIdle { .. } => "not_idle",
            TransitionError::NotBusy { .. } => "not_busy",
            TransitionError::NotPaused { .. } => "not_paused",
            TransitionError::CannotComplete { .. } => "cannot_complete",
            TransitionError::Disabled { .. } => "disabled",
            TransitionError::ResizeWhileRunning { .. } => "resize_while_running",
            TransitionError::AlreadyStopped => "already_stopped",
            TransitionError::Destroyed => "destroyed",
        }
    }
}

/// A parent assignment was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParentError {
    #[error("task {0} cannot be its own parent")]
    SelfParent(TaskId),

    #[error("making {parent} the parent of {child} would create a cycle")]
    Cycle { child: TaskId, parent: TaskId },

    #[error("task {0} is not live in this registry")]
    NotFound(TaskId),
}

/// A container operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    #[error("a task named '{0}' is already registered")]
    DuplicateName(String),

    #[error("task {0} is already registered")]
    DuplicateTask(TaskId),

    #[error("task {0} is not registered")]
    UnknownTask(TaskId),
}

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_state() {
        let err = TransitionError::NotIdle {
            state: TaskState::Busy,
        };
        assert_eq!(err.to_string(), "task is already running (state=busy)");
        assert_eq!(err.as_label(), "not_idle");
    }

    #[test]
    fn container_errors_carry_ids() {
        let err = ContainerError::UnknownTask(TaskId::from_raw(3));
        assert_eq!(err.to_string(), "task task-3 is not registered");
    }
}
