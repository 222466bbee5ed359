//! Task states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a task.
///
/// Transitions (guarded by [`TaskCore`](crate::task::TaskCore)):
/// - NotStarted / Stopped / Completed -> Busy (start)
/// - Busy -> Paused (pause) -> Busy (resume)
/// - Busy -> Stopped (stop)
/// - Busy -> Completed (complete)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    #[default]
    NotStarted,
    Busy,
    Paused,
    Stopped,
    Completed,
}

impl TaskState {
    /// The restart guard: a task may only be started from one of these.
    pub fn is_idle(self) -> bool {
        matches!(
            self,
            TaskState::NotStarted | TaskState::Stopped | TaskState::Completed
        )
    }

    /// Busy or Paused: a run is in progress.
    pub fn is_running(self) -> bool {
        matches!(self, TaskState::Busy | TaskState::Paused)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::NotStarted => "not_started",
            TaskState::Busy => "busy",
            TaskState::Paused => "paused",
            TaskState::Stopped => "stopped",
            TaskState::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Health of the current run, accumulated from logged severities.
///
/// Ordered so that escalation is `max`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BusyState {
    #[default]
    Clean,
    WithWarnings,
    WithErrors,
}

impl BusyState {
    /// Returns the escalated state; never lower than `self`.
    pub fn escalate(self, to: BusyState) -> BusyState {
        self.max(to)
    }
}

/// Visibility classification. No effect on the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    #[default]
    Local,
    Global,
}

/// User-facing control a task may advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Start,
    Stop,
    Pause,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Capability::Start => "start",
            Capability::Stop => "stop",
            Capability::Pause => "pause",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::not_started(TaskState::NotStarted, true)]
    #[case::busy(TaskState::Busy, false)]
    #[case::paused(TaskState::Paused, false)]
    #[case::stopped(TaskState::Stopped, true)]
    #[case::completed(TaskState::Completed, true)]
    fn idle_set(#[case] state: TaskState, #[case] idle: bool) {
        assert_eq!(state.is_idle(), idle);
    }

    #[test]
    fn escalation_never_goes_back() {
        let s = BusyState::Clean.escalate(BusyState::WithErrors);
        assert_eq!(s, BusyState::WithErrors);
        assert_eq!(s.escalate(BusyState::WithWarnings), BusyState::WithErrors);
        assert_eq!(s.escalate(BusyState::Clean), BusyState::WithErrors);
    }

    #[test]
    fn state_serializes_snake_case() {
        let s = serde_json::to_string(&TaskState::NotStarted).unwrap();
        assert_eq!(s, "\"not_started\"");
        let s = serde_json::to_string(&BusyState::WithWarnings).unwrap();
        assert_eq!(s, "\"with_warnings\"");
    }
}
