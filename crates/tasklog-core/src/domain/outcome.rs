//! Outcome model: the final result of a run and how it is derived.
//!
//! Nothing here touches task state. The state machine asks a
//! [`CompletionPolicy`] to turn the run's [`BusyState`] into a [`TaskResult`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::state::BusyState;

/// Final result of the most recent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskResult {
    /// No run has completed yet.
    #[default]
    NoResult,
    Successful,
    SuccessfulWithWarnings,
    SuccessfulWithErrors,
    Failed,
}

impl TaskResult {
    pub fn is_success(self) -> bool {
        matches!(
            self,
            TaskResult::Successful
                | TaskResult::SuccessfulWithWarnings
                | TaskResult::SuccessfulWithErrors
        )
    }
}

impl fmt::Display for TaskResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskResult::NoResult => "no_result",
            TaskResult::Successful => "successful",
            TaskResult::SuccessfulWithWarnings => "successful_with_warnings",
            TaskResult::SuccessfulWithErrors => "successful_with_errors",
            TaskResult::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// What `complete_task` should record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Use this result as-is.
    Explicit(TaskResult),
    /// Errors fail the run.
    #[default]
    FailOnError,
    /// Errors are reported but the run still succeeds.
    SuccessOnError,
}

impl CompletionPolicy {
    /// Derive the result for a run that ended in `busy`.
    ///
    /// | busy         | FailOnError            | SuccessOnError         |
    /// |--------------|------------------------|------------------------|
    /// | Clean        | Successful             | Successful             |
    /// | WithWarnings | SuccessfulWithWarnings | SuccessfulWithWarnings |
    /// | WithErrors   | Failed                 | SuccessfulWithErrors   |
    pub fn resolve(self, busy: BusyState) -> TaskResult {
        match (self, busy) {
            (CompletionPolicy::Explicit(result), _) => result,
            (_, BusyState::Clean) => TaskResult::Successful,
            (_, BusyState::WithWarnings) => TaskResult::SuccessfulWithWarnings,
            (CompletionPolicy::FailOnError, BusyState::WithErrors) => TaskResult::Failed,
            (CompletionPolicy::SuccessOnError, BusyState::WithErrors) => {
                TaskResult::SuccessfulWithErrors
            }
        }
    }
}

impl From<TaskResult> for CompletionPolicy {
    fn from(result: TaskResult) -> Self {
        CompletionPolicy::Explicit(result)
    }
}
