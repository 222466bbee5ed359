//! Lifetime policy: whether a task retires itself after a run ends.

use serde::{Deserialize, Serialize};

use super::outcome::TaskResult;

/// How a run ended, as seen by the lifetime policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestroyTrigger {
    Success,
    SuccessWithWarnings,
    Stopped,
    Failed,
}

impl DestroyTrigger {
    /// Trigger for a run that ended through `complete_task`.
    ///
    /// `SuccessfulWithErrors` counts as a success with warnings: the run
    /// succeeded but reported problems. `NoResult` never triggers.
    pub fn for_result(result: TaskResult) -> Option<DestroyTrigger> {
        match result {
            TaskResult::NoResult => None,
            TaskResult::Successful => Some(DestroyTrigger::Success),
            TaskResult::SuccessfulWithWarnings | TaskResult::SuccessfulWithErrors => {
                Some(DestroyTrigger::SuccessWithWarnings)
            }
            TaskResult::Failed => Some(DestroyTrigger::Failed),
        }
    }
}

/// Set of outcomes after which the task destroys itself.
///
/// The empty set is "manual only": the owner decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LifetimePolicy {
    pub on_success: bool,
    pub on_success_with_warnings: bool,
    pub on_stopped: bool,
    /// Runs completed as Failed. A stopped run also ends Failed but only
    /// matches `on_stopped`.
    pub on_failed: bool,
}

impl LifetimePolicy {
    pub const fn manual_only() -> Self {
        Self {
            on_success: false,
            on_success_with_warnings: false,
            on_stopped: false,
            on_failed: false,
        }
    }

    /// Destroy after any outcome.
    pub const fn always() -> Self {
        Self {
            on_success: true,
            on_success_with_warnings: true,
            on_stopped: true,
            on_failed: true,
        }
    }

    pub fn with(mut self, trigger: DestroyTrigger) -> Self {
        match trigger {
            DestroyTrigger::Success => self.on_success = true,
            DestroyTrigger::SuccessWithWarnings => self.on_success_with_warnings = true,
            DestroyTrigger::Stopped => self.on_stopped = true,
            DestroyTrigger::Failed => self.on_failed = true,
        }
        self
    }

    pub fn is_manual_only(&self) -> bool {
        *self == Self::manual_only()
    }

    pub fn destroys_on(&self, trigger: DestroyTrigger) -> bool {
        match trigger {
            DestroyTrigger::Success => self.on_success,
            DestroyTrigger::SuccessWithWarnings => self.on_success_with_warnings,
            DestroyTrigger::Stopped => self.on_stopped,
            DestroyTrigger::Failed => self.on_failed,
        }
    }
}

impl FromIterator<DestroyTrigger> for LifetimePolicy {
    fn from_iter<I: IntoIterator<Item = DestroyTrigger>>(iter: I) -> Self {
        iter.into_iter()
            .fold(LifetimePolicy::manual_only(), LifetimePolicy::with)
    }
}
