//! Tasks: the tracking contract, the state machine and the shared handle.

pub mod machine;
pub mod error_ring;
pub(crate) mod handle;

pub use self::machine::{Completion, TaskCore};
pub use self::error_ring::ErrorRing;
pub use self::handle::Task;

use std::time::Duration;

use crate::domain::{
    BusyState, Capability, CompletionPolicy, LifetimePolicy, ParentError, Severity, TaskId,
    TaskKind, TaskResult, TaskState,
};

/// Contract for anything whose progress is tracked.
///
/// [`Task`] is the implementation backed by a [`Registry`](crate::Registry).
/// The trait is object-safe so containers can hold `Box<dyn TrackedTask>`
/// and wrappers (a process runner, say) can expose the same surface without
/// inheriting from `Task`.
///
/// Design intent:
/// - Control calls return `false` instead of failing when their guard does
///   not hold. The caller decides whether that matters.
/// - An empty `message` means "log nothing".
pub trait TrackedTask {
    fn id(&self) -> TaskId;
    fn name(&self) -> String;
    fn display_name(&self) -> String;
    fn kind(&self) -> TaskKind;
    fn state(&self) -> TaskState;
    fn busy_state(&self) -> BusyState;
    fn result(&self) -> TaskResult;
    fn current_progress(&self) -> u64;

    /// Expected number of subtasks, `None` if unknown.
    fn number_of_sub_tasks(&self) -> Option<u64>;

    fn elapsed_time(&self) -> Duration;

    /// Newest-first recent errors; `None` returns all that are kept.
    fn last_error_messages(&self, count: Option<usize>) -> Vec<String>;

    fn parent_id(&self) -> Option<TaskId>;
    fn can(&self, capability: Capability) -> bool;
    fn is_destroyed(&self) -> bool;

    // ---- control -------------------------------------------------------

    fn start_task(&self, expected: Option<u64>, message: &str, severity: Severity) -> bool;
    fn add_completed_sub_tasks(&self, n: u64, message: &str, severity: Severity) -> bool;
    fn pause_task(&self, message: &str, severity: Severity) -> bool;
    fn resume_task(&self, message: &str, severity: Severity) -> bool;
    fn stop_task(&self, message: &str, severity: Severity) -> bool;
    fn complete_task(&self, policy: CompletionPolicy, message: &str, severity: Severity) -> bool;
    fn log_message(&self, message: &str, severity: Severity);

    /// Retire the task. Idempotent.
    fn destroy(&self);

    // ---- configuration -------------------------------------------------

    fn set_display_name(&self, name: &str);
    fn set_kind(&self, kind: TaskKind);
    fn set_parent_task(&self, parent: TaskId) -> Result<(), ParentError>;
    fn remove_parent_task(&self);

    /// Only allowed while idle; returns whether the capacity changed.
    fn set_last_error_messages_stack_size(&self, size: usize) -> bool;

    fn set_lifetime_policy(&self, policy: LifetimePolicy);
    fn set_clear_log_on_start(&self, clear: bool);
    fn set_can_start(&self, enabled: bool);
    fn set_can_stop(&self, enabled: bool);
    fn set_can_pause(&self, enabled: bool);

    // ---- shorthands ----------------------------------------------------

    fn log_error(&self, message: &str) {
        self.log_message(message, Severity::Error);
    }

    fn log_warning(&self, message: &str) {
        self.log_message(message, Severity::Warning);
    }

    fn log_info(&self, message: &str) {
        self.log_message(message, Severity::Info);
    }

    fn start(&self, expected: Option<u64>) -> bool {
        self.start_task(expected, "", Severity::Info)
    }

    fn advance(&self, n: u64) -> bool {
        self.add_completed_sub_tasks(n, "", Severity::Info)
    }

    fn pause(&self) -> bool {
        self.pause_task("", Severity::Info)
    }

    fn resume(&self) -> bool {
        self.resume_task("", Severity::Info)
    }

    fn stop(&self) -> bool {
        self.stop_task("", Severity::Info)
    }

    fn complete(&self, policy: impl Into<CompletionPolicy>) -> bool
    where
        Self: Sized,
    {
        self.complete_task(policy.into(), "", Severity::Info)
    }
}
