//! Task state machine.
//!
//! `TaskCore` owns every piece of per-task state and is the only place where
//! it changes. Each transition checks its guard, mutates, and returns the
//! events it caused; delivering them is the handle's job. Nothing in here
//! knows about observers, parents or the registry.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::error_ring::ErrorRing;
use crate::config::TaskConfig;
use crate::domain::{
    BusyState, Capability, CompletionPolicy, DestroyTrigger, LifetimePolicy, LogEntry, Severity,
    TaskEvent, TaskId, TaskKind, TaskResult, TaskState, TransitionError,
};
use crate::ports::clock::span;

/// Result of a transition that ends a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub events: Vec<TaskEvent>,
    /// Outcome to check against the lifetime policy. `None` for an explicit
    /// `NoResult` completion.
    pub trigger: Option<DestroyTrigger>,
}

#[derive(Debug, Clone)]
pub struct TaskCore {
    name: String,
    display_name: String,
    kind: TaskKind,

    state: TaskState,
    busy_state: BusyState,
    result: TaskResult,
    lifetime: LifetimePolicy,

    expected: Option<u64>,
    completed: u64,

    /// Set while a run is in progress.
    started_at: Option<DateTime<Utc>>,
    /// Duration of the last finished run.
    elapsed: Duration,
    last_elapsed_broadcast: Option<DateTime<Utc>>,

    errors: ErrorRing,
    log: Vec<LogEntry>,
    clear_log_on_start: bool,
    logging_enabled: bool,

    parent: Option<TaskId>,

    can_start: bool,
    can_stop: bool,
    can_pause: bool,

    destroyed: bool,
}

impl TaskCore {
    pub fn new(name: impl Into<String>, config: &TaskConfig) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            kind: config.kind,
            state: TaskState::NotStarted,
            busy_state: BusyState::Clean,
            result: TaskResult::NoResult,
            lifetime: config.lifetime,
            expected: None,
            completed: 0,
            started_at: None,
            elapsed: Duration::ZERO,
            last_elapsed_broadcast: None,
            errors: ErrorRing::with_capacity(config.error_history),
            log: Vec::new(),
            clear_log_on_start: config.clear_log_on_start,
            logging_enabled: config.logging_enabled,
            parent: None,
            can_start: config.can_start,
            can_stop: config.can_stop,
            can_pause: config.can_pause,
            destroyed: false,
        }
    }

    // ---- queries -------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn busy_state(&self) -> BusyState {
        self.busy_state
    }

    pub fn result(&self) -> TaskResult {
        self.result
    }

    pub fn lifetime(&self) -> LifetimePolicy {
        self.lifetime
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn expected(&self) -> Option<u64> {
        self.expected
    }

    pub fn parent(&self) -> Option<TaskId> {
        self.parent
    }

    pub fn can(&self, capability: Capability) -> bool {
        match capability {
            Capability::Start => self.can_start,
            Capability::Stop => self.can_stop,
            Capability::Pause => self.can_pause,
        }
    }

    pub fn logging_enabled(&self) -> bool {
        self.logging_enabled
    }

    pub fn clear_log_on_start(&self) -> bool {
        self.clear_log_on_start
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn errors(&self) -> &ErrorRing {
        &self.errors
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Live while a run is in progress, frozen once it ends.
    pub fn elapsed_time(&self, now: DateTime<Utc>) -> Duration {
        match self.started_at {
            Some(started) if self.state.is_running() => span(started, now),
            _ => self.elapsed,
        }
    }

    // ---- transitions ---------------------------------------------------

    /// Begins a run from any idle state. Progress, busy state and the timer
    /// start over; `expected` replaces the previous subtask count.
    ///
    /// `can_start` is advisory and not checked here.
    pub fn start(
        &mut self,
        expected: Option<u64>,
        now: DateTime<Utc>,
    ) -> Result<Vec<TaskEvent>, TransitionError> {
        self.ensure_alive()?;
        if !self.state.is_idle() {
            return Err(TransitionError::NotIdle { state: self.state });
        }

        let mut events = Vec::new();
        self.expected = expected;
        self.completed = 0;
        if self.clear_log_on_start {
            self.log.clear();
            self.errors.clear();
        }
        self.started_at = Some(now);
        self.elapsed = Duration::ZERO;
        self.last_elapsed_broadcast = Some(now);

        self.set_state(TaskState::Busy, &mut events);
        self.reset_busy_state(&mut events);
        events.push(TaskEvent::Started);
        Ok(events)
    }

    /// Adds `n` finished subtasks. Busy only.
    pub fn add_completed(&mut self, n: u64) -> Result<Vec<TaskEvent>, TransitionError> {
        self.ensure_alive()?;
        self.ensure_state(TaskState::Busy)?;

        self.completed = self.completed.saturating_add(n);
        Ok(vec![TaskEvent::SubtaskCompleted {
            completed: self.completed,
            expected: self.expected,
        }])
    }

    /// Busy → Paused, if pausing is enabled.
    pub fn pause(&mut self) -> Result<Vec<TaskEvent>, TransitionError> {
        self.ensure_alive()?;
        self.ensure_state(TaskState::Busy)?;
        self.ensure_capability(Capability::Pause)?;

        let mut events = Vec::new();
        self.set_state(TaskState::Paused, &mut events);
        events.push(TaskEvent::Paused);
        Ok(events)
    }

    pub fn resume(&mut self) -> Result<Vec<TaskEvent>, TransitionError> {
        self.ensure_alive()?;
        if self.state != TaskState::Paused {
            return Err(TransitionError::NotPaused { state: self.state });
        }

        let mut events = Vec::new();
        self.set_state(TaskState::Busy, &mut events);
        events.push(TaskEvent::Resumed);
        Ok(events)
    }

    /// Guard shared by `complete`; checked before the closing message is
    /// logged.
    pub fn check_complete(&self) -> Result<(), TransitionError> {
        self.ensure_alive()?;
        match self.state {
            TaskState::Busy | TaskState::Stopped => Ok(()),
            state => Err(TransitionError::CannotComplete { state }),
        }
    }

    /// Ends a Busy run with a result derived from `policy`.
    ///
    /// A Stopped task already carries its Failed result and has announced its
    /// one `Completed`; completing it again is refused with `AlreadyStopped`.
    pub fn complete(
        &mut self,
        policy: CompletionPolicy,
        now: DateTime<Utc>,
    ) -> Result<Completion, TransitionError> {
        self.check_complete()?;
        if self.state == TaskState::Stopped {
            return Err(TransitionError::AlreadyStopped);
        }

        let result = policy.resolve(self.busy_state);
        Ok(self.finish(TaskState::Completed, result, now))
    }

    pub fn check_stop(&self) -> Result<(), TransitionError> {
        self.ensure_alive()?;
        self.ensure_state(TaskState::Busy)?;
        self.ensure_capability(Capability::Stop)
    }

    /// Ends a Busy run as Failed. Emits `Stopped` followed by exactly one
    /// `Completed(Failed)`.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<Completion, TransitionError> {
        self.check_stop()?;

        let mut completion = self.finish(TaskState::Stopped, TaskResult::Failed, now);
        // finish() ends with Completed; Stopped goes right before it.
        let at = completion.events.len() - 1;
        completion.events.insert(at, TaskEvent::Stopped);
        completion.trigger = Some(DestroyTrigger::Stopped);
        Ok(completion)
    }

    fn finish(&mut self, to: TaskState, result: TaskResult, now: DateTime<Utc>) -> Completion {
        let mut events = Vec::new();
        self.result = result;
        if let Some(started) = self.started_at.take() {
            self.elapsed = span(started, now);
        }
        self.last_elapsed_broadcast = None;

        self.set_state(to, &mut events);
        self.reset_busy_state(&mut events);
        events.push(TaskEvent::Completed(result));
        Completion {
            events,
            trigger: DestroyTrigger::for_result(result),
        }
    }

    // ---- messages ------------------------------------------------------

    /// Bookkeeping for a logged message: escalates the busy state while a
    /// run is in progress and remembers Error messages logged while Busy.
    pub fn record(&mut self, text: &str, severity: Severity) -> Vec<TaskEvent> {
        let mut events = Vec::new();
        if self.state.is_running()
            && let Some(level) = severity.busy_state()
        {
            let new = self.busy_state.escalate(level);
            if new != self.busy_state {
                events.push(TaskEvent::BusyStateChanged {
                    new,
                    old: self.busy_state,
                });
                self.busy_state = new;
            }
        }
        if self.state == TaskState::Busy && severity == Severity::Error {
            self.errors.push(text);
        }
        events
    }

    /// Stores a message in this task's own log.
    pub fn append(&mut self, text: &str, severity: Severity, at: DateTime<Utc>) -> TaskEvent {
        self.log.push(LogEntry {
            at,
            severity,
            text: text.to_string(),
        });
        TaskEvent::MessageLogged {
            text: text.to_string(),
            severity,
        }
    }

    /// `ElapsedTime` if the task is Busy and the last broadcast is at least
    /// `interval` old.
    pub fn elapsed_tick(&mut self, now: DateTime<Utc>, interval: Duration) -> Option<TaskEvent> {
        if self.destroyed || self.state != TaskState::Busy {
            return None;
        }
        let due = self
            .last_elapsed_broadcast
            .is_none_or(|last| span(last, now) >= interval);
        if !due {
            return None;
        }
        self.last_elapsed_broadcast = Some(now);
        Some(TaskEvent::ElapsedTime(self.elapsed_time(now)))
    }

    // ---- configuration -------------------------------------------------

    pub fn set_display_name(&mut self, name: &str) -> Option<TaskEvent> {
        if self.display_name == name {
            return None;
        }
        self.display_name = name.to_string();
        Some(TaskEvent::DisplayNameChanged(self.display_name.clone()))
    }

    pub fn set_capability(&mut self, capability: Capability, enabled: bool) -> Option<TaskEvent> {
        let slot = match capability {
            Capability::Start => &mut self.can_start,
            Capability::Stop => &mut self.can_stop,
            Capability::Pause => &mut self.can_pause,
        };
        if *slot == enabled {
            return None;
        }
        *slot = enabled;
        Some(match capability {
            Capability::Start => TaskEvent::CanStartChanged(enabled),
            Capability::Stop => TaskEvent::CanStopChanged(enabled),
            Capability::Pause => TaskEvent::CanPauseChanged(enabled),
        })
    }

    pub fn set_error_history(&mut self, capacity: usize) -> Result<(), TransitionError> {
        if !self.state.is_idle() {
            return Err(TransitionError::ResizeWhileRunning { state: self.state });
        }
        self.errors.set_capacity(capacity);
        Ok(())
    }

    pub fn set_lifetime(&mut self, lifetime: LifetimePolicy) {
        self.lifetime = lifetime;
    }

    pub fn set_clear_log_on_start(&mut self, clear: bool) {
        self.clear_log_on_start = clear;
    }

    pub fn set_logging_enabled(&mut self, enabled: bool) {
        self.logging_enabled = enabled;
    }

    pub fn set_kind(&mut self, kind: TaskKind) {
        self.kind = kind;
    }

    pub fn set_parent(&mut self, parent: Option<TaskId>) {
        self.parent = parent;
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Returns false if the task was already destroyed.
    pub fn mark_destroyed(&mut self) -> bool {
        !std::mem::replace(&mut self.destroyed, true)
    }

    // ---- helpers -------------------------------------------------------

    fn set_state(&mut self, new: TaskState, events: &mut Vec<TaskEvent>) {
        let old = std::mem::replace(&mut self.state, new);
        if old != new {
            events.push(TaskEvent::StateChanged { new, old });
        }
    }

    fn reset_busy_state(&mut self, events: &mut Vec<TaskEvent>) {
        let old = std::mem::replace(&mut self.busy_state, BusyState::Clean);
        if old != BusyState::Clean {
            events.push(TaskEvent::BusyStateChanged {
                new: BusyState::Clean,
                old,
            });
        }
    }

    fn ensure_alive(&self) -> Result<(), TransitionError> {
        if self.destroyed {
            return Err(TransitionError::Destroyed);
        }
        Ok(())
    }

    fn ensure_state(&self, expected: TaskState) -> Result<(), TransitionError> {
        if self.state == expected {
            return Ok(());
        }
        Err(TransitionError::NotBusy { state: self.state })
    }

    fn ensure_capability(&self, capability: Capability) -> Result<(), TransitionError> {
        if self.can(capability) {
            return Ok(());
        }
        Err(TransitionError::Disabled { capability })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn at(ms: i64) -> DateTime<Utc> {
        t0() + chrono::Duration::milliseconds(ms)
    }

    fn core() -> TaskCore {
        TaskCore::new("scan", &TaskConfig::default())
    }

    fn busy() -> TaskCore {
        let mut core = core();
        core.start(Some(5), t0()).unwrap();
        core
    }

    #[test]
    fn new_task_is_not_started() {
        let core = core();
        assert_eq!(core.state(), TaskState::NotStarted);
        assert_eq!(core.busy_state(), BusyState::Clean);
        assert_eq!(core.result(), TaskResult::NoResult);
        assert_eq!(core.display_name(), "scan");
        assert_eq!(core.expected(), None);
    }

    #[test]
    fn start_emits_state_change_then_started() {
        let mut core = core();
        let events = core.start(Some(3), t0()).unwrap();

        assert_eq!(
            events,
            vec![
                TaskEvent::StateChanged {
                    new: TaskState::Busy,
                    old: TaskState::NotStarted
                },
                TaskEvent::Started,
            ]
        );
        assert_eq!(core.expected(), Some(3));
        assert_eq!(core.completed(), 0);
    }

    #[test]
    fn start_while_busy_is_rejected_without_change() {
        let mut core = busy();
        core.add_completed(2).unwrap();

        let err = core.start(Some(99), at(10)).unwrap_err();

        assert_eq!(
            err,
            TransitionError::NotIdle {
                state: TaskState::Busy
            }
        );
        assert_eq!(core.state(), TaskState::Busy);
        assert_eq!(core.completed(), 2);
        assert_eq!(core.expected(), Some(5));
    }

    #[rstest]
    #[case::paused(true)]
    #[case::busy(false)]
    fn start_from_running_states_is_rejected(#[case] pause_first: bool) {
        let mut core = busy();
        if pause_first {
            core.pause().unwrap();
        }
        assert!(core.start(None, at(1)).is_err());
    }

    #[test]
    fn can_start_is_advisory() {
        let mut core = core();
        assert_eq!(
            core.set_capability(Capability::Start, false),
            Some(TaskEvent::CanStartChanged(false))
        );

        core.start(None, t0()).unwrap();

        assert_eq!(core.state(), TaskState::Busy);
        assert!(!core.can(Capability::Start));
    }

    #[test]
    fn restart_resets_busy_state_and_progress() {
        let mut core = busy();
        core.record("careful", Severity::Warning);
        core.add_completed(4).unwrap();
        core.complete(CompletionPolicy::FailOnError, at(5)).unwrap();
        core.record("late", Severity::Error);

        let events = core.start(Some(2), at(10)).unwrap();

        assert_eq!(core.busy_state(), BusyState::Clean);
        assert_eq!(core.completed(), 0);
        assert_eq!(core.expected(), Some(2));
        assert!(events.contains(&TaskEvent::Started));
    }

    #[test]
    fn add_completed_requires_busy() {
        let mut core = core();
        assert_eq!(
            core.add_completed(1).unwrap_err(),
            TransitionError::NotBusy {
                state: TaskState::NotStarted
            }
        );
    }

    #[test]
    fn add_completed_accumulates() {
        let mut core = busy();
        core.add_completed(2).unwrap();
        let events = core.add_completed(3).unwrap();

        assert_eq!(core.completed(), 5);
        assert_eq!(
            events,
            vec![TaskEvent::SubtaskCompleted {
                completed: 5,
                expected: Some(5)
            }]
        );
    }

    #[test]
    fn pause_and_resume() {
        let mut core = busy();

        let events = core.pause().unwrap();
        assert_eq!(core.state(), TaskState::Paused);
        assert_eq!(events.last(), Some(&TaskEvent::Paused));

        let events = core.resume().unwrap();
        assert_eq!(core.state(), TaskState::Busy);
        assert_eq!(events.last(), Some(&TaskEvent::Resumed));
    }

    #[test]
    fn pause_requires_capability() {
        let mut core = busy();
        core.set_capability(Capability::Pause, false);
        assert!(core.pause().is_err());
        assert_eq!(core.state(), TaskState::Busy);
    }

    #[test]
    fn resume_requires_paused() {
        let mut core = busy();
        assert!(matches!(
            core.resume(),
            Err(TransitionError::NotPaused { .. })
        ));
    }

    #[rstest]
    #[case::clean(None, TaskResult::Successful)]
    #[case::warning(Some(Severity::Warning), TaskResult::SuccessfulWithWarnings)]
    #[case::error(Some(Severity::Error), TaskResult::Failed)]
    #[case::fatal(Some(Severity::Fatal), TaskResult::Failed)]
    fn complete_fail_on_error(#[case] logged: Option<Severity>, #[case] expected: TaskResult) {
        let mut core = busy();
        if let Some(severity) = logged {
            core.record("msg", severity);
        }

        let completion = core.complete(CompletionPolicy::FailOnError, at(10)).unwrap();

        assert_eq!(core.result(), expected);
        assert_eq!(core.state(), TaskState::Completed);
        assert_eq!(core.busy_state(), BusyState::Clean);
        assert_eq!(
            completion.events.last(),
            Some(&TaskEvent::Completed(expected))
        );
    }

    #[test]
    fn complete_from_not_started_is_rejected() {
        let mut core = core();
        assert_eq!(
            core.complete(CompletionPolicy::FailOnError, t0())
                .unwrap_err(),
            TransitionError::CannotComplete {
                state: TaskState::NotStarted
            }
        );
    }

    #[test]
    fn complete_from_paused_is_rejected() {
        let mut core = busy();
        core.pause().unwrap();
        assert!(core.complete(CompletionPolicy::FailOnError, at(1)).is_err());
    }

    #[test]
    fn complete_twice_is_rejected() {
        let mut core = busy();
        core.complete(CompletionPolicy::FailOnError, at(1)).unwrap();
        assert!(core.complete(CompletionPolicy::FailOnError, at(2)).is_err());
    }

    #[test]
    fn stop_yields_failed_with_one_stopped_and_one_completed() {
        let mut core = busy();
        core.record("hmm", Severity::Warning);

        let completion = core.stop(at(10)).unwrap();

        assert_eq!(core.state(), TaskState::Stopped);
        assert_eq!(core.result(), TaskResult::Failed);
        assert_eq!(
            completion.events,
            vec![
                TaskEvent::StateChanged {
                    new: TaskState::Stopped,
                    old: TaskState::Busy
                },
                TaskEvent::BusyStateChanged {
                    new: BusyState::Clean,
                    old: BusyState::WithWarnings
                },
                TaskEvent::Stopped,
                TaskEvent::Completed(TaskResult::Failed),
            ]
        );
        assert_eq!(completion.trigger, Some(DestroyTrigger::Stopped));
    }

    #[test]
    fn stop_requires_capability() {
        let mut core = busy();
        core.set_capability(Capability::Stop, false);
        assert!(core.stop(at(1)).is_err());
        assert_eq!(core.state(), TaskState::Busy);
    }

    #[test]
    fn complete_after_stop_keeps_failed() {
        let mut core = busy();
        core.stop(at(10)).unwrap();

        let err = core
            .complete(CompletionPolicy::Explicit(TaskResult::Successful), at(20))
            .unwrap_err();

        assert_eq!(err, TransitionError::AlreadyStopped);
        assert_eq!(core.state(), TaskState::Stopped);
        assert_eq!(core.result(), TaskResult::Failed);
    }

    #[test]
    fn escalation_is_monotonic_within_a_run() {
        let mut core = busy();

        core.record("w", Severity::Warning);
        assert_eq!(core.busy_state(), BusyState::WithWarnings);
        core.record("e", Severity::Error);
        assert_eq!(core.busy_state(), BusyState::WithErrors);
        core.record("w2", Severity::Warning);
        core.record("i", Severity::Info);
        assert_eq!(core.busy_state(), BusyState::WithErrors);
    }

    #[test]
    fn escalation_emits_only_on_change() {
        let mut core = busy();
        assert_eq!(core.record("w", Severity::Warning).len(), 1);
        assert!(core.record("w", Severity::Warning).is_empty());
    }

    #[test]
    fn messages_outside_a_run_do_not_escalate() {
        let mut core = core();
        core.record("early", Severity::Error);
        assert_eq!(core.busy_state(), BusyState::Clean);
        assert!(core.errors().is_empty());
    }

    #[test]
    fn only_errors_logged_while_busy_are_captured() {
        let mut core = busy();
        core.record("fatal", Severity::Fatal);
        core.record("warn", Severity::Warning);
        core.record("one", Severity::Error);
        core.pause().unwrap();
        core.record("while paused", Severity::Error);
        core.resume().unwrap();
        core.record("two", Severity::Error);

        assert_eq!(core.errors().latest(None), vec!["two", "one"]);
    }

    #[test]
    fn error_history_resizes_only_while_idle() {
        let mut core = busy();
        assert!(matches!(
            core.set_error_history(3),
            Err(TransitionError::ResizeWhileRunning { .. })
        ));
        core.complete(CompletionPolicy::FailOnError, at(1)).unwrap();
        core.set_error_history(3).unwrap();
        assert_eq!(core.errors().capacity(), 3);
    }

    #[test]
    fn elapsed_is_live_then_frozen() {
        let mut core = busy();
        assert_eq!(core.elapsed_time(at(250)), Duration::from_millis(250));

        core.complete(CompletionPolicy::FailOnError, at(400)).unwrap();

        assert_eq!(core.elapsed_time(at(5_000)), Duration::from_millis(400));
    }

    #[test]
    fn elapsed_tick_is_throttled() {
        let mut core = busy();
        let interval = Duration::from_secs(1);

        assert_eq!(core.elapsed_tick(at(500), interval), None);
        assert_eq!(
            core.elapsed_tick(at(1_000), interval),
            Some(TaskEvent::ElapsedTime(Duration::from_secs(1)))
        );
        assert_eq!(core.elapsed_tick(at(1_500), interval), None);
        assert!(core.elapsed_tick(at(2_100), interval).is_some());
    }

    #[test]
    fn elapsed_tick_is_silent_unless_busy() {
        let mut core = busy();
        core.pause().unwrap();
        assert_eq!(core.elapsed_tick(at(5_000), Duration::ZERO), None);
    }

    #[test]
    fn clear_log_on_start_empties_log_and_errors() {
        let mut core = core();
        core.set_clear_log_on_start(true);
        core.start(None, t0()).unwrap();
        core.append("old", Severity::Info, t0());
        core.record("bad", Severity::Error);
        core.complete(CompletionPolicy::FailOnError, at(1)).unwrap();

        core.start(None, at(2)).unwrap();

        assert!(core.log().is_empty());
        assert!(core.errors().is_empty());
    }

    #[test]
    fn log_is_kept_across_runs_by_default() {
        let mut core = busy();
        core.append("first run", Severity::Info, t0());
        core.complete(CompletionPolicy::FailOnError, at(1)).unwrap();

        core.start(None, at(2)).unwrap();

        assert_eq!(core.log().len(), 1);
    }

    #[test]
    fn capability_change_emits_once() {
        let mut core = core();
        assert_eq!(
            core.set_capability(Capability::Pause, false),
            Some(TaskEvent::CanPauseChanged(false))
        );
        assert_eq!(core.set_capability(Capability::Pause, false), None);
    }

    #[test]
    fn display_name_change_emits_once() {
        let mut core = core();
        assert_eq!(
            core.set_display_name("Scanning"),
            Some(TaskEvent::DisplayNameChanged("Scanning".to_string()))
        );
        assert_eq!(core.set_display_name("Scanning"), None);
        assert_eq!(core.name(), "scan");
    }

    #[test]
    fn destroyed_task_rejects_everything() {
        let mut core = core();
        assert!(core.mark_destroyed());
        assert!(!core.mark_destroyed());

        assert_eq!(core.start(None, t0()).unwrap_err(), TransitionError::Destroyed);
        assert_eq!(core.add_completed(1).unwrap_err(), TransitionError::Destroyed);
    }
}
