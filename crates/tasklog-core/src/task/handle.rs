//! Shared task handle: wires the state machine to observers, the parent
//! chain and the registry.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, trace, warn};

use super::TrackedTask;
use super::machine::{Completion, TaskCore};
use crate::domain::ids::{IdCounter, Observer};
use crate::domain::{
    BusyState, Capability, CompletionPolicy, LifetimePolicy, LogEntry, ObserverId, ParentError,
    Severity, TaskEvent, TaskId, TaskKind, TaskResult, TaskState, TransitionError,
};
use crate::ports::TaskObserver;
use crate::registry::Registry;
use crate::status::TaskSnapshot;

pub(crate) struct TaskCell {
    id: TaskId,
    registry: Registry,
    core: RefCell<TaskCore>,
    observers: RefCell<Vec<(ObserverId, Rc<dyn TaskObserver>)>>,
    observer_ids: RefCell<IdCounter<Observer>>,
}

impl Drop for TaskCell {
    fn drop(&mut self) {
        self.registry.forget(self.id);
    }
}

/// Handle to a tracked task.
///
/// Clones share the same task. The registry only keeps a weak reference, so
/// the task lives as long as some handle (the caller's, or a container's)
/// does. Not `Send`: every call and every notification runs on the caller's
/// thread.
#[derive(Clone)]
pub struct Task {
    cell: Rc<TaskCell>,
}

impl Task {
    pub(crate) fn from_core(id: TaskId, registry: Registry, core: TaskCore) -> Self {
        Self {
            cell: Rc::new(TaskCell {
                id,
                registry,
                core: RefCell::new(core),
                observers: RefCell::new(Vec::new()),
                observer_ids: RefCell::new(IdCounter::new()),
            }),
        }
    }

    pub(crate) fn from_cell(cell: Rc<TaskCell>) -> Self {
        Self { cell }
    }

    pub(crate) fn downgrade(&self) -> std::rc::Weak<TaskCell> {
        Rc::downgrade(&self.cell)
    }

    /// Create a task in `registry`. Same as [`Registry::new_task`].
    pub fn new(registry: &Registry, name: impl Into<String>, logging_enabled: bool) -> Self {
        registry.new_task(name, logging_enabled)
    }

    pub fn registry(&self) -> &Registry {
        &self.cell.registry
    }

    /// True if both handles point at the same task.
    pub fn ptr_eq(&self, other: &Task) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }

    // ---- observers -----------------------------------------------------

    pub fn subscribe(&self, observer: Rc<dyn TaskObserver>) -> ObserverId {
        let id = self.cell.observer_ids.borrow_mut().allocate();
        self.cell.observers.borrow_mut().push((id, observer));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.cell.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(observer_id, _)| *observer_id != id);
        observers.len() != before
    }

    fn emit(&self, events: Vec<TaskEvent>) {
        if events.is_empty() {
            return;
        }
        let observers: Vec<Rc<dyn TaskObserver>> = self
            .cell
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        for event in &events {
            trace!(task = %self.id(), event = event.as_label(), "task event");
            for observer in &observers {
                observer.on_event(self.id(), event);
            }
        }
    }

    /// Broadcast elapsed time if due. Called by [`Registry::tick`].
    pub(crate) fn elapsed_tick(&self, now: DateTime<Utc>, interval: Duration) {
        let event = self.cell.core.borrow_mut().elapsed_tick(now, interval);
        if let Some(event) = event {
            self.emit(vec![event]);
        }
    }

    // ---- parent chain --------------------------------------------------

    /// Current parent, re-resolved through the registry. A parent that no
    /// longer exists is forgotten.
    pub fn parent_task(&self) -> Option<Task> {
        let id = self.cell.core.borrow().parent()?;
        match self.cell.registry.resolve(id) {
            Some(parent) => Some(parent),
            None => {
                debug!(task = %self.id(), parent = %id, "parent is gone, detaching");
                self.cell.core.borrow_mut().set_parent(None);
                None
            }
        }
    }

    // ---- log -----------------------------------------------------------

    pub fn log_entries(&self) -> Vec<LogEntry> {
        self.cell.core.borrow().log().to_vec()
    }

    pub fn clear_log(&self) {
        self.cell.core.borrow_mut().clear_log();
    }

    pub fn logging_enabled(&self) -> bool {
        self.cell.core.borrow().logging_enabled()
    }

    pub fn set_logging_enabled(&self, enabled: bool) {
        self.cell.core.borrow_mut().set_logging_enabled(enabled);
    }

    pub fn lifetime_policy(&self) -> LifetimePolicy {
        self.cell.core.borrow().lifetime()
    }

    pub fn clear_log_on_start(&self) -> bool {
        self.cell.core.borrow().clear_log_on_start()
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot::of(self)
    }

    fn mirror(&self, text: &str, severity: Severity) {
        if !self.cell.registry.mirror_messages() {
            return;
        }
        let id = self.id();
        let core = self.cell.core.borrow();
        let task = core.display_name();
        match severity {
            Severity::Debug => tracing::debug!(task_id = %id, task, "{text}"),
            Severity::Info => tracing::info!(task_id = %id, task, "{text}"),
            Severity::Warning => tracing::warn!(task_id = %id, task, "{text}"),
            Severity::Error | Severity::Fatal => tracing::error!(task_id = %id, task, "{text}"),
        }
    }

    // ---- run bookkeeping -----------------------------------------------

    fn now(&self) -> DateTime<Utc> {
        self.cell.registry.now()
    }

    fn finish_run(&self, completion: Completion) {
        self.emit(completion.events);
        let Some(trigger) = completion.trigger else {
            return;
        };
        let destroy = self.cell.core.borrow().lifetime().destroys_on(trigger);
        if destroy {
            debug!(task = %self.id(), ?trigger, "lifetime policy retires task");
            self.destroy();
        }
    }

    fn rejected(&self, op: &'static str, err: &TransitionError) {
        warn!(task = %self.id(), op, reason = err.as_label(), error = %err, "call rejected");
    }

    fn ignored(&self, op: &'static str, err: &TransitionError) {
        trace!(task = %self.id(), op, error = %err, "call ignored");
    }

    fn set_capability(&self, capability: Capability, enabled: bool) {
        let event = self
            .cell
            .core
            .borrow_mut()
            .set_capability(capability, enabled);
        if let Some(event) = event {
            self.emit(vec![event]);
        }
    }
}

impl TrackedTask for Task {
    fn id(&self) -> TaskId {
        self.cell.id
    }

    fn name(&self) -> String {
        self.cell.core.borrow().name().to_string()
    }

    fn display_name(&self) -> String {
        self.cell.core.borrow().display_name().to_string()
    }

    fn kind(&self) -> TaskKind {
        self.cell.core.borrow().kind()
    }

    fn state(&self) -> TaskState {
        self.cell.core.borrow().state()
    }

    fn busy_state(&self) -> BusyState {
        self.cell.core.borrow().busy_state()
    }

    fn result(&self) -> TaskResult {
        self.cell.core.borrow().result()
    }

    fn current_progress(&self) -> u64 {
        self.cell.core.borrow().completed()
    }

    fn number_of_sub_tasks(&self) -> Option<u64> {
        self.cell.core.borrow().expected()
    }

    fn elapsed_time(&self) -> Duration {
        let now = self.now();
        self.cell.core.borrow().elapsed_time(now)
    }

    fn last_error_messages(&self, count: Option<usize>) -> Vec<String> {
        self.cell.core.borrow().errors().latest(count)
    }

    fn parent_id(&self) -> Option<TaskId> {
        self.parent_task().map(|parent| parent.id())
    }

    fn can(&self, capability: Capability) -> bool {
        self.cell.core.borrow().can(capability)
    }

    fn is_destroyed(&self) -> bool {
        self.cell.core.borrow().is_destroyed()
    }

    fn start_task(&self, expected: Option<u64>, message: &str, severity: Severity) -> bool {
        let now = self.now();
        let started = self.cell.core.borrow_mut().start(expected, now);
        match started {
            Ok(events) => {
                debug!(task = %self.id(), ?expected, "task started");
                self.emit(events);
                self.log_message(message, severity);
                true
            }
            Err(err) => {
                self.rejected("start_task", &err);
                false
            }
        }
    }

    fn add_completed_sub_tasks(&self, n: u64, message: &str, severity: Severity) -> bool {
        let added = self.cell.core.borrow_mut().add_completed(n);
        match added {
            Ok(events) => {
                self.emit(events);
                self.log_message(message, severity);
                true
            }
            Err(err) => {
                debug!(task = %self.id(), error = %err, "progress ignored");
                false
            }
        }
    }

    fn pause_task(&self, message: &str, severity: Severity) -> bool {
        let paused = self.cell.core.borrow_mut().pause();
        match paused {
            Ok(events) => {
                self.emit(events);
                self.log_message(message, severity);
                true
            }
            Err(err) => {
                self.ignored("pause_task", &err);
                false
            }
        }
    }

    fn resume_task(&self, message: &str, severity: Severity) -> bool {
        let resumed = self.cell.core.borrow_mut().resume();
        match resumed {
            Ok(events) => {
                self.emit(events);
                self.log_message(message, severity);
                true
            }
            Err(err) => {
                self.ignored("resume_task", &err);
                false
            }
        }
    }

    fn stop_task(&self, message: &str, severity: Severity) -> bool {
        let checked = self.cell.core.borrow().check_stop();
        if let Err(err) = checked {
            self.ignored("stop_task", &err);
            return false;
        }
        // The stop message belongs to the run being stopped.
        self.log_message(message, severity);

        let now = self.now();
        let stopped = self.cell.core.borrow_mut().stop(now);
        match stopped {
            Ok(completion) => {
                debug!(task = %self.id(), "task stopped");
                self.finish_run(completion);
                true
            }
            Err(err) => {
                // An observer changed the state while the message was delivered.
                self.ignored("stop_task", &err);
                false
            }
        }
    }

    fn complete_task(&self, policy: CompletionPolicy, message: &str, severity: Severity) -> bool {
        let checked = self.cell.core.borrow().check_complete();
        if let Err(err) = checked {
            self.rejected("complete_task", &err);
            return false;
        }
        // Logged first so the closing message counts toward the result.
        self.log_message(message, severity);

        let now = self.now();
        let completed = self.cell.core.borrow_mut().complete(policy, now);
        match completed {
            Ok(completion) => {
                debug!(task = %self.id(), result = %self.result(), "task completed");
                self.finish_run(completion);
                true
            }
            Err(err) => {
                // Stopped runs already carry their Failed result.
                self.ignored("complete_task", &err);
                false
            }
        }
    }

    fn log_message(&self, message: &str, severity: Severity) {
        if message.is_empty() {
            return;
        }
        let recorded = {
            let mut core = self.cell.core.borrow_mut();
            if core.is_destroyed() || !core.logging_enabled() {
                None
            } else {
                Some(core.record(message, severity))
            }
        };
        let Some(events) = recorded else {
            return;
        };
        self.emit(events);

        if let Some(parent) = self.parent_task() {
            parent.log_message(message, severity);
            return;
        }

        let now = self.now();
        let logged = self.cell.core.borrow_mut().append(message, severity, now);
        self.mirror(message, severity);
        self.emit(vec![logged]);
    }

    fn destroy(&self) {
        let first = self.cell.core.borrow_mut().mark_destroyed();
        if !first {
            return;
        }
        self.cell.registry.forget(self.id());
        debug!(task = %self.id(), "task destroyed");
        self.emit(vec![TaskEvent::Destroyed]);
        // Observers often capture task handles; dropping them breaks cycles.
        self.cell.observers.borrow_mut().clear();
    }

    fn set_display_name(&self, name: &str) {
        let event = self.cell.core.borrow_mut().set_display_name(name);
        if let Some(event) = event {
            self.emit(vec![event]);
        }
    }

    fn set_kind(&self, kind: TaskKind) {
        self.cell.core.borrow_mut().set_kind(kind);
    }

    fn set_parent_task(&self, parent: TaskId) -> Result<(), ParentError> {
        let child = self.id();
        if parent == child {
            return Err(ParentError::SelfParent(child));
        }
        let mut cursor = Some(
            self.cell
                .registry
                .resolve(parent)
                .ok_or(ParentError::NotFound(parent))?,
        );
        while let Some(ancestor) = cursor {
            if ancestor.id() == child {
                return Err(ParentError::Cycle { child, parent });
            }
            cursor = ancestor.parent_task();
        }
        self.cell.core.borrow_mut().set_parent(Some(parent));
        Ok(())
    }

    fn remove_parent_task(&self) {
        self.cell.core.borrow_mut().set_parent(None);
    }

    fn set_last_error_messages_stack_size(&self, size: usize) -> bool {
        let resized = self.cell.core.borrow_mut().set_error_history(size);
        match resized {
            Ok(()) => true,
            Err(err) => {
                self.rejected("set_last_error_messages_stack_size", &err);
                false
            }
        }
    }

    fn set_lifetime_policy(&self, policy: LifetimePolicy) {
        self.cell.core.borrow_mut().set_lifetime(policy);
    }

    fn set_clear_log_on_start(&self, clear: bool) {
        self.cell.core.borrow_mut().set_clear_log_on_start(clear);
    }

    fn set_can_start(&self, enabled: bool) {
        self.set_capability(Capability::Start, enabled);
    }

    fn set_can_stop(&self, enabled: bool) {
        self.set_capability(Capability::Stop, enabled);
    }

    fn set_can_pause(&self, enabled: bool) {
        self.set_capability(Capability::Pause, enabled);
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.cell.core.borrow();
        f.debug_struct("Task")
            .field("id", &self.cell.id)
            .field("name", &core.name())
            .field("state", &core.state())
            .field("busy_state", &core.busy_state())
            .field("result", &core.result())
            .finish()
    }
}
