//! Task registry: id allocation and id → task resolution.
//!
//! Tasks refer to each other (parent links) by [`TaskId`] and resolve through
//! the registry, so a retired or dropped parent simply stops resolving. The
//! registry holds weak references only; it never keeps a task alive.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::{RegistryConfig, TaskConfig};
use crate::domain::ids::{self, IdCounter};
use crate::domain::TaskId;
use crate::ports::{Clock, SystemClock};
use crate::status::{TaskCounts, TaskSnapshot};
use crate::task::handle::TaskCell;
use crate::task::{Task, TaskCore, TrackedTask};

struct RegistryInner {
    ids: RefCell<IdCounter<ids::Task>>,
    tasks: RefCell<BTreeMap<TaskId, Weak<TaskCell>>>,
    config: RefCell<RegistryConfig>,
    clock: Rc<dyn Clock>,
}

/// Shared handle to a task registry. Clones share state.
///
/// Use one registry per tree of related tasks, or [`Registry::global`] for the
/// per-thread default.
///
/// # Ids
/// Ids start at 1 and strictly increase per registry. They are never reused,
/// even after the task is destroyed or dropped.
///
/// # Example
/// ```
/// use tasklog_core::{Registry, TaskResult, TaskState, TrackedTask};
///
/// let registry = Registry::new();
/// let task = registry.new_task("scan", true);
/// task.start(Some(2));
/// task.advance(2);
/// task.complete(TaskResult::Successful);
///
/// assert_eq!(task.state(), TaskState::Completed);
/// assert_eq!(registry.counts().completed, 1);
/// ```
#[derive(Clone)]
pub struct Registry {
    inner: Rc<RegistryInner>,
}

thread_local! {
    static GLOBAL: Registry = Registry::new();
}

impl Registry {
    /// Registry with default config and the wall clock.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self::with_clock(config, Rc::new(SystemClock))
    }

    /// Registry reading time from `clock`; tests pass a
    /// [`ManualClock`](crate::ports::ManualClock).
    pub fn with_clock(config: RegistryConfig, clock: Rc<dyn Clock>) -> Self {
        Self {
            inner: Rc::new(RegistryInner {
                ids: RefCell::new(IdCounter::new()),
                tasks: RefCell::new(BTreeMap::new()),
                config: RefCell::new(config),
                clock,
            }),
        }
    }

    /// The calling thread's default registry.
    pub fn global() -> Self {
        GLOBAL.with(Registry::clone)
    }

    /// Create a task with the registry's task defaults.
    pub fn new_task(&self, name: impl Into<String>, logging_enabled: bool) -> Task {
        let mut config = self.inner.config.borrow().task_defaults.clone();
        config.logging_enabled = logging_enabled;
        self.new_task_with(name, config)
    }

    /// Create a task with explicit settings, ignoring the registry defaults.
    pub fn new_task_with(&self, name: impl Into<String>, config: TaskConfig) -> Task {
        let id = self.inner.ids.borrow_mut().allocate();
        let core = TaskCore::new(name, &config);
        let task = Task::from_core(id, self.clone(), core);
        self.inner.tasks.borrow_mut().insert(id, task.downgrade());
        debug!(task = %id, name = %task.name(), "task registered");
        task
    }

    /// The live task with this id, if any. Destroyed and dropped tasks do not
    /// resolve.
    pub fn resolve(&self, id: TaskId) -> Option<Task> {
        let cell = self.inner.tasks.borrow().get(&id)?.upgrade();
        match cell {
            Some(cell) => Some(Task::from_cell(cell)),
            None => {
                self.forget(id);
                None
            }
        }
    }

    /// Drop `id` from the live set. Safe to call from inside a drop that
    /// happens while the map is borrowed; the stale entry is pruned later.
    pub(crate) fn forget(&self, id: TaskId) {
        if let Ok(mut tasks) = self.inner.tasks.try_borrow_mut() {
            tasks.remove(&id);
        }
    }

    /// Live tasks in id (creation) order.
    pub fn live_tasks(&self) -> Vec<Task> {
        let mut tasks = self.inner.tasks.borrow_mut();
        tasks.retain(|_, cell| cell.strong_count() > 0);
        tasks
            .values()
            .filter_map(Weak::upgrade)
            .map(Task::from_cell)
            .collect()
    }

    /// Number of live tasks.
    pub fn len(&self) -> usize {
        self.live_tasks().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current configuration, toggles included.
    pub fn config(&self) -> RegistryConfig {
        self.inner.config.borrow().clone()
    }

    pub fn mirror_messages(&self) -> bool {
        self.inner.config.borrow().mirror_messages
    }

    /// Re-emit every accepted task message through `tracing`.
    pub fn set_mirror_messages(&self, enabled: bool) {
        self.inner.config.borrow_mut().mirror_messages = enabled;
    }

    pub fn elapsed_notifications(&self) -> bool {
        self.inner.config.borrow().elapsed_notifications
    }

    /// Turn [`Registry::tick`] broadcasts on or off.
    pub fn set_elapsed_notifications(&self, enabled: bool) {
        self.inner.config.borrow_mut().elapsed_notifications = enabled;
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }

    /// Broadcast `ElapsedTime` for every Busy task whose last broadcast is at
    /// least one interval old. No-op while elapsed notifications are off.
    pub fn tick(&self) {
        let (enabled, interval) = {
            let config = self.inner.config.borrow();
            (config.elapsed_notifications, config.elapsed_interval())
        };
        if !enabled {
            return;
        }
        let now = self.now();
        for task in self.live_tasks() {
            task.elapsed_tick(now, interval);
        }
    }

    /// Snapshots of all live tasks in id order.
    pub fn snapshot(&self) -> Vec<TaskSnapshot> {
        self.live_tasks().iter().map(TaskSnapshot::of).collect()
    }

    /// Live tasks per lifecycle state.
    pub fn counts(&self) -> TaskCounts {
        TaskCounts::of(self.live_tasks().iter())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("tasks", &self.inner.tasks.borrow().len())
            .field("config", &self.inner.config.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskEvent, TaskState};
    use crate::ports::{EventLog, ManualClock};
    use chrono::TimeZone;
    use std::time::Duration;

    fn clocked() -> (Registry, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        ));
        let registry = Registry::with_clock(RegistryConfig::default(), clock.clone());
        (registry, clock)
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let registry = Registry::new();
        let ids: Vec<TaskId> = (0..5)
            .map(|i| registry.new_task(format!("t{i}"), true).id())
            .collect();

        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(ids[0], TaskId::from_raw(1));
    }

    #[test]
    fn ids_keep_increasing_after_tasks_go_away() {
        let registry = Registry::new();
        let first = registry.new_task("a", true).id();
        let second = registry.new_task("b", true).id();
        assert!(second > first);
    }

    #[test]
    fn resolve_finds_live_tasks() {
        let registry = Registry::new();
        let task = registry.new_task("scan", true);

        let found = registry.resolve(task.id()).unwrap();
        assert!(found.ptr_eq(&task));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn dropped_task_no_longer_resolves() {
        let registry = Registry::new();
        let id = registry.new_task("scan", true).id();

        assert!(registry.resolve(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn destroyed_task_no_longer_resolves() {
        let registry = Registry::new();
        let task = registry.new_task("scan", true);
        task.destroy();

        assert!(registry.resolve(task.id()).is_none());
        assert!(task.is_destroyed());
    }

    #[test]
    fn registries_are_isolated() {
        let a = Registry::new();
        let b = Registry::new();
        let task = a.new_task("scan", true);

        assert!(b.resolve(task.id()).is_none());
    }

    #[test]
    fn global_registry_is_shared_per_thread() {
        let task = Registry::global().new_task("global", true);
        let found = Registry::global().resolve(task.id()).unwrap();
        assert!(found.ptr_eq(&task));
    }

    #[test]
    fn new_task_applies_defaults_and_logging_flag() {
        let mut config = RegistryConfig::default();
        config.task_defaults.error_history = 2;
        let registry = Registry::with_config(config);

        let task = registry.new_task("quiet", false);

        assert!(!task.logging_enabled());
        task.start(None);
        for i in 0..4 {
            task.log_error(&format!("e{i}"));
        }
        // Logging disabled drops messages entirely.
        assert!(task.last_error_messages(None).is_empty());
    }

    #[test]
    fn tick_broadcasts_elapsed_time_once_per_interval() {
        let (registry, clock) = clocked();
        let task = registry.new_task("scan", true);
        let idle = registry.new_task("idle", true);
        let log = Rc::new(EventLog::new());
        task.subscribe(log.clone());
        idle.subscribe(log.clone());
        task.start(None);

        clock.advance(Duration::from_millis(400));
        registry.tick();
        clock.advance(Duration::from_millis(700));
        registry.tick();
        registry.tick();

        let ticks: Vec<_> = log
            .events()
            .into_iter()
            .filter(|(_, e)| matches!(e, TaskEvent::ElapsedTime(_)))
            .collect();
        assert_eq!(
            ticks,
            vec![(task.id(), TaskEvent::ElapsedTime(Duration::from_millis(1100)))]
        );
    }

    #[test]
    fn tick_is_silent_when_disabled() {
        let (registry, clock) = clocked();
        registry.set_elapsed_notifications(false);
        let task = registry.new_task("scan", true);
        let log = Rc::new(EventLog::new());
        task.subscribe(log.clone());
        task.start(None);
        log.clear();

        clock.advance(Duration::from_secs(5));
        registry.tick();

        assert!(log.is_empty());
    }

    #[test]
    fn counts_group_by_state() {
        let registry = Registry::new();
        let busy = registry.new_task("busy", true);
        let done = registry.new_task("done", true);
        let _idle = registry.new_task("idle", true);
        busy.start(None);
        done.start(None);
        done.complete(crate::domain::TaskResult::Successful);

        let counts = registry.counts();
        assert_eq!(counts.busy, 1);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.not_started, 1);
        assert_eq!(busy.state(), TaskState::Busy);
    }
}
