//! Task container: named, ordered collection of tracked tasks.
//!
//! Design:
//! - Registration order is preserved and is the order `tasks()` reports.
//! - Names and ids are unique; a rejected registration changes nothing.
//! - The container owns its tasks. Dropping it destroys every one of them.

use tracing::debug;

use crate::domain::{ContainerError, TaskId, TaskKind};
use crate::task::TrackedTask;

struct Entry {
    name: String,
    task: Box<dyn TrackedTask>,
    active: bool,
}

/// Owner of a set of tasks, addressed by id or by name.
///
/// Destroyed tasks are invisible to every lookup (`tasks`, `task`,
/// `find_by_name`) and are forgotten on the next registration.
///
/// # Example
/// ```
/// use tasklog_core::{Registry, TaskContainer, TrackedTask};
///
/// let registry = Registry::new();
/// let mut container = TaskContainer::new();
/// let id = container.register(registry.new_task("scan", true), "scan").unwrap();
/// assert_eq!(container.find_by_name("scan").map(|t| t.id()), Some(id));
/// ```
#[derive(Default)]
pub struct TaskContainer {
    entries: Vec<Entry>,
}

impl TaskContainer {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register `task` under `name`. New entries start active.
    ///
    /// # Errors
    /// - `DuplicateName` if a live entry already uses `name`.
    /// - `DuplicateTask` if the same task is already registered.
    ///
    /// Either way the container is left as it was.
    pub fn register(
        &mut self,
        task: impl TrackedTask + 'static,
        name: impl Into<String>,
    ) -> Result<TaskId, ContainerError> {
        self.prune();
        let name = name.into();
        let id = task.id();
        if self.entries.iter().any(|e| e.name == name) {
            return Err(ContainerError::DuplicateName(name));
        }
        if self.entries.iter().any(|e| e.task.id() == id) {
            return Err(ContainerError::DuplicateTask(id));
        }
        debug!(task = %id, name = %name, "task added to container");
        self.entries.push(Entry {
            name,
            task: Box::new(task),
            active: true,
        });
        Ok(id)
    }

    /// Active, non-destroyed tasks in registration order.
    pub fn tasks(&self) -> Vec<&dyn TrackedTask> {
        self.entries
            .iter()
            .filter(|e| e.active && !e.task.is_destroyed())
            .map(|e| e.task.as_ref())
            .collect()
    }

    /// Any registered, non-destroyed task, active or not.
    pub fn task(&self, id: TaskId) -> Option<&dyn TrackedTask> {
        self.entry(id)
            .filter(|e| !e.task.is_destroyed())
            .map(|e| e.task.as_ref())
    }

    /// Non-destroyed task registered under `name`, active or not.
    pub fn find_by_name(&self, name: &str) -> Option<&dyn TrackedTask> {
        self.entries
            .iter()
            .find(|e| e.name == name && !e.task.is_destroyed())
            .map(|e| e.task.as_ref())
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Show the task in `tasks()` again.
    pub fn enable(&mut self, id: TaskId) -> Result<(), ContainerError> {
        self.entry_mut(id)?.active = true;
        Ok(())
    }

    /// Hide the task from `tasks()`. It stays registered and reachable by id.
    pub fn disable(&mut self, id: TaskId) -> Result<(), ContainerError> {
        self.entry_mut(id)?.active = false;
        Ok(())
    }

    pub fn is_active(&self, id: TaskId) -> bool {
        self.entry(id).is_some_and(|e| e.active)
    }

    /// Mark the task [`TaskKind::Global`].
    pub fn set_global(&mut self, id: TaskId) -> Result<(), ContainerError> {
        self.entry_mut(id)?.task.set_kind(TaskKind::Global);
        Ok(())
    }

    pub fn set_local(&mut self, id: TaskId) -> Result<(), ContainerError> {
        self.entry_mut(id)?.task.set_kind(TaskKind::Local);
        Ok(())
    }

    /// Number of entries, including disabled ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, id: TaskId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.task.id() == id)
    }

    fn entry_mut(&mut self, id: TaskId) -> Result<&mut Entry, ContainerError> {
        self.entries
            .iter_mut()
            .find(|e| e.task.id() == id)
            .ok_or(ContainerError::UnknownTask(id))
    }

    /// Forget tasks that were destroyed elsewhere (by their lifetime policy,
    /// say) so their names can be reused.
    fn prune(&mut self) {
        self.entries.retain(|e| !e.task.is_destroyed());
    }
}

impl Drop for TaskContainer {
    fn drop(&mut self) {
        for entry in &self.entries {
            entry.task.destroy();
        }
    }
}
