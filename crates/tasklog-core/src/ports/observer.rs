//! Observer port.
//!
//! Observers are called synchronously on the caller's thread, after the task
//! has released its internal borrow. They may query or drive the task they
//! observe; events caused that way are delivered after the current one.

use std::cell::RefCell;

use crate::domain::{TaskEvent, TaskId};

pub trait TaskObserver {
    fn on_event(&self, task: TaskId, event: &TaskEvent);
}

impl<F> TaskObserver for F
where
    F: Fn(TaskId, &TaskEvent),
{
    fn on_event(&self, task: TaskId, event: &TaskEvent) {
        self(task, event)
    }
}

/// Observer that records everything it sees.
#[derive(Debug, Default)]
pub struct EventLog {
    events: RefCell<Vec<(TaskId, TaskEvent)>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(TaskId, TaskEvent)> {
        self.events.borrow().clone()
    }

    /// Events seen for one task, in delivery order.
    pub fn events_for(&self, task: TaskId) -> Vec<TaskEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|(id, _)| *id == task)
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&TaskEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|(_, e)| pred(e)).count()
    }

    /// Texts of `MessageLogged` events, in delivery order.
    pub fn messages(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|(_, event)| match event {
                TaskEvent::MessageLogged { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl TaskObserver for EventLog {
    fn on_event(&self, task: TaskId, event: &TaskEvent) {
        self.events.borrow_mut().push((task, event.clone()));
    }
}
