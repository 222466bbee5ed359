//! Strongly-typed identifiers.
//!
//! Every id is a `u64` handed out by a counter that only moves forward, so ids
//! of one kind sort in creation order and are never reused. The phantom marker
//! keeps a `TaskId` from being passed where an `ObserverId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Marker trait for id kinds. Provides the prefix used by `Display`.
pub trait IdMarker: 'static {
    fn prefix() -> &'static str;
}

/// Generic id over a marker type.
///
/// ```ignore
/// let task: TaskId = Id::from_raw(1);
/// let observer: ObserverId = Id::from_raw(1);
/// // task and observer are different types even with the same raw value
/// ```
#[repr(transparent)]
#[derive(Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct Id<T: IdMarker> {
    raw: u64,
    #[serde(skip)]
    _marker: PhantomData<fn() -> T>,
}

impl<T: IdMarker> Id<T> {
    pub const fn from_raw(raw: u64) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    pub const fn as_u64(&self) -> u64 {
        self.raw
    }
}

// Manual impls: derives would put bounds on `T`, and the marker types are
// uninhabited enums that never need them.
impl<T: IdMarker> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: IdMarker> Copy for Id<T> {}

impl<T: IdMarker> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T: IdMarker> Eq for Id<T> {}

impl<T: IdMarker> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: IdMarker> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<T: IdMarker> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T: IdMarker> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.raw)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.raw)
    }
}

/// Task marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {}

impl IdMarker for Task {
    fn prefix() -> &'static str {
        "task-"
    }
}

/// Observer subscription marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Observer {}

impl IdMarker for Observer {
    fn prefix() -> &'static str {
        "observer-"
    }
}

/// Identifier of a task, issued by a [`Registry`](crate::Registry).
pub type TaskId = Id<Task>;

/// Handle returned by [`Task::subscribe`](crate::Task::subscribe).
pub type ObserverId = Id<Observer>;

/// Monotonic id source. Starts at 1; 0 is never issued.
#[derive(Debug)]
pub(crate) struct IdCounter<T: IdMarker> {
    next: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T: IdMarker> IdCounter<T> {
    pub(crate) fn new() -> Self {
        Self {
            next: 1,
            _marker: PhantomData,
        }
    }

    pub(crate) fn allocate(&mut self) -> Id<T> {
        let id = Id::from_raw(self.next);
        self.next += 1;
        id
    }
}

impl<T: IdMarker> Default for IdCounter<T> {
    fn default() -> Self {
        Self::new()
    }
}
