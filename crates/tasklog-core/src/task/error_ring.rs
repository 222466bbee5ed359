//! Bounded history of recent error messages.

use std::collections::VecDeque;

use crate::config::DEFAULT_ERROR_HISTORY;

/// Newest-first ring of error texts. Pushing past capacity drops the oldest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRing {
    entries: VecDeque<String>,
    capacity: usize,
}

impl ErrorRing {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, text: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_front(text.into());
        self.entries.truncate(self.capacity);
    }

    /// Up to `count` newest entries; `None` means all of them.
    pub fn latest(&self, count: Option<usize>) -> Vec<String> {
        let take = count.unwrap_or(self.entries.len());
        self.entries.iter().take(take).cloned().collect()
    }

    /// Shrinking keeps the newest entries.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.entries.truncate(capacity);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ErrorRing {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ERROR_HISTORY)
    }
}
