//! Message severities and log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::state::BusyState;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    /// The busy state a message of this severity escalates to, if any.
    pub fn busy_state(self) -> Option<BusyState> {
        match self {
            Severity::Debug | Severity::Info => None,
            Severity::Warning => Some(BusyState::WithWarnings),
            Severity::Error | Severity::Fatal => Some(BusyState::WithErrors),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

/// One message in a task's own log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub severity: Severity,
    pub text: String,
}
