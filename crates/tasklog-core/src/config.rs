//! Registry and task configuration.
//!
//! Every field has a default, so a config file only needs the keys it changes.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{ConfigError, LifetimePolicy, TaskKind};

/// Error messages kept per task unless configured otherwise.
pub const DEFAULT_ERROR_HISTORY: usize = 10;

/// Minimum spacing of elapsed-time broadcasts.
pub const DEFAULT_ELAPSED_INTERVAL_MS: u64 = 1000;

/// Settings applied to a task at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    pub logging_enabled: bool,

    /// Capacity of the recent-errors ring.
    pub error_history: usize,

    pub clear_log_on_start: bool,
    pub lifetime: LifetimePolicy,
    pub can_start: bool,
    pub can_stop: bool,
    pub can_pause: bool,
    pub kind: TaskKind,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            logging_enabled: true,
            error_history: DEFAULT_ERROR_HISTORY,
            clear_log_on_start: false,
            lifetime: LifetimePolicy::manual_only(),
            can_start: true,
            can_stop: true,
            can_pause: true,
            kind: TaskKind::Local,
        }
    }
}

/// Process-wide toggles held by a [`Registry`](crate::Registry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Re-emit every accepted task message as a `tracing` event.
    pub mirror_messages: bool,

    /// Broadcast `ElapsedTime` from [`Registry::tick`](crate::Registry::tick).
    pub elapsed_notifications: bool,

    pub elapsed_interval_ms: u64,

    /// Defaults for tasks created through `Registry::new_task`.
    pub task_defaults: TaskConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            mirror_messages: false,
            elapsed_notifications: true,
            elapsed_interval_ms: DEFAULT_ELAPSED_INTERVAL_MS,
            task_defaults: TaskConfig::default(),
        }
    }
}

impl RegistryConfig {
    pub fn elapsed_interval(&self) -> Duration {
        Duration::from_millis(self.elapsed_interval_ms)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DestroyTrigger;

    #[test]
    fn defaults_have_reasonable_values() {
        let config = RegistryConfig::default();
        assert!(!config.mirror_messages);
        assert!(config.elapsed_notifications);
        assert_eq!(config.elapsed_interval(), Duration::from_secs(1));
        assert_eq!(config.task_defaults.error_history, 10);
        assert!(config.task_defaults.logging_enabled);
        assert!(config.task_defaults.lifetime.is_manual_only());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = RegistryConfig::from_json_str(
            r#"{
                "mirror_messages": true,
                "task_defaults": { "error_history": 3, "lifetime": { "on_stopped": true } }
            }"#,
        )
        .unwrap();

        assert!(config.mirror_messages);
        assert_eq!(config.elapsed_interval_ms, DEFAULT_ELAPSED_INTERVAL_MS);
        assert_eq!(config.task_defaults.error_history, 3);
        assert!(config.task_defaults.can_pause);
        assert!(config.task_defaults.lifetime.destroys_on(DestroyTrigger::Stopped));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = RegistryConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = RegistryConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
