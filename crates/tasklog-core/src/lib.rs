//! tasklog-core
//!
//! Lifecycle and hierarchical progress/log tracking for long-running work.
//!
//! # Modules
//! - **domain**: plain data (ids, states, severities, results, lifetime policy, events, errors)
//! - **ports**: seams to the outside (clock, observers)
//! - **task**: the `TrackedTask` contract, the state machine and the `Task` handle
//! - **registry**: id allocation and id → task resolution
//! - **container**: named, ordered set of tasks that owns their lifetime
//! - **status**: serializable snapshots and per-state counts
//! - **config**: registry and per-task settings
//!
//! # Threading
//! Everything here is single-threaded. `Task`, `Registry` and `TaskContainer`
//! are built on `Rc`/`RefCell` and are neither `Send` nor `Sync`; there is no
//! internal locking. Drive them from one thread (or one current-thread async
//! runtime). Observers are called synchronously, in call order, after the task
//! has released its internal state, so they may query or drive the task.

pub mod config;
pub mod container;
pub mod domain;
pub mod ports;
pub mod registry;
pub mod status;
pub mod task;

pub use config::{RegistryConfig, TaskConfig};
pub use container::TaskContainer;
pub use domain::{
    BusyState, Capability, CompletionPolicy, ConfigError, ContainerError, DestroyTrigger,
    LifetimePolicy, LogEntry, ObserverId, ParentError, Severity, TaskEvent, TaskId, TaskKind,
    TaskResult, TaskState, TransitionError,
};
pub use ports::{Clock, EventLog, ManualClock, SystemClock, TaskObserver};
pub use registry::Registry;
pub use status::{TaskCounts, TaskSnapshot};
pub use task::{Task, TrackedTask};
