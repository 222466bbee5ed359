//! Domain model (ids, states, severities, outcomes, lifetime, events, errors).
//!
//! Plain data with no behaviour beyond predicates and derivation tables; the
//! state machine lives in [`crate::task`].

pub mod errors;
pub mod events;
pub mod ids;
pub mod lifetime;
pub mod outcome;
pub mod severity;
pub mod state;

pub use errors::{ConfigError, ContainerError, ParentError, TransitionError};
pub use events::TaskEvent;
pub use ids::{ObserverId, TaskId};
pub use lifetime::{DestroyTrigger, LifetimePolicy};
pub use outcome::{CompletionPolicy, TaskResult};
pub use severity::{LogEntry, Severity};
pub use state::{BusyState, Capability, TaskKind, TaskState};
