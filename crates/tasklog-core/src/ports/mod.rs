//! Ports: the seams between the state machine and its surroundings.
//!
//! - [`Clock`]: where time comes from (wall clock, or a manual one in tests).
//! - [`TaskObserver`]: where notifications go.

pub mod clock;
pub mod observer;

pub use self::clock::{Clock, ManualClock, SystemClock};
pub use self::observer::{EventLog, TaskObserver};
