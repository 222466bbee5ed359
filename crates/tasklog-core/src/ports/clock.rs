//! Clock port.
//!
//! The state machine reads time only through this trait, so elapsed-time
//! behaviour can be tested with a [`ManualClock`].

use std::cell::Cell;
use std::time::Duration;

use chrono::{DateTime, Utc};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let next = chrono::Duration::from_std(by)
            .ok()
            .and_then(|step| self.now.get().checked_add_signed(step));
        if let Some(next) = next {
            self.now.set(next);
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.now.set(at);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Non-negative span between two instants as a std `Duration`.
pub(crate) fn span(from: DateTime<Utc>, to: DateTime<Utc>) -> Duration {
    (to - from).to_std().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let clock = ManualClock::new(start);

        clock.advance(Duration::from_millis(1500));

        assert_eq!(span(start, clock.now()), Duration::from_millis(1500));
    }

    #[test]
    fn span_clamps_negative_to_zero() {
        let later = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 1).unwrap();
        let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

        assert_eq!(span(later, earlier), Duration::ZERO);
    }

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
