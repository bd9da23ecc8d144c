//! Time source for record timestamps

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use std::sync::Mutex;

/// Supplies the generation instant for each record
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock, truncated to microseconds and never stepping backwards
#[derive(Debug, Default)]
pub struct SystemClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let now = truncate_micros(Utc::now());
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let issued = match *last {
            Some(prev) if prev > now => prev,
            _ => now,
        };
        *last = Some(issued);
        issued
    }
}

/// Drop sub-microsecond precision so the wire form round-trips exactly
pub fn truncate_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.duration_trunc(TimeDelta::microseconds(1)).unwrap_or(ts)
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_system_clock_non_decreasing() {
        let clock = SystemClock::new();
        let mut prev = clock.now();
        for _ in 0..1000 {
            let next = clock.now();
            assert!(next >= prev);
            prev = next;
        }
    }

    #[test]
    fn test_system_clock_clamps_backwards_step() {
        let clock = SystemClock::new();
        let future = Utc::now() + TimeDelta::hours(1);
        *clock.last.lock().unwrap() = Some(future);
        assert_eq!(clock.now(), future);
    }

    #[test]
    fn test_truncate_micros() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 3, 12, 0, 0).unwrap() + TimeDelta::nanoseconds(1_234_567);
        let truncated = truncate_micros(ts);
        assert_eq!(truncated.nanosecond(), 1_234_000);
    }
}
