//! The source of "now".
//!
//! Bounds written as `"now"` and values written as `"now"` (or left blank) are
//! resolved against a [`Clock`]. Production code uses [`SystemClock`]; tests pin
//! the instant with [`FixedClock`].

use chrono::{DateTime, Utc};

/// Provides the current instant.
///
/// Called once per validation, never cached between calls.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the OS clock via `chrono::Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_returns_given_instant() {
        let instant = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(FixedClock::new(instant).now(), instant);
    }

    #[test]
    fn test_clock_trait_object() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
        let clock: Box<dyn Clock> = Box::new(FixedClock(instant));
        assert_eq!(clock.now(), instant);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let first = SystemClock.now();
        let second = SystemClock.now();
        assert!(second >= first);
    }
}
