//! Time abstractions for testable timing operations.
//!
//! Signature verification compares delivery timestamps against the
//! current time; injecting the clock keeps those checks deterministic
//! under test.

use std::{
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

/// Clock abstraction for time operations.
///
/// Production code uses [`RealClock`]; tests can inject a controllable
/// implementation.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Returns the current instant for duration measurements.
    fn now(&self) -> Instant;

    /// Returns the current system time for timestamps.
    fn now_system(&self) -> SystemTime;
}

/// Real clock implementation using system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealClock;

impl RealClock {
    /// Creates a new real clock instance.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for RealClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn now_system(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Test clock with a controllable system time.
///
/// Monotonic time stays real; system time is pinned to a UNIX timestamp
/// and advanced explicitly, so tolerance-window checks are reproducible.
#[derive(Debug, Clone)]
pub struct TestClock {
    system_secs: Arc<AtomicI64>,
}

impl TestClock {
    /// Creates a test clock pinned to the given UNIX timestamp.
    pub fn at(unix_secs: i64) -> Self {
        Self { system_secs: Arc::new(AtomicI64::new(unix_secs)) }
    }

    /// Advances the pinned system time by whole seconds.
    pub fn advance_secs(&self, secs: i64) {
        self.system_secs.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn now_system(&self) -> SystemTime {
        let secs = self.system_secs.load(Ordering::SeqCst);
        UNIX_EPOCH + Duration::from_secs(u64::try_from(secs).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_pins_system_time() {
        let clock = TestClock::at(1_700_000_000);
        let secs =
            clock.now_system().duration_since(UNIX_EPOCH).expect("after epoch").as_secs();

        assert_eq!(secs, 1_700_000_000);
    }

    #[test]
    fn test_clock_advances() {
        let clock = TestClock::at(1_700_000_000);
        clock.advance_secs(90);

        let secs =
            clock.now_system().duration_since(UNIX_EPOCH).expect("after epoch").as_secs();
        assert_eq!(secs, 1_700_000_090);
    }

    #[test]
    fn clones_share_the_same_timeline() {
        let clock = TestClock::at(100);
        let other = clock.clone();
        clock.advance_secs(5);

        let secs = other.now_system().duration_since(UNIX_EPOCH).expect("after epoch").as_secs();
        assert_eq!(secs, 105);
    }
}
