use std::fmt;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Source of block timestamps
pub trait Clock: fmt::Debug + Send + Sync {
    /// Returns the current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock, used outside of tests
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    instant: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at `instant`
    pub fn new(instant: DateTime<Utc>) -> Self {
        ManualClock {
            instant: Mutex::new(instant),
        }
    }

    /// Moves the clock to `instant`
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.instant.lock().unwrap_or_else(PoisonError::into_inner) = instant;
    }

    /// Moves the clock forward by `step`
    pub fn advance(&self, step: Duration) {
        let mut instant = self.instant.lock().unwrap_or_else(PoisonError::into_inner);
        *instant = *instant + step;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Renders a timestamp the way block hashes consume it
///
/// RFC 3339, UTC, nanosecond precision, `Z` suffix.
pub fn canonical_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}
