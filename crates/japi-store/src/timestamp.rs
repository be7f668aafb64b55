//! Snapshot container timestamps.
//!
//! A timestamp is a millisecond epoch rendered as exactly 13 decimal digits,
//! so lexicographic order of container names equals chronological order.
//! Only names matching that pattern are considered history containers.

use chrono::{DateTime, TimeZone, Utc};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Digits in a container name.
pub const TIMESTAMP_WIDTH: usize = 13;

/// Largest value that still renders in `TIMESTAMP_WIDTH` digits.
pub const MAX_TIMESTAMP_MS: u64 = 9_999_999_999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_millis(ms: u64) -> Self {
        Self(ms.min(MAX_TIMESTAMP_MS))
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Parse a container name; `None` unless it is exactly 13 ASCII digits.
    pub fn parse_name(name: &str) -> Option<Self> {
        if name.len() == TIMESTAMP_WIDTH && name.bytes().all(|b| b.is_ascii_digit()) {
            name.parse().ok().map(Self)
        } else {
            None
        }
    }

    /// The following millisecond.
    pub fn next(self) -> Self {
        Self::from_millis(self.0.saturating_add(1))
    }

    /// Wall-clock rendering for humans.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.0)
            .ok()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = TIMESTAMP_WIDTH)
    }
}

/// Source of write-time timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock in UTC milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0))
    }
}

/// Clock that only moves when told to. Used to pin timestamps in tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(start_ms),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now_ms.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.now_ms.load(Ordering::SeqCst))
    }
}
