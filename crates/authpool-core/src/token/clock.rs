//! Time source abstraction
//!
//! Token lifetimes are measured against a [`Clock`] rather than calling
//! `Utc::now()` inline, so TTL and refresh-margin behavior is testable
//! without sleeping.

use chrono::{DateTime, Utc};

/// Source of the current time
pub trait Clock: Send + Sync {
    /// The current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time, used everywhere outside of tests
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
