//! Clock abstraction for determinism.

use chrono::{DateTime, Utc};

/// Source of the timestamps recorded on events (`published_at`,
/// `commented_at`, ...). Injected so tests can pin time.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
