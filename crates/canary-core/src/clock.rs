//! Time sources. Everything that needs "now" takes a [`Clock`] so tests can
//! pin or advance it.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::temporal::Timestamp;

/// Source of the current UTC time.
pub trait Clock: Send + Sync {
    /// The current time, truncated to seconds.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    epoch_secs: AtomicI64,
}

impl ManualClock {
    /// Start the clock at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            epoch_secs: AtomicI64::new(start.epoch_secs()),
        }
    }

    /// Move the clock to `to`.
    pub fn set(&self, to: Timestamp) {
        self.epoch_secs.store(to.epoch_secs(), Ordering::SeqCst);
    }

    /// Move the clock forward by `secs` seconds.
    pub fn advance(&self, secs: i64) {
        self.epoch_secs.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let secs = self.epoch_secs.load(Ordering::SeqCst);
        // Only reachable values are those set from valid timestamps.
        Timestamp::from_epoch_secs(secs).unwrap_or_else(|_| Timestamp::now())
    }
}
