//! Wall-clock source for accrual and cooldowns.
//!
//! All timestamps in the game are whole epoch seconds (`i64`). Components
//! read "now" through the [`Clock`] trait so tests can drive simulated time
//! with [`ManualClock`].

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// A source of the current time in epoch seconds.
pub trait Clock: Send + Sync {
    /// Current time as whole seconds since the Unix epoch.
    fn now(&self) -> i64;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create a clock frozen at `now`.
    pub const fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    /// Jump to an absolute time. May move backwards to simulate clock skew.
    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward by `secs` seconds and return the new time.
    pub fn advance(&self, secs: i64) -> i64 {
        let previous = self.now.fetch_add(secs, Ordering::SeqCst);
        previous.saturating_add(secs)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
