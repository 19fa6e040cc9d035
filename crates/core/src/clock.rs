// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time abstraction so the executor and its tests never call `SystemTime::now()`
//! directly. Everything that needs "now" — timeouts, retry cooldowns, event
//! timestamps — takes a `&dyn Clock`.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of the current time, abstracted for deterministic tests.
pub trait Clock: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Milliseconds since the Unix epoch.
    fn epoch_ms(&self) -> u64 {
        self.now().timestamp_millis().max(0) as u64
    }
}

/// Real-time clock backed by the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis() as u64
    }
}

/// Controllable clock for tests: starts at a fixed instant and only advances
/// when told to.
#[derive(Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<DateTime<Utc>>>,
}

impl FakeClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(start)),
        }
    }

    /// Advance the clock by `duration` and return the new time.
    pub fn advance(&self, duration: Duration) -> DateTime<Utc> {
        let mut guard = self.inner.lock();
        *guard += chrono::Duration::from_std(duration).unwrap_or_default();
        *guard
    }

    /// Set the clock to an absolute time.
    pub fn set(&self, at: DateTime<Utc>) {
        *self.inner.lock() = at;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_else(Utc::now))
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.inner.lock()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
