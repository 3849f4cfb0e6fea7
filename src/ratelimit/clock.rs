//! Time sources for admission decisions.
//!
//! Timestamps are expressed as a [`Duration`] since the clock's epoch. The
//! fixed window algorithm truncates that offset to a multiple of the window,
//! so the epoch determines where window boundaries fall.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;

/// A source of the current instant.
pub trait Clock: Send + Sync {
    /// Time elapsed since this clock's epoch.
    fn now(&self) -> Duration;
}

/// Monotonic clock aligned to the Unix epoch.
///
/// The wall-clock time is sampled once at construction. Later readings add
/// the elapsed [`Instant`] time, so they never move backwards even when the
/// system clock is adjusted, while window boundaries still land on round
/// wall-clock seconds.
#[derive(Debug, Clone)]
pub struct SystemClock {
    /// Unix time at construction
    anchor: Duration,
    /// Monotonic reference taken together with `anchor`
    started: Instant,
}

impl SystemClock {
    /// Create a clock anchored at the current wall-clock time.
    pub fn new() -> Self {
        let micros = Utc::now().timestamp_micros();
        Self {
            anchor: Duration::from_micros(u64::try_from(micros).unwrap_or(0)),
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.anchor + self.started.elapsed()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to a controller.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// Create a clock reading `start`.
    pub fn new(start: Duration) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    /// Set the clock to an absolute reading.
    pub fn set(&self, to: Duration) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }
}
