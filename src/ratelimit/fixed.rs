//! Fixed window counters.
//!
//! Each caller owns a `(window_start, count)` pair. Windows are aligned to
//! multiples of the window length since the clock epoch, so a 10 second
//! window has boundaries at :00, :10, :20 and so on. A caller can therefore
//! be admitted up to twice its limit across two adjacent windows.

use dashmap::DashMap;
use std::time::Duration;
use tracing::{debug, trace};

use super::limiter::Decision;

/// Counter state for one caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WindowCount {
    /// Aligned start of the window the count belongs to
    window_start: Duration,
    /// Requests evaluated in that window, rejected ones included
    count: u64,
}

/// Fixed window admission state for all callers.
pub struct FixedWindow {
    limit: u64,
    window: Duration,
    callers: DashMap<String, WindowCount>,
}

impl FixedWindow {
    /// Create an empty fixed window limiter. Inputs are validated by the caller.
    pub fn new(limit: u64, window: Duration) -> Self {
        Self {
            limit,
            window,
            callers: DashMap::new(),
        }
    }

    /// Start of the aligned window containing `now`.
    pub fn aligned_start(&self, now: Duration) -> Duration {
        let now_nanos = now.as_nanos();
        let start = now_nanos - now_nanos % self.window.as_nanos();
        duration_from_nanos(start)
    }

    /// Record a request from `caller` at `now` and decide on it.
    pub fn check(&self, caller: &str, now: Duration) -> Decision {
        let window_start = self.aligned_start(now);

        let mut entry = match self.callers.get_mut(caller) {
            Some(entry) => entry,
            None => self.callers.entry(caller.to_string()).or_insert_with(|| {
                debug!(caller = %caller, "Creating fixed window counter");
                WindowCount {
                    window_start,
                    count: 0,
                }
            }),
        };

        let state = entry.value_mut();
        if state.window_start != window_start {
            trace!(
                caller = %caller,
                previous = ?state.window_start,
                current = ?window_start,
                "Entering new fixed window"
            );
            state.window_start = window_start;
            state.count = 1;
        } else {
            state.count = state.count.saturating_add(1);
        }
        let count = state.count;
        drop(entry);

        let reset_after = window_start.saturating_add(self.window).saturating_sub(now);
        Decision::new(count, self.limit, reset_after)
    }

    /// Requests counted for `caller` in the window containing `now`.
    pub fn current_count(&self, caller: &str, now: Duration) -> u64 {
        let window_start = self.aligned_start(now);
        self.callers
            .get(caller)
            .filter(|state| state.window_start == window_start)
            .map(|state| state.count)
            .unwrap_or(0)
    }

    /// Drop callers whose counter belongs to a past window.
    ///
    /// Their next request would reset the counter anyway.
    pub fn purge_expired(&self, now: Duration) -> usize {
        let window_start = self.aligned_start(now);
        let mut removed = 0;
        self.callers.retain(|_, state| {
            let keep = state.window_start == window_start;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Number of callers with stored state.
    pub fn len(&self) -> usize {
        self.callers.len()
    }

    /// Drop all caller state.
    pub fn clear(&self) {
        self.callers.clear();
    }
}

fn duration_from_nanos(nanos: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    let secs = u64::try_from(nanos / NANOS_PER_SEC).unwrap_or(u64::MAX);
    // Always below one billion
    let subsec = (nanos % NANOS_PER_SEC) as u32;
    Duration::new(secs, subsec)
}
