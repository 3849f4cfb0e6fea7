//! Sliding window logs.
//!
//! Each caller owns the timestamps of its evaluated requests in arrival
//! order. Entries older than the window are evicted before every evaluation,
//! so the log only ever holds the trailing interval `[now - window, now]`.
//! Arrival order is not time order once a clock steps back, so eviction
//! scans the whole log.

use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, trace};

use super::limiter::Decision;

/// Sliding window admission state for all callers.
pub struct SlidingWindow {
    limit: u64,
    window: Duration,
    callers: DashMap<String, VecDeque<Duration>>,
}

impl SlidingWindow {
    /// Create an empty sliding window limiter. Inputs are validated by the caller.
    pub fn new(limit: u64, window: Duration) -> Self {
        Self {
            limit,
            window,
            callers: DashMap::new(),
        }
    }

    /// Record a request from `caller` at `now` and decide on it.
    ///
    /// The timestamp is kept even when the request is rejected.
    pub fn check(&self, caller: &str, now: Duration) -> Decision {
        let mut entry = match self.callers.get_mut(caller) {
            Some(entry) => entry,
            None => self.callers.entry(caller.to_string()).or_insert_with(|| {
                debug!(caller = %caller, "Creating sliding window log");
                VecDeque::new()
            }),
        };

        let log = entry.value_mut();
        let evicted = evict_expired(log, now, self.window);
        if evicted > 0 {
            trace!(caller = %caller, evicted = evicted, "Evicted expired timestamps");
        }

        log.push_back(now);
        let count = log.len() as u64;
        let reset_after = log
            .iter()
            .min()
            .map(|oldest| oldest.saturating_add(self.window).saturating_sub(now))
            .unwrap_or(self.window);
        drop(entry);

        Decision::new(count, self.limit, reset_after)
    }

    /// Requests recorded for `caller` within the window ending at `now`.
    pub fn current_count(&self, caller: &str, now: Duration) -> u64 {
        self.callers
            .get(caller)
            .map(|log| {
                log.iter()
                    .filter(|ts| !is_expired(**ts, now, self.window))
                    .count() as u64
            })
            .unwrap_or(0)
    }

    /// Drop callers whose whole log has aged out of the window.
    pub fn purge_expired(&self, now: Duration) -> usize {
        let window = self.window;
        let mut removed = 0;
        self.callers.retain(|_, log| {
            let keep = log.iter().any(|ts| !is_expired(*ts, now, window));
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

fn is_expired(timestamp: Duration, now: Duration, window: Duration) -> bool {
    now.saturating_sub(timestamp) > window
}

fn evict_expired(log: &mut VecDeque<Duration>, now: Duration, window: Duration) -> usize {
    let before = log.len();
    log.retain(|ts| !is_expired(*ts, now, window));
    before - log.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_seven_requests_one_second_apart() {
        let limiter = SlidingWindow::new(5, secs(10));

        let rejected: Vec<bool> = (1..=7)
            .map(|t| !limiter.check("user123", secs(t)).admitted)
            .collect();

        assert_eq!(rejected, vec![false, false, false, false, false, true, true]);
    }

    #[test]
    fn test_rejected_requests_occupy_slots() {
        let limiter = SlidingWindow::new(2, secs(10));

        assert!(limiter.check("user", secs(0)).admitted);
        assert!(limiter.check("user", secs(1)).admitted);
        assert!(!limiter.check("user", secs(2)).admitted);

        // t=0 has left the window but the rejected t=2 still occupies a slot
        let decision = limiter.check("user", secs(11));
        assert!(!decision.admitted);
        assert_eq!(decision.count, 3);

        // Room again once every earlier entry has aged out
        assert!(limiter.check("user", secs(22)).admitted);
    }

    #[test]
    fn test_timestamp_exactly_window_old_is_retained() {
        let limiter = SlidingWindow::new(1, secs(10));

        assert!(limiter.check("user", secs(0)).admitted);
        assert!(!limiter.check("user", secs(10)).admitted);
        assert_eq!(limiter.current_count("user", secs(10)), 2);
        assert_eq!(limiter.current_count("user", Duration::from_millis(10_001)), 1);
    }

    #[test]
    fn test_reset_after_tracks_oldest_entry() {
        let limiter = SlidingWindow::new(5, secs(10));

        limiter.check("user", secs(2));
        let decision = limiter.check("user", secs(5));
        assert_eq!(decision.reset_after, secs(7));
    }

    #[test]
    fn test_evict_expired() {
        let mut log: VecDeque<Duration> = [secs(1), secs(2), secs(8), secs(9)].into_iter().collect();

        assert_eq!(evict_expired(&mut log, secs(12), secs(5)), 2);
        assert_eq!(log, VecDeque::from(vec![secs(8), secs(9)]));
    }

    #[test]
    fn test_evict_after_clock_steps_back() {
        let limiter = SlidingWindow::new(1, secs(10));

        limiter.check("user", secs(5));
        limiter.check("user", secs(0));

        // t=0 is 12s old and must go even though it was recorded after t=5
        let decision = limiter.check("user", secs(12));
        assert_eq!(decision.count, 2);
        assert_eq!(decision.reset_after, secs(3));
        assert_eq!(limiter.current_count("user", secs(12)), 2);
    }

    #[test]
    fn test_evict_expired_out_of_order() {
        let mut log: VecDeque<Duration> = [secs(9), secs(1), secs(8), secs(2)].into_iter().collect();

        assert_eq!(evict_expired(&mut log, secs(12), secs(5)), 2);
        assert_eq!(log, VecDeque::from(vec![secs(9), secs(8)]));
    }

    #[test]
    fn test_purge_expired() {
        let limiter = SlidingWindow::new(5, secs(10));

        limiter.check("old", secs(0));
        limiter.check("recent", secs(15));

        assert_eq!(limiter.purge_expired(secs(20)), 1);
        assert_eq!(limiter.len(), 1);
        assert_eq!(limiter.current_count("recent", secs(20)), 1);
    }
}
