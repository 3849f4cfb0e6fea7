//! Core admission controller implementation.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace};

use super::clock::{Clock, SystemClock};
use super::fixed::FixedWindow;
use super::sliding::SlidingWindow;
use super::strategy::Strategy;
use crate::error::{ConfigurationError, Result};

/// The outcome of evaluating one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Whether the request is within the quota
    pub admitted: bool,
    /// Requests counted against the caller in the current window, this one included
    pub count: u64,
    /// The configured quota
    pub limit: u64,
    /// Admissions left before the quota is exhausted
    pub remaining: u64,
    /// Time until the count next drops
    pub reset_after: Duration,
}

impl Decision {
    pub(crate) fn new(count: u64, limit: u64, reset_after: Duration) -> Self {
        Self {
            admitted: count <= limit,
            count,
            limit,
            remaining: limit.saturating_sub(count),
            reset_after,
        }
    }
}

/// Per-caller state, one variant per strategy.
enum Algorithm {
    Fixed(FixedWindow),
    Sliding(SlidingWindow),
}

/// Decides, per caller and per call, whether a request fits the configured quota.
///
/// The controller is bound to one [`Strategy`] for its lifetime. Per-caller
/// state is created on first use and kept until [`purge_expired`] or
/// [`clear`] removes it. Updates for one caller are atomic, so the
/// controller can be shared across threads behind an [`Arc`].
///
/// [`purge_expired`]: AdmissionController::purge_expired
/// [`clear`]: AdmissionController::clear
pub struct AdmissionController {
    algorithm: Algorithm,
    strategy: Strategy,
    limit: u64,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl AdmissionController {
    /// Create a controller reading time from a [`SystemClock`].
    ///
    /// Fails if `limit` is zero or `window` is empty.
    pub fn new(limit: u64, window: Duration, strategy: Strategy) -> Result<Self> {
        Self::with_clock(limit, window, strategy, Arc::new(SystemClock::new()))
    }

    /// Create a controller reading time from `clock`.
    pub fn with_clock(
        limit: u64,
        window: Duration,
        strategy: Strategy,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        if limit == 0 {
            return Err(ConfigurationError::ZeroLimit);
        }
        if window.is_zero() {
            return Err(ConfigurationError::ZeroWindow);
        }

        let algorithm = match strategy {
            Strategy::Fixed => Algorithm::Fixed(FixedWindow::new(limit, window)),
            Strategy::Sliding => Algorithm::Sliding(SlidingWindow::new(limit, window)),
        };

        info!(
            strategy = %strategy,
            limit = limit,
            window = ?window,
            "Admission controller initialized"
        );

        Ok(Self {
            algorithm,
            strategy,
            limit,
            window,
            clock,
        })
    }

    /// Record a request from `caller_id` and return `true` if it must be rejected.
    pub fn is_too_frequent(&self, caller_id: &str) -> bool {
        !self.check(caller_id).admitted
    }

    /// Record a request from `caller_id` and return the full decision.
    ///
    /// Every call counts, including rejected ones.
    pub fn check(&self, caller_id: &str) -> Decision {
        let now = self.clock.now();

        trace!(caller = %caller_id, strategy = %self.strategy, "Checking admission");

        let decision = match &self.algorithm {
            Algorithm::Fixed(fixed) => fixed.check(caller_id, now),
            Algorithm::Sliding(sliding) => sliding.check(caller_id, now),
        };

        if !decision.admitted {
            debug!(
                caller = %caller_id,
                count = decision.count,
                limit = decision.limit,
                reset_after = ?decision.reset_after,
                "Rate limit exceeded"
            );
        }

        decision
    }

    /// Requests counted against `caller_id` in the current window.
    ///
    /// Does not record a request.
    pub fn current_count(&self, caller_id: &str) -> u64 {
        let now = self.clock.now();
        match &self.algorithm {
            Algorithm::Fixed(fixed) => fixed.current_count(caller_id, now),
            Algorithm::Sliding(sliding) => sliding.current_count(caller_id, now),
        }
    }

    /// Admissions left for `caller_id` in the current window.
    pub fn remaining(&self, caller_id: &str) -> u64 {
        self.limit.saturating_sub(self.current_count(caller_id))
    }

    /// Drop state for callers that no longer influence any decision.
    ///
    /// Returns the number of callers removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let removed = match &self.algorithm {
            Algorithm::Fixed(fixed) => fixed.purge_expired(now),
            Algorithm::Sliding(sliding) => sliding.purge_expired(now),
        };
        debug!(removed = removed, remaining = self.tracked_callers(), "Purged expired callers");
        removed
    }

    /// Number of callers with stored state.
    pub fn tracked_callers(&self) -> usize {
        match &self.algorithm {
            Algorithm::Fixed(fixed) => fixed.len(),
            Algorithm::Sliding(sliding) => sliding.len(),
        }
    }

    /// Drop all caller state.
    pub fn clear(&self) {
        match &self.algorithm {
            Algorithm::Fixed(fixed) => fixed.clear(),
            Algorithm::Sliding(sliding) => sliding.clear(),
        }
    }

    /// The configured quota.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// The configured window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// The algorithm this controller uses.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }
}

impl std::fmt::Debug for AdmissionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionController")
            .field("strategy", &self.strategy)
            .field("limit", &self.limit)
            .field("window", &self.window)
            .field("tracked_callers", &self.tracked_callers())
            .finish()
    }
}
