//! Fixed Window rate limiting algorithm.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::error::{Result, ensure_capacity, ensure_period, or_panic};
use crate::limiter::Limiter;

#[derive(Debug)]
struct WindowState {
    count: u64,
    window_start: Instant,
}

/// Fixed Window rate limiting algorithm.
///
/// Counts admissions in a window of length `window`. The first call at or after
/// `window_start + window` resets the count and starts a new window at that instant,
/// so windows follow traffic rather than a wall-clock grid.
///
/// Bursts of up to twice `max_requests` are possible across a window boundary.
#[derive(Debug)]
pub struct FixedWindowCounter {
    max_requests: u64,
    window: Duration,
    state: Mutex<WindowState>,
}

impl FixedWindowCounter {
    /// # Panics
    ///
    /// Panics if `max_requests` is 0 or `window` is zero.
    pub fn new(max_requests: u64, window: Duration) -> Self {
        or_panic(Self::try_new(max_requests, window))
    }

    pub fn try_new(max_requests: u64, window: Duration) -> Result<Self> {
        ensure_capacity("max_requests", max_requests)?;
        ensure_period("window", window)?;

        Ok(Self {
            max_requests,
            window,
            state: Mutex::new(WindowState {
                count: 0,
                window_start: Instant::now(),
            }),
        })
    }

    /// Admissions in the current window; 0 once it has lapsed.
    pub fn count(&self) -> u64 {
        let state = self.state.lock();
        if state.window_start.elapsed() >= self.window {
            0
        } else {
            state.count
        }
    }

    pub fn max_requests(&self) -> u64 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Limiter for FixedWindowCounter {
    fn allow_n(&self, n: u64) -> bool {
        let now = Instant::now();
        let mut state = self.state.lock();

        if now.saturating_duration_since(state.window_start) >= self.window {
            state.window_start = now;
            state.count = 0;
        }

        if state.count.saturating_add(n) <= self.max_requests {
            state.count += n;
            true
        } else {
            false
        }
    }

    fn name(&self) -> &'static str {
        "fixed_window"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_window_basic() {
        let limiter = FixedWindowCounter::new(3, Duration::from_secs(60));

        for i in 1..=3 {
            assert!(limiter.allow(), "Request {} should be allowed", i);
        }
        assert!(!limiter.allow());
        assert_eq!(limiter.count(), 3);
    }

    #[test]
    fn test_denied_request_not_counted() {
        let limiter = FixedWindowCounter::new(5, Duration::from_secs(60));
        assert!(limiter.allow_n(4));
        assert!(!limiter.allow_n(2));
        assert_eq!(limiter.count(), 4);
        assert!(limiter.allow());
    }

    #[tokio::test]
    async fn test_fixed_window_reset() {
        let limiter = FixedWindowCounter::new(2, Duration::from_millis(50));
        assert!(limiter.allow());
        assert!(limiter.allow());
        assert!(!limiter.allow());

        tokio::time::sleep(Duration::from_millis(70)).await;
        assert_eq!(limiter.count(), 0);
        assert!(limiter.allow());
        assert_eq!(limiter.count(), 1);
    }

    #[test]
    fn test_invalid_params() {
        assert!(FixedWindowCounter::try_new(0, Duration::from_secs(1)).is_err());
        assert!(FixedWindowCounter::try_new(1, Duration::ZERO).is_err());
    }
}
