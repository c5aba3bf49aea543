//! Sliding Window rate limiting algorithm.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::error::{Result, ensure_capacity, ensure_period, or_panic};
use crate::limiter::Limiter;

/// Sliding Window rate limiting algorithm.
///
/// Keeps the timestamp of every admission within the last `window` and admits while
/// fewer than `max_requests` remain. An `allow_n` call is logged once with its weight,
/// so memory grows with the number of admitted calls, in exchange for no boundary bursts.
#[derive(Debug)]
pub struct SlidingWindowCounter {
    max_requests: u64,
    window: Duration,
    log: Mutex<AdmissionLog>,
}

#[derive(Debug, Default)]
struct AdmissionLog {
    batches: VecDeque<(Instant, u64)>,
    /// Sum of the weights in `batches`.
    admitted: u64,
}

impl AdmissionLog {
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&(at, weight)) = self.batches.front() {
            if in_window(at, now, window) {
                break;
            }
            self.batches.pop_front();
            self.admitted -= weight;
        }
    }
}

impl SlidingWindowCounter {
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
            log: Mutex::new(AdmissionLog::default()),
        })
    }

    /// Admissions within the last `window`.
    pub fn count(&self) -> u64 {
        let now = Instant::now();
        self.log
            .lock()
            .batches
            .iter()
            .filter(|(at, _)| in_window(*at, now, self.window))
            .map(|(_, weight)| weight)
            .sum()
    }

    pub fn max_requests(&self) -> u64 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

/// A timestamp exactly `window` old has left the window.
fn in_window(at: Instant, now: Instant, window: Duration) -> bool {
    now.saturating_duration_since(at) < window
}

impl Limiter for SlidingWindowCounter {
    fn allow_n(&self, n: u64) -> bool {
        let now = Instant::now();
        let mut log = self.log.lock();

        log.prune(now, self.window);

        if log.admitted.saturating_add(n) > self.max_requests {
            return false;
        }
        if n > 0 {
            log.batches.push_back((now, n));
            log.admitted += n;
        }
        true
    }

    fn name(&self) -> &'static str {
        "sliding_window"
    }
}
