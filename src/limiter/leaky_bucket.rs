//! Leaky Bucket rate limiting algorithm.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::trace;

use crate::buffer::CircularQueue;
use crate::error::{ConfigError, Result, ensure_capacity, ensure_period, ensure_threshold, or_panic};
use crate::limiter::{Limiter, whole_periods};
use crate::sweeper::Sweeper;

#[derive(Debug)]
struct LeakState {
    queue: CircularQueue<Instant>,
    last_leak: Instant,
}

impl LeakState {
    /// Remove up to `count` of the oldest queued requests.
    fn leak(&mut self, count: u64) -> u64 {
        let mut leaked = 0;
        while leaked < count && self.queue.dequeue().is_ok() {
            leaked += 1;
        }
        leaked
    }

    /// Apply the leaks for every whole period since `last_leak`.
    ///
    /// Both the background drain and the foreground path go through here, so each
    /// period is credited once no matter which side observes it first.
    fn catch_up(&mut self, now: Instant, leak_rate: u64, leak_period: Duration) -> u64 {
        let periods = whole_periods(now.saturating_duration_since(self.last_leak), leak_period);
        if periods == 0 {
            return 0;
        }
        let leaked = self.leak(periods.saturating_mul(leak_rate));

        let advance = leak_period.saturating_mul(u32::try_from(periods).unwrap_or(u32::MAX));
        self.last_leak = self.last_leak.checked_add(advance).unwrap_or(now);
        leaked
    }
}

/// Leaky Bucket rate limiting algorithm.
///
/// Requests join a queue of `capacity` slots and are admitted only while there is room.
/// The queue leaks `leak_rate` entries per `leak_period`, smoothing traffic to a
/// constant rate.
///
/// Draining runs as a background task when the bucket is built inside a tokio runtime.
/// Every call also applies leaks for whole periods the task has not yet covered, so
/// admission is correct when the task is late or absent.
pub struct LeakyBucket {
    capacity: u64,
    leak_rate: u64,
    leak_period: Duration,
    state: Arc<Mutex<LeakState>>,
    sweeper: Option<Sweeper>,
}

impl LeakyBucket {
    /// Create an empty bucket.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` or `leak_rate` is 0, or `leak_period` is zero.
    pub fn new(capacity: u64, leak_rate: u64, leak_period: Duration) -> Self {
        or_panic(Self::try_new(capacity, leak_rate, leak_period))
    }

    /// Try to create an empty bucket, returning an error if any parameter is zero.
    pub fn try_new(capacity: u64, leak_rate: u64, leak_period: Duration) -> Result<Self> {
        ensure_capacity("capacity", capacity)?;
        ensure_threshold("leak_rate", leak_rate)?;
        ensure_period("leak_period", leak_period)?;
        let slots = usize::try_from(capacity)
            .map_err(|_| ConfigError::InvalidCapacity(format!("capacity {capacity} exceeds address space")))?;

        let state = Arc::new(Mutex::new(LeakState {
            queue: CircularQueue::try_new(slots)?,
            last_leak: Instant::now(),
        }));

        let sweeper = Sweeper::spawn("leaky_bucket", leak_period, Arc::downgrade(&state), move |state| {
            let mut state = state.lock();
            let leaked = state.catch_up(Instant::now(), leak_rate, leak_period);
            if leaked > 0 {
                trace!(leaked, queued = state.queue.len(), "Leaky bucket drained");
            }
        });

        Ok(Self {
            capacity,
            leak_rate,
            leak_period,
            state,
            sweeper,
        })
    }

    /// Requests currently queued.
    pub fn len(&self) -> usize {
        let mut state = self.state.lock();
        state.catch_up(Instant::now(), self.leak_rate, self.leak_period);
        state.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn leak_rate(&self) -> u64 {
        self.leak_rate
    }

    pub fn leak_period(&self) -> Duration {
        self.leak_period
    }

    pub fn has_sweeper(&self) -> bool {
        self.sweeper.is_some()
    }
}

impl Limiter for LeakyBucket {
    fn allow_n(&self, n: u64) -> bool {
        let now = Instant::now();
        let mut state = self.state.lock();
        state.catch_up(now, self.leak_rate, self.leak_period);

        let queued = state.queue.len() as u64;
        if queued.saturating_add(n) > self.capacity {
            return false;
        }
        for _ in 0..n {
            if state.queue.enqueue(now).is_err() {
                break;
            }
        }
        true
    }

    fn name(&self) -> &'static str {
        "leaky_bucket"
    }
}

impl std::fmt::Debug for LeakyBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeakyBucket")
            .field("capacity", &self.capacity)
            .field("leak_rate", &self.leak_rate)
            .field("leak_period", &self.leak_period)
            .field("queued", &self.state.lock().queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaky_bucket_fills_to_capacity() {
        let bucket = LeakyBucket::new(3, 1, Duration::from_secs(60));
        assert!(!bucket.has_sweeper());

        assert!(bucket.allow());
        assert!(bucket.allow());
        assert!(bucket.allow());
        assert!(!bucket.allow());
        assert_eq!(bucket.len(), 3);
    }

    #[test]
    fn test_leaky_bucket_allow_n_is_all_or_nothing() {
        let bucket = LeakyBucket::new(5, 1, Duration::from_secs(60));
        assert!(bucket.allow_n(4));
        assert!(!bucket.allow_n(2));
        assert_eq!(bucket.len(), 4);
        assert!(bucket.allow_n(1));
    }

    #[test]
    fn test_foreground_catch_up_without_runtime() {
        let bucket = LeakyBucket::new(4, 2, Duration::from_millis(40));
        assert!(bucket.allow_n(4));
        assert!(!bucket.allow());

        std::thread::sleep(Duration::from_millis(55));
        assert_eq!(bucket.len(), 2);
        assert!(bucket.allow_n(2));
        assert!(!bucket.allow());
    }

    #[tokio::test]
    async fn test_background_drain() {
        let bucket = LeakyBucket::new(2, 1, Duration::from_millis(20));
        assert!(bucket.has_sweeper());
        assert!(bucket.allow());
        assert!(bucket.allow());
        assert!(!bucket.allow());

        tokio::time::sleep(Duration::from_millis(70)).await;
        assert!(bucket.is_empty());
        assert!(bucket.allow());
    }

    #[tokio::test]
    async fn test_late_tick_does_not_repeat_foreground_leak() {
        let bucket = LeakyBucket::new(1, 1, Duration::from_millis(50));
        assert!(bucket.allow());

        // Block the runtime past one period so the foreground leaks before the tick runs
        std::thread::sleep(Duration::from_millis(55));
        assert!(bucket.allow());

        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(!bucket.allow());
        assert_eq!(bucket.len(), 1);
    }

    #[test]
    fn test_invalid_params() {
        assert!(LeakyBucket::try_new(0, 1, Duration::from_secs(1)).is_err());
        assert!(LeakyBucket::try_new(1, 0, Duration::from_secs(1)).is_err());
        assert!(LeakyBucket::try_new(1, 1, Duration::ZERO).is_err());
    }
}
