//! Fixed-capacity and time-windowed buffers.
//!
//! | Buffer | Capacity | When full | Age handling |
//! |--------|----------|-----------|--------------|
//! | [`RingBuffer`] | fixed | overwrites oldest | none |
//! | [`CircularQueue`] | fixed | rejects with `Full` | none |
//! | [`TimedRingBuffer`] | fixed | overwrites oldest | reads skip entries past `max_age` |
//! | [`SlidingWindowBuffer`] | unbounded | n/a | reads filter, background compaction |
//! | [`MetricsBuffer`] | fixed | overwrites oldest | none, aggregates on demand |
//!
//! [`CircularQueue`] is unsynchronized. The others each own a `parking_lot::RwLock`, and
//! the time-windowed ones run a [`Sweeper`](crate::sweeper::Sweeper) when built inside a
//! tokio runtime.

mod metrics;
mod queue;
mod ring;
mod sliding;
mod timed;

pub use metrics::{MetricStats, MetricsBuffer};
pub use queue::CircularQueue;
pub use ring::RingBuffer;
pub use sliding::SlidingWindowBuffer;
pub use timed::TimedRingBuffer;

use std::time::{Duration, Instant};

/// A value with the instant it was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedEntry<T> {
    pub value: T,
    pub captured_at: Instant,
}

impl<T> TimedEntry<T> {
    pub(crate) fn now(value: T) -> Self {
        Self {
            value,
            captured_at: Instant::now(),
        }
    }

    /// `true` while the entry is younger than `max_age` at `now`.
    pub fn is_fresh(&self, now: Instant, max_age: Duration) -> bool {
        now.saturating_duration_since(self.captured_at) < max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_freshness_boundary() {
        let entry = TimedEntry::now(());
        let at = entry.captured_at;

        assert!(entry.is_fresh(at, Duration::from_millis(10)));
        assert!(entry.is_fresh(at + Duration::from_millis(9), Duration::from_millis(10)));
        assert!(!entry.is_fresh(at + Duration::from_millis(10), Duration::from_millis(10)));
    }
}
