//! Ring buffer whose reads skip entries older than a maximum age.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::trace;

use crate::buffer::TimedEntry;
use crate::buffer::ring::Ring;
use crate::error::{Result, ensure_capacity, ensure_period, or_panic};
use crate::sweeper::Sweeper;

/// Fixed-capacity buffer of timestamped values.
///
/// Stale entries are not removed; they age out by being overwritten. The background sweep
/// only counts stale and live entries and emits them as a `trace` event.
pub struct TimedRingBuffer<T> {
    inner: Arc<RwLock<Ring<TimedEntry<T>>>>,
    max_age: Duration,
    sweeper: Option<Sweeper>,
}

impl<T> TimedRingBuffer<T>
where
    T: Send + Sync + 'static,
{
    /// Create a buffer whose reads return entries younger than `max_age`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0 or `max_age` is zero.
    pub fn new(capacity: usize, max_age: Duration) -> Self {
        or_panic(Self::try_new(capacity, max_age))
    }

    /// Try to create a buffer. The sweep interval is `max_age / 2`.
    pub fn try_new(capacity: usize, max_age: Duration) -> Result<Self> {
        ensure_capacity("capacity", capacity)?;
        ensure_period("max_age", max_age)?;

        let inner = Arc::new(RwLock::new(Ring::with_capacity(capacity)));
        let sweeper = Sweeper::spawn(
            "timed_ring_buffer",
            max_age / 2,
            Arc::downgrade(&inner),
            move |state| {
                let (stale, live) = count_by_age(&*state.read(), Instant::now(), max_age);
                trace!(stale, live, "Timed buffer sweep");
            },
        );

        Ok(Self {
            inner,
            max_age,
            sweeper,
        })
    }

    /// Append a value stamped with the current time.
    pub fn write(&self, value: T) {
        self.inner.write().push_overwrite(TimedEntry::now(value));
    }

    /// Number of stored entries that are already past `max_age`.
    pub fn stale_count(&self) -> usize {
        count_by_age(&*self.inner.read(), Instant::now(), self.max_age).0
    }

    /// Number of stored entries, stale or not.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.read().capacity()
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub fn has_sweeper(&self) -> bool {
        self.sweeper.is_some()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

impl<T> TimedRingBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Values younger than `max_age`, oldest first.
    pub fn read_valid(&self) -> Vec<T> {
        let now = Instant::now();
        self.inner
            .read()
            .iter()
            .filter(|entry| entry.is_fresh(now, self.max_age))
            .map(|entry| entry.value.clone())
            .collect()
    }

    /// Fresh entries with their capture times, oldest first.
    pub fn read_valid_entries(&self) -> Vec<TimedEntry<T>> {
        let now = Instant::now();
        self.inner
            .read()
            .iter()
            .filter(|entry| entry.is_fresh(now, self.max_age))
            .cloned()
            .collect()
    }
}

fn count_by_age<T>(ring: &Ring<TimedEntry<T>>, now: Instant, max_age: Duration) -> (usize, usize) {
    let live = ring.iter().filter(|entry| entry.is_fresh(now, max_age)).count();
    (ring.len() - live, live)
}

impl<T> std::fmt::Debug for TimedRingBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("TimedRingBuffer")
            .field("len", &inner.len())
            .field("capacity", &inner.capacity())
            .field("max_age", &self.max_age)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_valid_skips_stale() {
        let buffer = TimedRingBuffer::new(8, Duration::from_millis(40));
        buffer.write("old");
        std::thread::sleep(Duration::from_millis(60));
        buffer.write("new");

        assert_eq!(buffer.read_valid(), vec!["new"]);
        assert_eq!(buffer.stale_count(), 1);
        // Stale entries stay until overwritten.
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_overwrite_still_applies() {
        let buffer = TimedRingBuffer::new(2, Duration::from_secs(60));
        buffer.write(1);
        buffer.write(2);
        buffer.write(3);

        assert_eq!(buffer.read_valid(), vec![2, 3]);
        let entries = buffer.read_valid_entries();
        assert!(entries[0].captured_at <= entries[1].captured_at);
    }

    #[test]
    fn test_invalid_params() {
        assert!(TimedRingBuffer::<u8>::try_new(0, Duration::from_secs(1)).is_err());
        assert!(TimedRingBuffer::<u8>::try_new(4, Duration::ZERO).is_err());
    }

    #[tokio::test]
    async fn test_sweep_leaves_entries_in_place() {
        let buffer = TimedRingBuffer::new(4, Duration::from_millis(20));
        assert!(buffer.has_sweeper());
        buffer.write(1);
        buffer.write(2);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.stale_count(), 2);
        assert!(buffer.read_valid().is_empty());
    }
}
