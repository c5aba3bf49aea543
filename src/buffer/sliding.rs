//! Unbounded buffer holding values from the last time window.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::trace;

use crate::buffer::TimedEntry;
use crate::error::{Result, ensure_period, or_panic};
use crate::sweeper::Sweeper;

/// Buffer of values added within the last `window`.
///
/// Entries are appended in time order, so compaction pops from the front until it meets a
/// fresh entry. Reads filter by age on their own and are correct between compactions.
pub struct SlidingWindowBuffer<T> {
    inner: Arc<RwLock<VecDeque<TimedEntry<T>>>>,
    window: Duration,
    sweeper: Option<Sweeper>,
}

impl<T> SlidingWindowBuffer<T>
where
    T: Send + Sync + 'static,
{
    /// Create a buffer over `window`.
    ///
    /// # Panics
    ///
    /// Panics if `window` is zero.
    pub fn new(window: Duration) -> Self {
        or_panic(Self::try_new(window))
    }

    /// Try to create a buffer. Compaction runs every `window / 10`.
    pub fn try_new(window: Duration) -> Result<Self> {
        ensure_period("window", window)?;

        let inner = Arc::new(RwLock::new(VecDeque::new()));
        let sweeper = Sweeper::spawn(
            "sliding_window_buffer",
            window / 10,
            Arc::downgrade(&inner),
            move |state| {
                let removed = compact_front(&mut *state.write(), Instant::now(), window);
                if removed > 0 {
                    trace!(removed, "Sliding window compacted");
                }
            },
        );

        Ok(Self {
            inner,
            window,
            sweeper,
        })
    }

    /// Append a value stamped with the current time.
    pub fn add(&self, value: T) {
        self.inner.write().push_back(TimedEntry::now(value));
    }

    /// Number of values inside the window.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.inner
            .read()
            .iter()
            .filter(|entry| entry.is_fresh(now, self.window))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries held in memory, including ones awaiting compaction.
    pub fn stored_len(&self) -> usize {
        self.inner.read().len()
    }

    /// Drop entries that have left the window. Returns how many were removed.
    pub fn compact(&self) -> usize {
        compact_front(&mut *self.inner.write(), Instant::now(), self.window)
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn has_sweeper(&self) -> bool {
        self.sweeper.is_some()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

impl<T> SlidingWindowBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Values inside the window, oldest first.
    pub fn get_window(&self) -> Vec<T> {
        let now = Instant::now();
        self.inner
            .read()
            .iter()
            .filter(|entry| entry.is_fresh(now, self.window))
            .map(|entry| entry.value.clone())
            .collect()
    }
}

fn compact_front<T>(entries: &mut VecDeque<TimedEntry<T>>, now: Instant, window: Duration) -> usize {
    let mut removed = 0;
    while entries.front().is_some_and(|entry| !entry.is_fresh(now, window)) {
        entries.pop_front();
        removed += 1;
    }
    removed
}

impl<T> std::fmt::Debug for SlidingWindowBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlidingWindowBuffer")
            .field("stored", &self.inner.read().len())
            .field("window", &self.window)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_filters_without_compaction() {
        let buffer = SlidingWindowBuffer::new(Duration::from_millis(40));
        assert!(!buffer.has_sweeper());

        buffer.add(1);
        buffer.add(2);
        std::thread::sleep(Duration::from_millis(60));
        buffer.add(3);

        assert_eq!(buffer.get_window(), vec![3]);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.stored_len(), 3);
    }

    #[test]
    fn test_compact_removes_only_stale() {
        let buffer = SlidingWindowBuffer::new(Duration::from_millis(40));
        buffer.add("a");
        std::thread::sleep(Duration::from_millis(60));
        buffer.add("b");

        assert_eq!(buffer.compact(), 1);
        assert_eq!(buffer.stored_len(), 1);
        assert_eq!(buffer.compact(), 0);
        assert_eq!(buffer.get_window(), vec!["b"]);
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(SlidingWindowBuffer::<u8>::try_new(Duration::ZERO).is_err());
    }

    #[tokio::test]
    async fn test_background_compaction() {
        let buffer = SlidingWindowBuffer::new(Duration::from_millis(30));
        assert!(buffer.has_sweeper());
        for v in 0..10 {
            buffer.add(v);
        }

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(buffer.stored_len(), 0);
        assert!(buffer.is_empty());
    }
}
