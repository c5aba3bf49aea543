//! LRU cache with sliding time-to-live and a background sweeper.

use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::trace;

use crate::cache::list::RecencyList;
use crate::error::{Result, ensure_capacity, ensure_period, or_panic};
use crate::sweeper::Sweeper;

/// LRU cache whose entries expire `ttl` after their last put or hit.
///
/// Expiry is checked on every read, so a stale entry is never returned regardless of
/// when the sweeper last ran. The sweeper scans from the least recently used end and
/// stops at the first live entry; the list is ordered by recency, not expiry, so it may
/// leave some expired entries in place until they are read or reach the back.
///
/// The sweeper runs on the tokio runtime current at construction. Built outside a
/// runtime, the cache works the same but only purges on read or via
/// [`purge_expired`](Self::purge_expired).
pub struct TtlLruCache<K, V> {
    inner: Arc<RwLock<RecencyList<K, V>>>,
    ttl: Duration,
    sweeper: Option<Sweeper>,
}

impl<K, V> TtlLruCache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache sweeping every `ttl / 2`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0 or `ttl` is zero.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        or_panic(Self::try_new(capacity, ttl))
    }

    /// Try to create a cache sweeping every `ttl / 2`.
    pub fn try_new(capacity: usize, ttl: Duration) -> Result<Self> {
        Self::try_with_sweep_interval(capacity, ttl, ttl / 2)
    }

    /// Try to create a cache with an explicit sweep interval.
    pub fn try_with_sweep_interval(capacity: usize, ttl: Duration, interval: Duration) -> Result<Self> {
        ensure_capacity("capacity", capacity)?;
        ensure_period("ttl", ttl)?;

        let inner = Arc::new(RwLock::new(RecencyList::new(capacity)));
        let sweeper = Sweeper::spawn("ttl_lru_cache", interval, Arc::downgrade(&inner), |state| {
            let mut list = state.write();
            let removed = sweep_expired(&mut *list, Instant::now());
            if removed > 0 {
                trace!(removed, "TTL cache sweep");
            }
        });

        Ok(Self { inner, ttl, sweeper })
    }

    /// Get a live value, mark it most recently used and extend its expiry.
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut inner = self.inner.write();

        if inner.peek(key)?.is_expired(now) {
            inner.remove(key);
            return None;
        }

        let entry = inner.touch(key)?;
        entry.expires_at = now.checked_add(self.ttl);
        Some(entry.value.clone())
    }

    /// Insert or overwrite a value with a fresh expiry.
    pub fn put(&self, key: K, value: V) {
        // Overflowing ttls never expire
        let expires_at = Instant::now().checked_add(self.ttl);
        let mut inner = self.inner.write();
        if inner.insert(key, value, expires_at).is_some() {
            trace!(len = inner.len(), "TTL cache evicted least recently used entry");
        }
    }

    /// Remove a key. Returns `true` if it was stored, live or not.
    pub fn delete(&self, key: &K) -> bool {
        self.inner.write().remove(key).is_some()
    }

    /// Check for a live entry without touching it.
    pub fn contains(&self, key: &K) -> bool {
        let now = Instant::now();
        self.inner
            .read()
            .peek(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.read().capacity()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether a background sweeper is running for this cache.
    pub fn has_sweeper(&self) -> bool {
        self.sweeper.is_some()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Live keys from most to least recently used.
    pub fn keys(&self) -> Vec<K> {
        let now = Instant::now();
        self.inner
            .read()
            .iter()
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.key.clone())
            .collect()
    }

    /// Run one sweep now. Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let mut list = self.inner.write();
        sweep_expired(&mut *list, Instant::now())
    }
}

/// Pop expired entries off the LRU end, stopping at the first live one.
fn sweep_expired<K, V>(list: &mut RecencyList<K, V>, now: Instant) -> usize
where
    K: Hash + Eq + Clone,
{
    let mut removed = 0;
    while list.back().is_some_and(|entry| entry.is_expired(now)) {
        list.pop_back();
        removed += 1;
    }
    removed
}

impl<K, V> std::fmt::Debug for TtlLruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("TtlLruCache")
            .field("len", &inner.len())
            .field("capacity", &inner.capacity())
            .field("ttl", &self.ttl)
            .field("sweeper", &self.sweeper.is_some())
            .finish()
    }
}
