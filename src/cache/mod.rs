//! LRU caches with optional time-to-live.
//!
//! Both caches pair a hash index with a doubly linked recency list, giving O(1) `get`,
//! `put` and eviction. The front of the list is the most recently touched entry; once
//! `capacity` is reached, a `put` of a new key evicts from the back.
//!
//! | Cache | Expiry | Background work |
//! |-------|--------|-----------------|
//! | [`LruCache`] | none | none |
//! | [`TtlLruCache`] | sliding, refreshed on put and hit | sweeper every `ttl / 2` |
//!
//! Each instance is guarded by one `parking_lot::RwLock`. `get` promotes its entry and
//! therefore takes the exclusive lock; `contains`, `len`, `peek` and `keys` use the shared
//! lock.
//!
//! # Example
//!
//! ```ignore
//! use skp_primitives::LruCache;
//!
//! let cache = LruCache::new(2);
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.get(&"a");
//! cache.put("c", 3); // evicts "b"
//!
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! ```

mod list;
mod ttl;

pub use ttl::TtlLruCache;

use std::hash::Hash;

use parking_lot::RwLock;
use tracing::trace;

use crate::error::{Result, ensure_capacity, or_panic};
use list::RecencyList;

/// Thread-safe least-recently-used cache.
pub struct LruCache<K, V> {
    inner: RwLock<RecencyList<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        or_panic(Self::try_new(capacity))
    }

    /// Try to create a cache, returning an error if `capacity` is 0.
    pub fn try_new(capacity: usize) -> Result<Self> {
        ensure_capacity("capacity", capacity)?;
        Ok(Self {
            inner: RwLock::new(RecencyList::new(capacity)),
        })
    }

    /// Get a value and mark it most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.write();
        inner.touch(key).map(|entry| entry.value.clone())
    }

    /// Get a value without changing its recency.
    pub fn peek(&self, key: &K) -> Option<V> {
        let inner = self.inner.read();
        inner.peek(key).map(|entry| entry.value.clone())
    }

    /// Insert or overwrite a value, marking it most recently used.
    ///
    /// Evicts the least recently used entry when a new key would exceed capacity.
    pub fn put(&self, key: K, value: V) {
        let mut inner = self.inner.write();
        if inner.insert(key, value, None).is_some() {
            trace!(len = inner.len(), "LRU cache evicted least recently used entry");
        }
    }

    /// Remove a key. Returns `true` if it was present.
    pub fn delete(&self, key: &K) -> bool {
        self.inner.write().remove(key).is_some()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.read().contains(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.read().capacity()
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<K> {
        self.inner.read().iter().map(|entry| entry.key.clone()).collect()
    }
}

impl<K, V> std::fmt::Debug for LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("LruCache")
            .field("len", &inner.len())
            .field("capacity", &inner.capacity())
            .finish()
    }
}
