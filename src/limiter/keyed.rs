//! One limiter per key, created on first use.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;

use crate::limiter::Limiter;

type Factory<L> = Box<dyn Fn() -> L + Send + Sync>;

/// Per-key limiter map.
///
/// The factory builds a fresh limiter the first time a key is seen. Decisions for
/// different keys never contend on the same lock.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use skp_primitives::{KeyedLimiter, TokenBucket};
///
/// let per_user = KeyedLimiter::new(|| TokenBucket::new(10, 1, Duration::from_secs(1)));
///
/// if per_user.allow(&"user:123".to_string()) {
///     // handle the request
/// }
/// ```
pub struct KeyedLimiter<K, L> {
    limiters: DashMap<K, Arc<L>>,
    factory: Factory<L>,
}

impl<K, L> KeyedLimiter<K, L>
where
    K: Hash + Eq + Clone,
    L: Limiter,
{
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> L + Send + Sync + 'static,
    {
        Self {
            limiters: DashMap::new(),
            factory: Box::new(factory),
        }
    }

    /// Admit one unit for `key`.
    pub fn allow(&self, key: &K) -> bool {
        self.limiter_for(key).allow()
    }

    /// Admit `n` units for `key`.
    pub fn allow_n(&self, key: &K, n: u64) -> bool {
        self.limiter_for(key).allow_n(n)
    }

    /// The limiter for `key`, if one has been created.
    pub fn get(&self, key: &K) -> Option<Arc<L>> {
        self.limiters.get(key).map(|entry| entry.value().clone())
    }

    /// Drop the limiter for `key`. Returns `true` if one existed.
    ///
    /// The next request for `key` starts from a fresh limiter.
    pub fn remove(&self, key: &K) -> bool {
        self.limiters.remove(key).is_some()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.limiters.contains_key(key)
    }

    /// Number of keys with a limiter.
    pub fn len(&self) -> usize {
        self.limiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limiters.is_empty()
    }

    pub fn clear(&self) {
        self.limiters.clear();
    }

    /// Keep only the keys for which `keep` returns `true`.
    pub fn retain<F>(&self, mut keep: F)
    where
        F: FnMut(&K, &L) -> bool,
    {
        self.limiters.retain(|key, limiter| keep(key, &**limiter));
    }

    /// The shard lock is released before the limiter is consulted.
    fn limiter_for(&self, key: &K) -> Arc<L> {
        if let Some(existing) = self.get(key) {
            return existing;
        }
        self.limiters
            .entry(key.clone())
            .or_insert_with(|| Arc::new((self.factory)()))
            .clone()
    }
}

impl<K, L> std::fmt::Debug for KeyedLimiter<K, L>
where
    K: Hash + Eq,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedLimiter")
            .field("keys", &self.limiters.len())
            .finish()
    }
}
