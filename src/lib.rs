//! In-memory data structures and resource-control primitives for Rust services.
//!
//! `skp_primitives` collects the building blocks a service reaches for when it must
//! bound work, remember recent state, or route by prefix:
//!
//! - **Heaps**: comparator-driven binary heap, indexed heap, priority queue
//! - **Caches**: O(1) LRU cache and an LRU cache with sliding time-to-live
//! - **Buffers**: overwrite-oldest ring, bounded queue, age-filtered and metrics buffers
//! - **Limiters**: token bucket, leaky bucket, fixed and sliding window counters, circuit
//!   breaker, plus composite and per-key limiters
//! - **Tries**: character trie, radix trie and a longest-prefix path router
//!
//! # Quick Start
//!
//! ```ignore
//! use skp_primitives::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Sessions expire five minutes after their last use
//!     let sessions = TtlLruCache::new(10_000, Duration::from_secs(300));
//!     sessions.put("session:abc".to_string(), 42u64);
//!
//!     // Ten requests per second with bursts of twenty
//!     let limiter = TokenBucket::new(20, 10, Duration::from_secs(1));
//!     if limiter.allow() {
//!         println!("served user {:?}", sessions.get(&"session:abc".to_string()));
//!     }
//! }
//! ```
//!
//! # Structures
//!
//! | Structure | Synchronization | Background work |
//! |-----------|-----------------|-----------------|
//! | [`Heap`], [`IndexedHeap`], [`PriorityQueue`] | none (`&mut self`) | none |
//! | [`CircularQueue`] | none (`&mut self`) | none |
//! | [`LruCache`], [`RingBuffer`], [`MetricsBuffer`] | `parking_lot::RwLock` | none |
//! | [`TtlLruCache`], [`TimedRingBuffer`], [`SlidingWindowBuffer`] | `parking_lot::RwLock` | sweeper on the ambient tokio runtime |
//! | [`TokenBucket`], [`FixedWindowCounter`], [`SlidingWindowCounter`], [`CircuitBreaker`] | `parking_lot::Mutex` | none |
//! | [`LeakyBucket`] | `parking_lot::Mutex` | drain task on the ambient tokio runtime |
//! | [`Trie`], [`RadixTrie`] | `parking_lot::RwLock` | none |
//!
//! Structures with background work start it only when constructed inside a tokio
//! runtime, and stop it when dropped. Without a runtime they stay correct: reads
//! re-check age on every call.
//!
//! # Feature Flags
//!
//! - `keyed` (default): [`KeyedLimiter`], a per-key limiter map backed by `dashmap`

pub mod buffer;
pub mod cache;
pub mod config;
pub mod error;
pub mod heap;
pub mod limiter;
pub mod sweeper;
pub mod trie;

// Re-export main types
pub use buffer::{
    CircularQueue, MetricStats, MetricsBuffer, RingBuffer, SlidingWindowBuffer, TimedEntry, TimedRingBuffer,
};
pub use cache::{LruCache, TtlLruCache};
pub use config::{CircuitBreakerConfig, LimiterConfig};
pub use error::{ConfigError, PrimitiveError, Result};
pub use heap::{Heap, IndexedHeap, PqItem, PriorityQueue};
pub use trie::{PathRouter, PrefixTree, RadixTrie, Trie};

// Re-export limiters
pub use limiter::{
    AllOf, CircuitBreaker, CircuitState, FixedWindowCounter, LeakyBucket, Limiter, SlidingWindowCounter, TokenBucket,
};

#[cfg(feature = "keyed")]
pub use limiter::KeyedLimiter;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::cache::{LruCache, TtlLruCache};
    pub use crate::error::{PrimitiveError, Result};
    pub use crate::heap::{Heap, PriorityQueue};
    pub use crate::limiter::{
        AllOf, CircuitBreaker, CircuitState, FixedWindowCounter, LeakyBucket, Limiter, SlidingWindowCounter,
        TokenBucket,
    };
    pub use crate::trie::{PrefixTree, RadixTrie, Trie};
    pub use crate::{CircuitBreakerConfig, LimiterConfig, RingBuffer};

    #[cfg(feature = "keyed")]
    pub use crate::limiter::KeyedLimiter;
}
