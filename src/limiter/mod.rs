//! Admission control primitives.
//!
//! Every limiter implements [`Limiter`]: a non-blocking yes/no decision for one or `n`
//! units of work. Limiters own their state behind a `parking_lot::Mutex` and are shared by
//! reference or through `Arc`.
//!
//! # Available Limiters
//!
//! | Limiter | State | Burst | Best For |
//! |---------|-------|-------|----------|
//! | [`TokenBucket`] | token count + last refill | up to capacity | bursty traffic with an average rate |
//! | [`LeakyBucket`] | bounded queue, drained per period | up to capacity | constant drain rate |
//! | [`FixedWindowCounter`] | counter + window start | 2x at window edges | simple quotas |
//! | [`SlidingWindowCounter`] | timestamp log | none | precise quotas |
//! | [`CircuitBreaker`] | three-state machine | n/a | isolating a failing dependency |
//!
//! [`AllOf`] requires every inner limiter to admit, and [`KeyedLimiter`] (behind the
//! `keyed` feature) keeps one limiter per key.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use skp_primitives::{AllOf, FixedWindowCounter, Limiter, TokenBucket};
//!
//! let limiter = AllOf::new()
//!     .push(Arc::new(TokenBucket::new(10, 5, Duration::from_secs(1))))
//!     .push(Arc::new(FixedWindowCounter::new(100, Duration::from_secs(60))));
//!
//! if limiter.allow() {
//!     // handle the request
//! }
//! ```

mod circuit_breaker;
mod composite;
mod fixed_window;
#[cfg(feature = "keyed")]
mod keyed;
mod leaky_bucket;
mod sliding_window;
mod token_bucket;

pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use composite::AllOf;
pub use fixed_window::FixedWindowCounter;
#[cfg(feature = "keyed")]
pub use keyed::KeyedLimiter;
pub use leaky_bucket::LeakyBucket;
pub use sliding_window::SlidingWindowCounter;
pub use token_bucket::TokenBucket;

use std::sync::Arc;

/// Non-blocking admission decision.
///
/// Implementations must be thread-safe. A denied call leaves the limiter's state as it
/// would be had the call not been made, apart from time-based bookkeeping such as refills.
pub trait Limiter: Send + Sync {
    /// Admit a single unit of work.
    fn allow(&self) -> bool {
        self.allow_n(1)
    }

    /// Admit `n` units at once, or none of them.
    fn allow_n(&self, n: u64) -> bool;

    /// Limiter name (for logging).
    fn name(&self) -> &'static str;
}

impl<L: Limiter + ?Sized> Limiter for Arc<L> {
    fn allow(&self) -> bool {
        (**self).allow()
    }

    fn allow_n(&self, n: u64) -> bool {
        (**self).allow_n(n)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<L: Limiter + ?Sized> Limiter for Box<L> {
    fn allow(&self) -> bool {
        (**self).allow()
    }

    fn allow_n(&self, n: u64) -> bool {
        (**self).allow_n(n)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Number of whole `period`s in `elapsed`.
pub(crate) fn whole_periods(elapsed: std::time::Duration, period: std::time::Duration) -> u64 {
    (elapsed.as_nanos() / period.as_nanos().max(1)).min(u64::MAX as u128) as u64
}
