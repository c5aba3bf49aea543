//! Token Bucket rate limiting algorithm.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::error::{Result, ensure_capacity, ensure_period, ensure_threshold, or_panic};
use crate::limiter::{Limiter, whole_periods};

#[derive(Debug)]
struct BucketState {
    tokens: u64,
    last_refill: Instant,
}

/// Token Bucket rate limiting algorithm.
///
/// Allows controlled bursts while enforcing an average rate limit.
/// `refill_rate` tokens are added per whole `refill_period` elapsed, up to `capacity`.
/// Refill is computed lazily on each call; there is no background timer.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: u64,
    refill_rate: u64,
    refill_period: Duration,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Create a full bucket.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` or `refill_rate` is 0, or `refill_period` is zero.
    pub fn new(capacity: u64, refill_rate: u64, refill_period: Duration) -> Self {
        or_panic(Self::try_new(capacity, refill_rate, refill_period))
    }

    /// Try to create a full bucket, returning an error if any parameter is zero.
    pub fn try_new(capacity: u64, refill_rate: u64, refill_period: Duration) -> Result<Self> {
        ensure_capacity("capacity", capacity)?;
        ensure_threshold("refill_rate", refill_rate)?;
        ensure_period("refill_period", refill_period)?;

        Ok(Self {
            capacity,
            refill_rate,
            refill_period,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        })
    }

    /// Tokens available right now, after applying any pending refill.
    pub fn available_tokens(&self) -> u64 {
        let mut state = self.state.lock();
        self.refill(&mut state, Instant::now());
        state.tokens
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn refill_rate(&self) -> u64 {
        self.refill_rate
    }

    pub fn refill_period(&self) -> Duration {
        self.refill_period
    }

    /// Add tokens for every whole period since the last refill.
    ///
    /// `last_refill` only moves when tokens are actually added, so partial periods
    /// accumulate across calls.
    fn refill(&self, state: &mut BucketState, now: Instant) {
        let periods = whole_periods(now.saturating_duration_since(state.last_refill), self.refill_period);
        let to_add = periods.saturating_mul(self.refill_rate);
        if to_add > 0 {
            state.tokens = state.tokens.saturating_add(to_add).min(self.capacity);
            state.last_refill = now;
        }
    }
}

impl Limiter for TokenBucket {
    fn allow_n(&self, n: u64) -> bool {
        let mut state = self.state.lock();
        self.refill(&mut state, Instant::now());

        if state.tokens >= n {
            state.tokens -= n;
            true
        } else {
            false
        }
    }

    fn name(&self) -> &'static str {
        "token_bucket"
    }
}
