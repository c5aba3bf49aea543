//! Serializable limiter configuration.
//!
//! Limiter parameters can be described as data, loaded from whatever format the
//! application uses, and turned into live limiters with [`LimiterConfig::build`].
//! Durations are plain millisecond counts.
//!
//! # Examples
//!
//! ```ignore
//! use skp_primitives::LimiterConfig;
//!
//! let config: LimiterConfig = serde_json::from_str(r#"{
//!     "kind": "all_of",
//!     "limiters": [
//!         { "kind": "token_bucket", "capacity": 20, "refill_rate": 10, "refill_period_ms": 1000 },
//!         { "kind": "fixed_window", "max_requests": 500, "window_ms": 60000 }
//!     ]
//! }"#)?;
//!
//! let limiter = config.build()?;
//! assert!(limiter.allow());
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result, ensure_capacity, ensure_period, ensure_threshold};
use crate::limiter::{
    AllOf, CircuitBreaker, FixedWindowCounter, LeakyBucket, Limiter, SlidingWindowCounter, TokenBucket,
};

/// Circuit breaker thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open a closed breaker.
    pub max_failures: u32,

    /// How long an open breaker rejects before probing, in milliseconds.
    pub reset_timeout_ms: u64,

    /// Probe budget in HalfOpen (defaults to `max(1, max_failures / 2)` if not set).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_open_requests: Option<u32>,
}

impl CircuitBreakerConfig {
    /// Create a configuration with the default probe budget.
    pub fn new(max_failures: u32, reset_timeout: Duration) -> Self {
        Self {
            max_failures,
            reset_timeout_ms: u64::try_from(reset_timeout.as_millis()).unwrap_or(u64::MAX),
            half_open_requests: None,
        }
    }

    /// Set the number of HalfOpen successes needed to close.
    pub fn with_half_open_requests(mut self, n: u32) -> Self {
        self.half_open_requests = Some(n);
        self
    }

    pub fn reset_timeout(&self) -> Duration {
        Duration::from_millis(self.reset_timeout_ms)
    }

    /// Probe budget, falling back to half of `max_failures` but never below 1.
    pub fn effective_half_open_requests(&self) -> u32 {
        self.half_open_requests.unwrap_or((self.max_failures / 2).max(1))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        ensure_threshold("max_failures", self.max_failures)?;
        ensure_period("reset_timeout", self.reset_timeout())?;
        if self.half_open_requests == Some(0) {
            return Err(ConfigError::InvalidThreshold("half_open_requests must be greater than 0".into()).into());
        }
        Ok(())
    }
}

/// Description of one limiter, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LimiterConfig {
    TokenBucket {
        capacity: u64,
        refill_rate: u64,
        refill_period_ms: u64,
    },
    LeakyBucket {
        capacity: u64,
        leak_rate: u64,
        leak_period_ms: u64,
    },
    FixedWindow {
        max_requests: u64,
        window_ms: u64,
    },
    SlidingWindow {
        max_requests: u64,
        window_ms: u64,
    },
    CircuitBreaker(CircuitBreakerConfig),
    /// Every inner limiter must admit.
    AllOf {
        limiters: Vec<LimiterConfig>,
    },
}

impl LimiterConfig {
    /// Limiter name this configuration builds.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TokenBucket { .. } => "token_bucket",
            Self::LeakyBucket { .. } => "leaky_bucket",
            Self::FixedWindow { .. } => "fixed_window",
            Self::SlidingWindow { .. } => "sliding_window",
            Self::CircuitBreaker(_) => "circuit_breaker",
            Self::AllOf { .. } => "all_of",
        }
    }

    /// Build the described limiter.
    ///
    /// A leaky bucket built inside a tokio runtime starts its drain task here.
    ///
    /// # Errors
    ///
    /// Returns [`PrimitiveError::Config`](crate::PrimitiveError::Config) for any invalid
    /// parameter, including an empty `all_of`.
    pub fn build(&self) -> Result<Box<dyn Limiter>> {
        let limiter: Box<dyn Limiter> = match self {
            Self::TokenBucket {
                capacity,
                refill_rate,
                refill_period_ms,
            } => Box::new(TokenBucket::try_new(
                *capacity,
                *refill_rate,
                Duration::from_millis(*refill_period_ms),
            )?),
            Self::LeakyBucket {
                capacity,
                leak_rate,
                leak_period_ms,
            } => Box::new(LeakyBucket::try_new(
                *capacity,
                *leak_rate,
                Duration::from_millis(*leak_period_ms),
            )?),
            Self::FixedWindow {
                max_requests,
                window_ms,
            } => Box::new(FixedWindowCounter::try_new(
                *max_requests,
                Duration::from_millis(*window_ms),
            )?),
            Self::SlidingWindow {
                max_requests,
                window_ms,
            } => Box::new(SlidingWindowCounter::try_new(
                *max_requests,
                Duration::from_millis(*window_ms),
            )?),
            Self::CircuitBreaker(config) => Box::new(CircuitBreaker::try_new(config.clone())?),
            Self::AllOf { limiters } => {
                ensure_capacity("limiters", limiters.len())?;
                let mut all = AllOf::new();
                for config in limiters {
                    all = all.push(Arc::from(config.build()?));
                }
                Box::new(all)
            }
        };
        Ok(limiter)
    }
}
