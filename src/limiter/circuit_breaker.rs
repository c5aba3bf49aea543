//! Circuit breaker state machine.
//!
//! ```text
//!            failures >= max_failures
//!   Closed ───────────────────────────▶ Open
//!     ▲                                  │  ▲
//!     │ half_open_requests               │  │ any failure
//!     │ successes                        │  │
//!     │         reset_timeout elapsed    ▼  │
//!     └──────────────────────────────  HalfOpen
//! ```
//!
//! The breaker does not run the guarded work. Callers ask [`allow`](Limiter::allow)
//! before the call and report the outcome with [`record_success`](CircuitBreaker::record_success)
//! or [`record_failure`](CircuitBreaker::record_failure).

use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CircuitBreakerConfig;
use crate::error::{Result, or_panic};
use crate::limiter::Limiter;

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Requests flow; failures are counted.
    Closed,
    /// Requests are rejected until the reset timeout passes.
    Open,
    /// A limited number of probe requests are let through.
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half_open"),
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failures: u32,
    successes: u32,
    /// Probes admitted in HalfOpen whose outcome is not yet recorded.
    in_flight: u32,
    /// When the latest probe was admitted.
    last_probe: Option<Instant>,
    last_failure: Option<Instant>,
}

impl BreakerState {
    fn transition(&mut self, to: CircuitState) {
        debug!(from = %self.state, to = %to, failures = self.failures, "Circuit breaker transition");
        self.state = to;
        if to != CircuitState::Open {
            self.failures = 0;
            self.successes = 0;
            self.in_flight = 0;
            self.last_probe = None;
        }
    }

    fn admit_probe(&mut self, now: Instant) {
        self.in_flight += 1;
        self.last_probe = Some(now);
    }
}

/// Three-state failure isolation.
///
/// In HalfOpen, a probe budget of `half_open_requests` bounds the probes admitted plus
/// the outcomes already recorded, so with a budget of 1 exactly one probe is in flight
/// at a time after the reset timeout. Probes still unreported a full `reset_timeout`
/// after the latest admission are considered abandoned and release their slots.
#[derive(Debug)]
pub struct CircuitBreaker {
    max_failures: u32,
    reset_timeout: Duration,
    half_open_requests: u32,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    /// Create a closed breaker.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        or_panic(Self::try_new(config))
    }

    /// Try to create a closed breaker, validating `config` first.
    pub fn try_new(config: CircuitBreakerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            max_failures: config.max_failures,
            reset_timeout: config.reset_timeout(),
            half_open_requests: config.effective_half_open_requests(),
            state: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failures: 0,
                successes: 0,
                in_flight: 0,
                last_probe: None,
                last_failure: None,
            }),
        })
    }

    /// Current state, without applying the Open to HalfOpen timeout.
    pub fn state(&self) -> CircuitState {
        self.state.lock().state
    }

    /// Failures counted since the last transition into Closed or HalfOpen.
    pub fn failure_count(&self) -> u32 {
        self.state.lock().failures
    }

    /// Successes recorded in the current HalfOpen period.
    pub fn success_count(&self) -> u32 {
        self.state.lock().successes
    }

    pub fn max_failures(&self) -> u32 {
        self.max_failures
    }

    pub fn reset_timeout(&self) -> Duration {
        self.reset_timeout
    }

    pub fn half_open_requests(&self) -> u32 {
        self.half_open_requests
    }

    /// Report that a guarded call succeeded.
    pub fn record_success(&self) {
        let mut state = self.state.lock();
        match state.state {
            CircuitState::Closed => state.failures = 0,
            CircuitState::HalfOpen => {
                state.in_flight = state.in_flight.saturating_sub(1);
                state.successes += 1;
                if state.successes >= self.half_open_requests {
                    state.transition(CircuitState::Closed);
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Report that a guarded call failed.
    pub fn record_failure(&self) {
        let mut state = self.state.lock();
        state.failures = state.failures.saturating_add(1);
        state.last_failure = Some(Instant::now());

        match state.state {
            CircuitState::Closed if state.failures >= self.max_failures => {
                state.transition(CircuitState::Open);
            }
            CircuitState::HalfOpen => state.transition(CircuitState::Open),
            _ => {}
        }
    }

    /// Force the breaker back to Closed with cleared counters.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        if state.state != CircuitState::Closed {
            state.transition(CircuitState::Closed);
        }
        state.failures = 0;
        state.successes = 0;
        state.last_failure = None;
    }

    fn try_acquire(&self) -> bool {
        let now = Instant::now();
        let mut state = self.state.lock();
        match state.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let timed_out = state
                    .last_failure
                    .is_none_or(|at| now.saturating_duration_since(at) > self.reset_timeout);
                if timed_out {
                    state.transition(CircuitState::HalfOpen);
                    state.admit_probe(now);
                }
                timed_out
            }
            CircuitState::HalfOpen => {
                let abandoned = state
                    .last_probe
                    .is_some_and(|at| now.saturating_duration_since(at) > self.reset_timeout);
                if abandoned && state.in_flight > 0 {
                    debug!(abandoned = state.in_flight, "Circuit breaker released unreported probes");
                    state.in_flight = 0;
                }

                let used = state.successes + state.failures + state.in_flight;
                if used < self.half_open_requests {
                    state.admit_probe(now);
                    true
                } else {
                    false
                }
            }
        }
    }
}

impl Limiter for CircuitBreaker {
    /// Admission is a single decision; `n` only matters when it is 0.
    fn allow_n(&self, n: u64) -> bool {
        n == 0 || self.try_acquire()
    }

    fn name(&self) -> &'static str {
        "circuit_breaker"
    }
}
