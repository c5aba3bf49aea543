//! Integration tests for limiters and the circuit breaker.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use skp_primitives::{
    AllOf, CircuitBreaker, CircuitBreakerConfig, CircuitState, FixedWindowCounter, LeakyBucket, Limiter,
    SlidingWindowCounter, TokenBucket,
};

fn admitted(limiter: &dyn Limiter, attempts: usize) -> usize {
    (0..attempts).filter(|_| limiter.allow()).count()
}

#[test]
fn test_every_limiter_caps_a_burst() {
    let limiters: Vec<Box<dyn Limiter>> = vec![
        Box::new(TokenBucket::new(5, 1, Duration::from_secs(60))),
        Box::new(LeakyBucket::new(5, 1, Duration::from_secs(60))),
        Box::new(FixedWindowCounter::new(5, Duration::from_secs(60))),
        Box::new(SlidingWindowCounter::new(5, Duration::from_secs(60))),
    ];

    for limiter in &limiters {
        assert_eq!(admitted(limiter.as_ref(), 20), 5, "{} should admit 5", limiter.name());
    }
}

#[tokio::test]
async fn test_token_bucket_refills() {
    let bucket = TokenBucket::new(4, 2, Duration::from_millis(30));
    assert!(bucket.allow_n(4));
    assert!(!bucket.allow());

    tokio::time::sleep(Duration::from_millis(45)).await;
    assert_eq!(bucket.available_tokens(), 2);
    assert!(bucket.allow_n(2));
    assert!(!bucket.allow());
}

#[tokio::test]
async fn test_leaky_bucket_drains_in_background() {
    let bucket = LeakyBucket::new(3, 3, Duration::from_millis(20));
    assert!(bucket.has_sweeper());
    assert!(bucket.allow_n(3));
    assert!(!bucket.allow());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(bucket.is_empty());
    assert!(bucket.allow_n(3));
}

#[tokio::test]
async fn test_fixed_window_boundary_burst() {
    let window = FixedWindowCounter::new(3, Duration::from_millis(40));
    assert_eq!(admitted(&window, 5), 3);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(window.count(), 0);
    assert_eq!(admitted(&window, 5), 3);
}

#[tokio::test]
async fn test_sliding_window_has_no_boundary_burst() {
    let window = SlidingWindowCounter::new(3, Duration::from_millis(60));
    assert!(window.allow());
    tokio::time::sleep(Duration::from_millis(35)).await;
    assert!(window.allow_n(2));
    assert!(!window.allow());

    // First request leaves the window, the later two still count
    tokio::time::sleep(Duration::from_millis(35)).await;
    assert_eq!(window.count(), 2);
    assert!(window.allow());
    assert!(!window.allow());
}

#[tokio::test]
async fn test_circuit_breaker_full_cycle() {
    let breaker = CircuitBreaker::new(
        CircuitBreakerConfig::new(3, Duration::from_millis(30)).with_half_open_requests(2),
    );

    for _ in 0..3 {
        assert!(breaker.allow());
        breaker.record_failure();
    }
    assert_eq!(breaker.state(), CircuitState::Open);
    assert!(!breaker.allow());

    tokio::time::sleep(Duration::from_millis(45)).await;
    assert!(breaker.allow());
    assert_eq!(breaker.state(), CircuitState::HalfOpen);
    assert!(breaker.allow());
    assert!(!breaker.allow(), "probe budget is spent");

    breaker.record_success();
    breaker.record_success();
    assert_eq!(breaker.state(), CircuitState::Closed);
}

#[tokio::test]
async fn test_half_open_admits_one_probe_under_contention() {
    let breaker = Arc::new(CircuitBreaker::new(
        CircuitBreakerConfig::new(1, Duration::from_millis(20)).with_half_open_requests(1),
    ));
    breaker.record_failure();
    tokio::time::sleep(Duration::from_millis(35)).await;

    let probes = Arc::new(AtomicU64::new(0));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let breaker = breaker.clone();
            let probes = probes.clone();
            std::thread::spawn(move || {
                if breaker.allow() {
                    probes.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(probes.load(Ordering::SeqCst), 1);
}

#[cfg(feature = "keyed")]
#[tokio::test]
async fn test_leaky_bucket_interleaved_drains_stay_within_capacity() {
    let period = Duration::from_millis(50);
    let bucket = LeakyBucket::new(1, 1, period);
    let mut total = usize::from(bucket.allow());

    // The runtime is blocked past a period: the foreground leaks first and the
    // overdue drain tick runs afterwards.
    std::thread::sleep(Duration::from_millis(55));
    total += usize::from(bucket.allow());
    tokio::task::yield_now().await;
    tokio::time::sleep(Duration::from_millis(2)).await;
    total += usize::from(bucket.allow());

    // Capacity plus one whole leaked period.
    assert_eq!(total, 2);
}

#[tokio::test]
async fn test_half_open_recovers_when_a_chain_denies_the_probe() {
    let breaker = Arc::new(CircuitBreaker::new(
        CircuitBreakerConfig::new(1, Duration::from_millis(20)).with_half_open_requests(1),
    ));
    let exhausted = Arc::new(TokenBucket::new(1, 1, Duration::from_secs(3600)));
    assert!(exhausted.allow());
    let chain = AllOf::new().push(breaker.clone()).push(exhausted);

    breaker.record_failure();
    tokio::time::sleep(Duration::from_millis(30)).await;

    // The breaker admits the probe, the bucket denies it, and no outcome is reported
    assert!(!chain.allow());
    assert_eq!(breaker.state(), CircuitState::HalfOpen);
    assert!(!breaker.allow());

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(breaker.allow());
    breaker.record_success();
    assert_eq!(breaker.state(), CircuitState::Closed);
}

#[test]
fn test_per_key_chain_shares_a_global_cap() {
    use skp_primitives::KeyedLimiter;

    let global = Arc::new(FixedWindowCounter::new(3, Duration::from_secs(60)));
    let shared = global.clone();
    let per_user = KeyedLimiter::new(move || {
        AllOf::new()
            .push(Arc::new(TokenBucket::new(2, 1, Duration::from_secs(60))))
            .push(shared.clone())
    });

    let served: Vec<_> = ["ann", "ann", "ann", "bob", "bob"]
        .into_iter()
        .filter(|user| per_user.allow(user))
        .collect();

    assert_eq!(served, vec!["ann", "ann", "bob"]);
    assert_eq!(global.count(), 3);
    assert_eq!(per_user.len(), 2);
}
