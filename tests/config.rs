//! Integration tests for loading limiter configuration.

use std::collections::BTreeMap;

use skp_primitives::{ConfigError, LimiterConfig, PrimitiveError};
use tokio_test::{assert_err, assert_ok};

const POLICIES: &str = r#"{
    "login": { "kind": "sliding_window", "max_requests": 5, "window_ms": 60000 },
    "search": {
        "kind": "all_of",
        "limiters": [
            { "kind": "token_bucket", "capacity": 2, "refill_rate": 1, "refill_period_ms": 60000 },
            { "kind": "fixed_window", "max_requests": 100, "window_ms": 60000 }
        ]
    },
    "payments": { "kind": "circuit_breaker", "max_failures": 5, "reset_timeout_ms": 30000, "half_open_requests": 2 },
    "uploads": { "kind": "leaky_bucket", "capacity": 10, "leak_rate": 2, "leak_period_ms": 1000 }
}"#;

#[test]
fn test_load_named_policies() {
    let policies: BTreeMap<String, LimiterConfig> = assert_ok!(serde_json::from_str(POLICIES));
    let kinds: Vec<_> = policies.iter().map(|(name, config)| (name.as_str(), config.kind())).collect();
    assert_eq!(
        kinds,
        vec![
            ("login", "sliding_window"),
            ("payments", "circuit_breaker"),
            ("search", "all_of"),
            ("uploads", "leaky_bucket"),
        ]
    );

    for (name, config) in &policies {
        let limiter = assert_ok!(config.build());
        assert_eq!(limiter.name(), config.kind(), "{name}");
    }
}

#[test]
fn test_built_composite_enforces_tightest_member() {
    let policies: BTreeMap<String, LimiterConfig> = serde_json::from_str(POLICIES).unwrap();
    let search = assert_ok!(policies["search"].build());

    assert!(search.allow());
    assert!(search.allow());
    assert!(!search.allow());
}

#[test]
fn test_config_round_trips_through_json() {
    let policies: BTreeMap<String, LimiterConfig> = serde_json::from_str(POLICIES).unwrap();
    let json = serde_json::to_string(&policies).unwrap();
    let again: BTreeMap<String, LimiterConfig> = serde_json::from_str(&json).unwrap();
    assert_eq!(again, policies);
}

#[test]
fn test_invalid_values_surface_config_errors() {
    let zero_capacity: LimiterConfig = serde_json::from_str(
        r#"{ "kind": "token_bucket", "capacity": 0, "refill_rate": 1, "refill_period_ms": 1000 }"#,
    )
    .unwrap();
    let Err(err) = zero_capacity.build() else {
        panic!("zero capacity should be rejected");
    };
    assert!(matches!(err, PrimitiveError::Config(ConfigError::InvalidCapacity(_))));
    assert_eq!(err.to_string(), "Configuration error: Invalid capacity: capacity must be greater than 0");

    let nested: LimiterConfig = serde_json::from_str(
        r#"{ "kind": "all_of", "limiters": [ { "kind": "sliding_window", "max_requests": 1, "window_ms": 0 } ] }"#,
    )
    .unwrap();
    assert!(matches!(
        nested.build(),
        Err(PrimitiveError::Config(ConfigError::InvalidPeriod(_)))
    ));

    assert_err!(serde_json::from_str::<LimiterConfig>(r#"{ "kind": "token_bucket", "capacity": 1 }"#));
}
