//! Guarded endpoint example.
//!
//! Routes simulated requests, limits each client, caches responses and trips a circuit
//! breaker when the backend starts failing.
//!
//! Run with:
//! ```
//! RUST_LOG=skp_primitives=debug cargo run --example guarded_endpoint
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use skp_primitives::{
    CircuitBreaker, CircuitBreakerConfig, CircuitState, KeyedLimiter, Limiter, LimiterConfig, MetricsBuffer,
    PathRouter, RadixTrie, TtlLruCache,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handler {
    Users,
    Search,
    Health,
}

const CLIENT_POLICY: &str = r#"{
    "kind": "all_of",
    "limiters": [
        { "kind": "token_bucket", "capacity": 5, "refill_rate": 5, "refill_period_ms": 1000 },
        { "kind": "sliding_window", "max_requests": 8, "window_ms": 10000 }
    ]
}"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let router = PathRouter::with_tree(RadixTrie::new());
    router.add_route("/api/users", Handler::Users);
    router.add_route("/api/search", Handler::Search);
    router.add_route("/health", Handler::Health);

    let policy: LimiterConfig = serde_json::from_str(CLIENT_POLICY)?;
    policy.build()?;
    let per_client = KeyedLimiter::new(move || {
        policy
            .build()
            .unwrap_or_else(|err| unreachable!("policy validated at startup: {err}"))
    });

    let responses = TtlLruCache::new(128, Duration::from_millis(500));
    let latencies = MetricsBuffer::new(256);
    let backend = Arc::new(CircuitBreaker::new(
        CircuitBreakerConfig::new(3, Duration::from_millis(200)).with_half_open_requests(1),
    ));

    println!("=== Guarded Endpoint Demo ===\n");

    let requests = [
        ("alice", "/api/users/1"),
        ("alice", "/api/users/1"),
        ("bob", "/api/search?q=rust"),
        ("carol", "/metrics"),
        ("alice", "/api/users/2"),
        ("alice", "/api/users/3"),
        ("alice", "/api/users/4"),
        ("alice", "/api/users/5"),
        ("bob", "/health"),
    ];

    for (tick, (client, path)) in requests.iter().enumerate() {
        let started = Instant::now();
        let outcome = serve(client, path, tick, &router, &per_client, &responses, &backend);
        latencies.record(started.elapsed().as_secs_f64() * 1_000.0);
        println!("{client:>6} {path:<22} -> {outcome}");
    }

    println!("\nBackend starts failing:");
    for attempt in 0..5 {
        let outcome = call_backend(&backend, false);
        println!("  attempt {attempt}: {outcome} (breaker {})", backend.state());
    }

    tokio::time::sleep(Duration::from_millis(250)).await;
    println!("\nAfter the reset timeout:");
    let outcome = call_backend(&backend, true);
    println!("  probe: {outcome} (breaker {})", backend.state());

    let stats = latencies.stats();
    println!(
        "\nServed {} requests, p50 {:.3}ms, p99 {:.3}ms, {} clients tracked",
        stats.count,
        stats.p50,
        stats.p99,
        per_client.len()
    );

    Ok(())
}

fn serve(
    client: &str,
    path: &str,
    tick: usize,
    router: &PathRouter<Handler, RadixTrie<Handler>>,
    per_client: &KeyedLimiter<String, Box<dyn Limiter>>,
    responses: &TtlLruCache<String, String>,
    backend: &CircuitBreaker,
) -> String {
    let Some(handler) = router.find_route(path.split('?').next().unwrap_or(path)) else {
        return "404 not found".to_string();
    };
    if handler == Handler::Health {
        return "200 ok".to_string();
    }
    if !per_client.allow(&client.to_string()) {
        warn!(client, path, "Client rate limited");
        return "429 too many requests".to_string();
    }
    if let Some(body) = responses.get(&path.to_string()) {
        return format!("200 {body} (cached)");
    }
    if !backend.allow() {
        return "503 backend unavailable".to_string();
    }

    backend.record_success();
    let body = format!("{handler:?}#{tick}");
    responses.put(path.to_string(), body.clone());
    info!(client, path, "Served from backend");
    format!("200 {body}")
}

fn call_backend(backend: &CircuitBreaker, healthy: bool) -> &'static str {
    if !backend.allow() {
        return "rejected";
    }
    if healthy {
        backend.record_success();
        "ok"
    } else {
        backend.record_failure();
        if backend.state() == CircuitState::Open { "failed, breaker opened" } else { "failed" }
    }
}
