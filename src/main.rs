//! Coalesce Cache demo
//!
//! Fires a stampede of concurrent lookups at a slow computation and reports
//! how the cache absorbed them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coalesce_cache::{spawn_cleanup_task, CoalescingCache, Config, Lookup};

/// Number of distinct keys the demo workers spread their lookups over.
const HOT_KEYS: usize = 4;

/// Simulated backend latency.
const BACKEND_LATENCY: Duration = Duration::from_millis(100);

type DemoCache = CoalescingCache<String, u64, String>;

/// Entry point for the demo.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Create the cache and, if a TTL is set, the cleanup task
/// 4. Run two stampede rounds against a slow backend
/// 5. Print final statistics as JSON
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coalesce_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Coalesce Cache demo");

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_entries={}, ttl={}s, cleanup_interval={}s, workers={}",
        config.max_entries, config.ttl, config.cleanup_interval, config.demo_workers
    );

    let cache = Arc::new(DemoCache::from_config(&config).context("invalid cache configuration")?);
    let cleanup_handle = config
        .ttl()
        .map(|_| spawn_cleanup_task(cache.clone(), config.cleanup_interval));

    let backend_calls = Arc::new(AtomicU64::new(0));

    tokio::select! {
        result = run_rounds(&cache, &backend_calls, config.demo_workers) => result?,
        _ = shutdown_signal() => warn!("Demo interrupted"),
    }

    if let Some(handle) = cleanup_handle {
        handle.abort();
    }

    let stats = cache.stats();
    info!(
        "Backend called {} times, hit rate {:.2}",
        backend_calls.load(Ordering::SeqCst),
        stats.hit_rate()
    );
    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}

/// Runs a cold round (every key missing) followed by a warm round.
async fn run_rounds(
    cache: &Arc<DemoCache>,
    backend_calls: &Arc<AtomicU64>,
    workers: usize,
) -> anyhow::Result<()> {
    for round in ["cold", "warm"] {
        let started = Instant::now();
        let outcomes = stampede(cache, backend_calls, workers).await?;

        let count = |wanted: Lookup| outcomes.iter().filter(|o| **o == wanted).count();
        info!(
            "{} round: {} lookups in {:?} (computed={}, joined={}, hits={})",
            round,
            outcomes.len(),
            started.elapsed(),
            count(Lookup::Computed),
            count(Lookup::Joined),
            count(Lookup::Hit)
        );
    }
    Ok(())
}

/// Issues `workers` concurrent lookups spread over the hot keys.
async fn stampede(
    cache: &Arc<DemoCache>,
    backend_calls: &Arc<AtomicU64>,
    workers: usize,
) -> anyhow::Result<Vec<Lookup>> {
    let mut handles = Vec::with_capacity(workers);
    for worker in 0..workers {
        let cache = Arc::clone(cache);
        let backend_calls = Arc::clone(backend_calls);
        let key = format!("item:{}", worker % HOT_KEYS);

        handles.push(tokio::spawn(async move {
            let (result, outcome) = cache
                .get_with_outcome(key, || slow_backend(backend_calls))
                .await;
            if let Err(e) = result {
                warn!("Lookup failed: {}", e);
            }
            outcome
        }));
    }

    let mut outcomes = Vec::with_capacity(workers);
    for handle in handles {
        outcomes.push(handle.await.context("lookup task panicked")?);
    }
    Ok(outcomes)
}

/// Stand-in for an expensive call; returns how many calls preceded it.
async fn slow_backend(calls: Arc<AtomicU64>) -> Result<u64, String> {
    tokio::time::sleep(BACKEND_LATENCY).await;
    Ok(calls.fetch_add(1, Ordering::SeqCst))
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping...");
        }
        _ = terminate => {
            info!("Received SIGTERM, stopping...");
        }
    }
}
