//! Runs the notewright HTTP API and queue worker in one process.
//!
//! Usage:
//!
//! ```text
//! NOTEWRIGHT__QUEUE_URL=memory://work \
//! NOTEWRIGHT__GENERATION__API_KEY=sk-... \
//! notewright
//! ```
//!
//! Runtime settings are read from `NOTEWRIGHT_*` variables once at startup.
//! Operational parameters (queue URL, notification channel, generation and
//! identity settings) are read from `NOTEWRIGHT__*` variables through the
//! TTL configuration cache, so they can change without a restart.
//!
//! Startup order:
//! 1. Read the runtime configuration.
//! 2. Initialise tracing (JSON when `NOTEWRIGHT_LOG_JSON` is set).
//! 3. Wire the adapters, the task service and the worker.
//! 4. Spawn the queue poller.
//! 5. Serve HTTP until SIGINT or SIGTERM, then drain the poller.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mockable::DefaultClock;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use notewright::api;
use notewright::config::{ConfigCache, adapters::EnvParameterSource};
use notewright::task::adapters::{
    HttpGenerator, LogNotifier,
    memory::{InMemoryTaskStore, InMemoryWorkQueue},
};
use notewright::task::ports::GenerationError;
use notewright::task::services::TaskService;
use notewright::worker::{PollerConfig, QueuePoller, TaskWorker};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that stop the process during startup or serving.
#[derive(Debug, Error)]
enum StartupError {
    #[error("invalid bind address '{address}': {source}")]
    InvalidBindAddress {
        address: String,
        source: std::net::AddrParseError,
    },
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        source: std::io::Error,
    },
    #[error("HTTP server failed: {0}")]
    Serve(std::io::Error),
    #[error("failed to build generation client: {0}")]
    Generator(GenerationError),
}

/// Process-level settings fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RuntimeConfig {
    bind_address: String,
    log_filter: String,
    log_json: bool,
    config_prefix: String,
    config_ttl: Duration,
    queue_url: String,
    batch_size: usize,
    poll_interval: Duration,
    max_receive_count: u32,
}

impl RuntimeConfig {
    fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());
        Self {
            bind_address: text("NOTEWRIGHT_BIND", "0.0.0.0:3000"),
            log_filter: text("NOTEWRIGHT_LOG", "info"),
            log_json: lookup("NOTEWRIGHT_LOG_JSON")
                .is_some_and(|value| value == "1" || value.eq_ignore_ascii_case("true")),
            config_prefix: text("NOTEWRIGHT_CONFIG_PREFIX", "NOTEWRIGHT__"),
            config_ttl: Duration::from_secs(parse_or(&lookup, "NOTEWRIGHT_CONFIG_TTL_SECS", 300)),
            queue_url: text("NOTEWRIGHT_QUEUE_URL", "memory://work"),
            batch_size: parse_or(&lookup, "NOTEWRIGHT_BATCH_SIZE", 10_usize).max(1),
            poll_interval: Duration::from_millis(parse_or(
                &lookup,
                "NOTEWRIGHT_POLL_INTERVAL_MS",
                500,
            )),
            max_receive_count: parse_or(&lookup, "NOTEWRIGHT_MAX_RECEIVE_COUNT", 3).max(1),
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn init_tracing(config: &RuntimeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let runtime = RuntimeConfig::from_env();
    init_tracing(&runtime);
    info!(version = env!("CARGO_PKG_VERSION"), "notewright starting");

    let clock = Arc::new(DefaultClock);
    let config = Arc::new(ConfigCache::with_ttl(
        Arc::new(EnvParameterSource::new()),
        Arc::clone(&clock),
        runtime.config_prefix.clone(),
        runtime.config_ttl,
    ));
    let store = Arc::new(InMemoryTaskStore::new());
    let queue = Arc::new(
        InMemoryWorkQueue::new(runtime.queue_url.clone())
            .with_max_receive_count(runtime.max_receive_count),
    );
    let generator = Arc::new(HttpGenerator::new().map_err(StartupError::Generator)?);

    let service = TaskService::new(
        Arc::clone(&store),
        Arc::clone(&queue),
        Arc::clone(&config),
        Arc::clone(&clock),
    );
    let worker = Arc::new(TaskWorker::new(
        store,
        generator,
        Arc::new(LogNotifier),
        config,
        clock,
    ));
    let poller = QueuePoller::new(
        queue,
        worker,
        PollerConfig {
            batch_size: runtime.batch_size,
            idle_interval: runtime.poll_interval,
        },
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let polling = tokio::spawn(async move { poller.run(shutdown_rx).await });

    let addr: SocketAddr =
        runtime
            .bind_address
            .parse()
            .map_err(|source| StartupError::InvalidBindAddress {
                address: runtime.bind_address.clone(),
                source,
            })?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind {
            address: addr,
            source,
        })?;
    info!(%addr, queue_url = %runtime.queue_url, "HTTP server listening");

    axum::serve(listener, api::router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)?;

    if shutdown_tx.send(true).is_err() {
        warn!("queue poller exited before shutdown");
    }
    if let Err(err) = polling.await {
        warn!(error = %err, "queue poller task failed");
    }
    info!("notewright stopped");
    Ok(())
}

/// Resolves when SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install CTRL+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => warn!(error = %err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("shutdown signal received; draining");
}
