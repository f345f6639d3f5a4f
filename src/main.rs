//! Memcache Gateway - HTTP front-end for a key/value cache
//!
//! Serves `/get`, `/set` and `/expire` in front of memcached, or over an
//! in-process store when no memcached server is configured.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use memcache_gateway::{
    api::create_router, spawn_cleanup_task, AppState, CacheStore, Config, MemcachedStore,
    MemoryStore,
};

/// Main entry point for the gateway server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect to memcached, or create the in-memory store and its expiry sweep
/// 4. Create Axum router with all endpoints
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memcache_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Memcache Gateway");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, expire_cas_attempts={}, cleanup_interval={}s",
        config.server_port, config.expire_cas_attempts, config.cleanup_interval
    );

    let (store, cleanup_handle) = match &config.memcache_url {
        Some(url) => {
            let store: Arc<dyn CacheStore> = Arc::new(
                MemcachedStore::connect(url)
                    .with_context(|| format!("failed to connect to memcached at {}", url))?,
            );
            (store, None)
        }
        None => {
            let memory = Arc::new(MemoryStore::new());
            let handle = spawn_cleanup_task(memory.clone(), config.cleanup_interval);
            info!("In-memory store initialized");
            let store: Arc<dyn CacheStore> = memory;
            (store, Some(handle))
        }
    };

    let state = AppState::from_config(store, &config);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweep task.
async fn shutdown_signal(cleanup_handle: Option<tokio::task::JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Expiry sweep task aborted");
    }
}
