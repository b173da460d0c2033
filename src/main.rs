//! ShareCode Server: temporary file sharing by short code.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use sharecode_api::{AppState, build_app, build_services};
use sharecode_core::config::AppConfig;
use sharecode_core::error::AppError;
use sharecode_core::traits::SystemClock;
use sharecode_database::Stores;
use sharecode_service::TimeRandomCodeSource;
use sharecode_storage::BlobStoreManager;
use sharecode_worker::jobs::{ReconcileJobHandler, SweepJobHandler};
use sharecode_worker::{CronScheduler, JobExecutor};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let base = std::env::var("SHARECODE_CONFIG").unwrap_or_else(|_| "config/default".to_string());
    let env = std::env::var("SHARECODE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load_from(&base, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting ShareCode v{}", env!("CARGO_PKG_VERSION"));
    let config = Arc::new(config);

    // ── Step 1: Share store ──────────────────────────────────────
    tracing::info!(backend = ?config.database.backend, "Opening share store...");
    let stores = Stores::open(&config.database).await?;

    // ── Step 2: Blob store ───────────────────────────────────────
    tracing::info!(provider = ?config.blob_store.provider, "Initializing blob store...");
    let blobs = Arc::new(BlobStoreManager::new(&config.blob_store).await?);
    match sharecode_core::traits::BlobStore::health_check(blobs.as_ref()).await {
        Ok(true) => tracing::info!("Blob store reachable"),
        Ok(false) => tracing::warn!("Blob store health check failed; deletions will be queued"),
        Err(e) => tracing::warn!(error = %e, "Blob store health check failed"),
    }

    // ── Step 3: Services ─────────────────────────────────────────
    let services = build_services(
        &config,
        &stores,
        blobs.clone(),
        Arc::new(SystemClock),
        Arc::new(TimeRandomCodeSource::new()),
    );

    // ── Step 4: Background sweeper ───────────────────────────────
    let mut scheduler = if config.sweeper.enabled {
        let mut executor = JobExecutor::new();
        executor.register(Arc::new(SweepJobHandler::new(Arc::clone(&services.sweeper))));
        executor.register(Arc::new(ReconcileJobHandler::new(Arc::clone(
            &services.reconciler,
        ))));

        let scheduler = CronScheduler::new(Arc::new(executor)).await?;
        scheduler.register_default_tasks(&config.sweeper).await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Sweeper disabled; expired shares are removed only on demand");
        None
    };

    // ── Step 5: HTTP server ──────────────────────────────────────
    let state = AppState::new(Arc::clone(&config), &services, &stores, blobs);
    let app = build_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("ShareCode server listening on {}", addr);

    // ── Step 6: Graceful shutdown ────────────────────────────────
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")));

    // ── Step 7: Stop background work ─────────────────────────────
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    if let Some(scheduler) = scheduler.as_mut() {
        match tokio::time::timeout(grace, scheduler.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Scheduler shutdown failed"),
            Err(_) => tracing::warn!("Scheduler did not stop within the grace period"),
        }
    }
    stores.close().await;

    served?;
    tracing::info!("ShareCode server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
