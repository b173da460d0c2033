//! Application builder: wires services, router, and middleware into an Axum app.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::http::StatusCode;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use sharecode_core::config::AppConfig;
use sharecode_core::traits::{BlobStore, Clock};
use sharecode_database::Stores;
use sharecode_service::{
    BlobPurger, BlobReconciler, CodeSource, ExpirationSweeper, ShareRegistry, UsageReporter,
};

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// The services behind the HTTP surface and the scheduled jobs.
#[derive(Debug, Clone)]
pub struct Services {
    /// Share entry lifecycle.
    pub registry: Arc<ShareRegistry>,
    /// Expiration sweeper.
    pub sweeper: Arc<ExpirationSweeper>,
    /// Pending blob deletion retries.
    pub reconciler: Arc<BlobReconciler>,
    /// Blob store usage.
    pub usage: Arc<UsageReporter>,
}

/// Construct every service from the selected stores and blob store.
pub fn build_services(
    config: &AppConfig,
    stores: &Stores,
    blobs: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
    codes: Arc<dyn CodeSource>,
) -> Services {
    let delete_budget = config.blob_store.delete_budget(config.share.max_files);
    let lease = chrono::Duration::from_std(delete_budget)
        .unwrap_or(chrono::Duration::MAX)
        .checked_add(&chrono::Duration::minutes(1))
        .unwrap_or(chrono::Duration::MAX);
    let purger = Arc::new(
        BlobPurger::new(
            Arc::clone(&blobs),
            Arc::clone(&stores.deletions),
            Arc::clone(&clock),
        )
        .with_in_flight_lease(lease),
    );

    let registry = Arc::new(ShareRegistry::new(
        Arc::clone(&stores.shares),
        Arc::clone(&purger),
        codes,
        Arc::clone(&clock),
        config.share.clone(),
    ));

    let sweeper = Arc::new(ExpirationSweeper::new(
        Arc::clone(&stores.shares),
        purger,
        Arc::clone(&clock),
        config.sweeper.batch_size,
    ));

    let reconciler = Arc::new(BlobReconciler::new(
        Arc::clone(&stores.deletions),
        Arc::clone(&blobs),
        clock,
        config.blob_store.max_reconcile_attempts,
        config.sweeper.batch_size,
    ));

    let usage = Arc::new(UsageReporter::new(blobs));

    Services {
        registry,
        sweeper,
        reconciler,
        usage,
    }
}

impl AppState {
    /// Build handler state from the wired services.
    pub fn new(
        config: Arc<AppConfig>,
        services: &Services,
        stores: &Stores,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            config,
            registry: Arc::clone(&services.registry),
            sweeper: Arc::clone(&services.sweeper),
            usage: Arc::clone(&services.usage),
            shares: Arc::clone(&stores.shares),
            blobs,
            started_at: Instant::now(),
        }
    }
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let server = state.config.server.clone();

    build_router(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(server.request_timeout_seconds),
        ))
        .layer(build_cors_layer(&server.cors))
        .layer(TraceLayer::new_for_http())
}
