//! Shared application state for Axum handlers.

use std::sync::Arc;
use std::time::Instant;

use sharecode_core::config::AppConfig;
use sharecode_core::traits::BlobStore;
use sharecode_database::ShareStore;
use sharecode_service::{ExpirationSweeper, ShareRegistry, UsageReporter};

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Share entry lifecycle.
    pub registry: Arc<ShareRegistry>,
    /// On-demand expiration sweeps.
    pub sweeper: Arc<ExpirationSweeper>,
    /// Blob store usage.
    pub usage: Arc<UsageReporter>,
    /// Share store, for health checks.
    pub shares: Arc<dyn ShareStore>,
    /// Blob store, for health checks.
    pub blobs: Arc<dyn BlobStore>,
    /// When the server started.
    pub started_at: Instant,
}
