//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (store, blobs) = tokio::join!(state.shares.health_check(), state.blobs.health_check());

    let store = describe(store, "connected", "unreachable");
    let blob_store = describe(blobs, "available", "unavailable");
    let status = if store == "connected" && blob_store == "available" {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        store: store.to_string(),
        blob_store: blob_store.to_string(),
    })
}

fn describe(
    result: sharecode_core::result::AppResult<bool>,
    up: &'static str,
    down: &'static str,
) -> &'static str {
    match result {
        Ok(true) => up,
        Ok(false) => down,
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            down
        }
    }
}
