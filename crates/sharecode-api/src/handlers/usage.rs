//! Blob store usage.

use axum::Json;
use axum::extract::State;

use sharecode_service::UsageReport;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/store/stats
pub async fn usage_stats(State(state): State<AppState>) -> Result<Json<UsageReport>, ApiError> {
    Ok(Json(state.usage.report().await?))
}
