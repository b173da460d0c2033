//! Manual expiration sweep.

use axum::Json;
use axum::extract::State;

use crate::dto::response::ClearExpiredResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET|POST /api/store/clearExpired
pub async fn clear_expired(
    State(state): State<AppState>,
) -> Result<Json<ClearExpiredResponse>, ApiError> {
    let report = state.sweeper.sweep().await?;
    Ok(Json(ClearExpiredResponse {
        message: "Expired files deleted successfully".to_string(),
        report,
    }))
}
