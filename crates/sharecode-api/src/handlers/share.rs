//! Share entry handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;

use sharecode_core::error::AppError;
use sharecode_service::GetMode;

use crate::dto::request::{CreateShareRequest, ShareCodeQuery};
use crate::dto::response::{DeleteResponse, ShareEntryResponse};
use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// POST /api/store
pub async fn create_share(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateShareRequest>,
) -> Result<(StatusCode, Json<ShareEntryResponse>), ApiError> {
    let entry = state.registry.create_entry(req.into_new_entry()?).await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// GET /api/store?code=X
pub async fn get_share(
    State(state): State<AppState>,
    Query(query): Query<ShareCodeQuery>,
) -> Result<Json<ShareEntryResponse>, ApiError> {
    let code = query.require_code()?;
    let mode = if query.probe {
        GetMode::Probe
    } else {
        GetMode::Retrieve
    };
    let entry = state.registry.get_entry(code, mode).await?;
    Ok(Json(entry.into()))
}

/// DELETE /api/store?code=X
pub async fn delete_share(
    State(state): State<AppState>,
    Query(query): Query<ShareCodeQuery>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let code = query.require_code()?;
    if !state.registry.delete_entry(code).await? {
        return Err(AppError::not_found(format!("Share {code} not found")).into());
    }
    Ok(Json(DeleteResponse { deleted: true }))
}
