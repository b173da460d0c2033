//! Route definitions for the HTTP API.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use axum::routing::get;

use crate::handlers;
use crate::middleware::logging::request_logging;
use crate::state::AppState;

/// Build the API router mounted under `/api`.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;

    let api = Router::new()
        .merge(store_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum_middleware::from_fn(request_logging))
        .with_state(state)
}

fn store_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/store",
            get(handlers::share::get_share)
                .post(handlers::share::create_share)
                .delete(handlers::share::delete_share),
        )
        .route(
            "/store/clearExpired",
            get(handlers::sweep::clear_expired).post(handlers::sweep::clear_expired),
        )
        .route("/store/stats", get(handlers::usage::usage_stats))
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
