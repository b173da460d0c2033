//! # sharecode-api
//!
//! HTTP surface of ShareCode built on Axum. Field names on the wire match
//! the browser client (`ShareCode`, `File`, `ExpiresIn`, ...).

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{Services, build_app, build_services};
pub use error::ApiError;
pub use state::AppState;
