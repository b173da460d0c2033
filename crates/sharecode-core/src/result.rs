//! Convenience result type alias for ShareCode.

use crate::error::AppError;

/// A specialized `Result` type for ShareCode operations.
pub type AppResult<T> = Result<T, AppError>;
