//! Work that must finish even if the caller goes away.

use std::future::Future;

use sharecode_core::error::AppError;
use sharecode_core::result::AppResult;

/// Run `work` on its own task and wait for it.
///
/// Dropping the returned future (client disconnect, request timeout) does
/// not cancel `work`; it runs to completion in the background.
pub(crate) async fn run_detached<F, T>(work: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(work)
        .await
        .map_err(|e| AppError::internal(format!("Background task failed: {e}")))?
}
