//! Pending blob deletion queue trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use sharecode_core::result::AppResult;
use sharecode_entity::blob::{NewPendingDeletion, PendingBlobDeletion};

/// Durable queue of blob keys that still need deleting.
#[async_trait]
pub trait BlobDeletionQueue: Send + Sync + std::fmt::Debug + 'static {
    /// Queue keys for deletion. Returns the new row ids in input order.
    async fn enqueue(&self, items: Vec<NewPendingDeletion>) -> AppResult<Vec<Uuid>>;

    /// Rows whose `not_before` has passed and that have fewer than
    /// `max_attempts` attempts, oldest first.
    async fn due(
        &self,
        now: DateTime<Utc>,
        max_attempts: i32,
        limit: i64,
    ) -> AppResult<Vec<PendingBlobDeletion>>;

    /// Drop rows whose keys were deleted. Returns how many rows went away.
    async fn complete(&self, ids: &[Uuid]) -> AppResult<u64>;

    /// Count a failed attempt and push the next try out to `retry_at`.
    async fn record_failure(
        &self,
        id: Uuid,
        error: &str,
        retry_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Make rows due at `now` after a failed cascade delete, without
    /// counting a reconciler attempt.
    async fn release(&self, ids: &[Uuid], error: &str, now: DateTime<Utc>) -> AppResult<()>;

    /// Every queued row, oldest first, at most `limit`.
    async fn list(&self, limit: i64) -> AppResult<Vec<PendingBlobDeletion>>;

    /// Number of queued rows.
    async fn count(&self) -> AppResult<u64>;
}
