//! Pending blob deletion repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use sharecode_core::error::{AppError, ErrorKind};
use sharecode_core::result::AppResult;
use sharecode_entity::blob::{NewPendingDeletion, PendingBlobDeletion};

use crate::store::BlobDeletionQueue;

/// Repository for the `pending_blob_deletions` table.
#[derive(Debug, Clone)]
pub struct PendingDeletionRepository {
    pool: PgPool,
}

impl PendingDeletionRepository {
    /// Create a new pending deletion repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlobDeletionQueue for PendingDeletionRepository {
    async fn enqueue(&self, items: Vec<NewPendingDeletion>) -> AppResult<Vec<Uuid>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut ids = Vec::with_capacity(items.len());
        for item in items {
            let id = Uuid::new_v4();
            sqlx::query(
                "INSERT INTO pending_blob_deletions \
                 (id, storage_key, share_code, reason, last_error, not_before) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(id)
            .bind(&item.storage_key)
            .bind(&item.share_code)
            .bind(item.reason)
            .bind(&item.last_error)
            .bind(item.not_before)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to queue blob deletion", e)
            })?;
            ids.push(id);
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit blob deletions", e)
        })?;
        Ok(ids)
    }

    async fn due(
        &self,
        now: DateTime<Utc>,
        max_attempts: i32,
        limit: i64,
    ) -> AppResult<Vec<PendingBlobDeletion>> {
        sqlx::query_as::<_, PendingBlobDeletion>(
            "SELECT * FROM pending_blob_deletions \
             WHERE not_before <= $1 AND attempts < $2 \
             ORDER BY not_before LIMIT $3",
        )
        .bind(now)
        .bind(max_attempts)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load due blob deletions", e)
        })
    }

    async fn complete(&self, ids: &[Uuid]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM pending_blob_deletions WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to complete blob deletions", e)
            })?;
        Ok(result.rows_affected())
    }

    async fn record_failure(
        &self,
        id: Uuid,
        error: &str,
        retry_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE pending_blob_deletions \
             SET attempts = attempts + 1, last_error = $2, not_before = $3 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .bind(retry_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record deletion failure", e)
        })?;
        Ok(())
    }

    async fn release(&self, ids: &[Uuid], error: &str, now: DateTime<Utc>) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "UPDATE pending_blob_deletions \
             SET last_error = $2, not_before = $3 \
             WHERE id = ANY($1)",
        )
        .bind(ids)
        .bind(error)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to release blob deletions", e)
        })?;
        Ok(())
    }

    async fn list(&self, limit: i64) -> AppResult<Vec<PendingBlobDeletion>> {
        sqlx::query_as::<_, PendingBlobDeletion>(
            "SELECT * FROM pending_blob_deletions ORDER BY created_at LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list blob deletions", e)
        })
    }

    async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pending_blob_deletions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count blob deletions", e)
            })?;
        Ok(count as u64)
    }
}
