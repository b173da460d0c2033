//! Orphan blob reconciler: retries queued blob deletions.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use sharecode_core::result::AppResult;
use sharecode_core::traits::{BlobStore, Clock};
use sharecode_database::BlobDeletionQueue;
use sharecode_entity::blob::PendingBlobDeletion;

/// Delay after the first failed reconcile attempt.
const BASE_BACKOFF_SECONDS: i64 = 60;
/// Longest delay between attempts.
const MAX_BACKOFF_SECONDS: i64 = 6 * 60 * 60;

/// Result of one reconcile pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Keys deleted and dropped from the queue.
    pub purged: u64,
    /// Keys that failed again and were rescheduled.
    pub retried: u64,
    /// Keys that reached the attempt limit and need an operator.
    pub abandoned: u64,
}

/// Works through the pending blob deletion queue.
#[derive(Debug, Clone)]
pub struct BlobReconciler {
    queue: Arc<dyn BlobDeletionQueue>,
    blobs: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
    max_attempts: i32,
    batch_size: i64,
}

impl BlobReconciler {
    /// Create a new reconciler.
    pub fn new(
        queue: Arc<dyn BlobDeletionQueue>,
        blobs: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
        max_attempts: i32,
        batch_size: i64,
    ) -> Self {
        Self {
            queue,
            blobs,
            clock,
            max_attempts: max_attempts.max(1),
            batch_size: batch_size.max(1),
        }
    }

    /// Process one batch of due rows.
    ///
    /// The batch is sent as a single delete first; if that fails every key is
    /// retried on its own so one bad key cannot hold back the rest.
    pub async fn reconcile(&self) -> AppResult<ReconcileReport> {
        let now = self.clock.now();
        let due = self
            .queue
            .due(now, self.max_attempts, self.batch_size)
            .await?;
        let mut report = ReconcileReport::default();
        if due.is_empty() {
            return Ok(report);
        }

        let keys: Vec<String> = due.iter().map(|r| r.storage_key.clone()).collect();
        if self.blobs.delete_files(&keys).await.is_ok() {
            let ids: Vec<_> = due.iter().map(|r| r.id).collect();
            report.purged = self.queue.complete(&ids).await?;
        } else {
            for row in &due {
                match self.blobs.delete_files(std::slice::from_ref(&row.storage_key)).await {
                    Ok(_) => report.purged += self.queue.complete(&[row.id]).await?,
                    Err(e) => {
                        if self.reschedule(row, &e.message, now).await? {
                            report.retried += 1;
                        } else {
                            report.abandoned += 1;
                        }
                    }
                }
            }
        }

        info!(
            purged = report.purged,
            retried = report.retried,
            abandoned = report.abandoned,
            "Blob reconcile pass finished"
        );
        Ok(report)
    }

    /// Record a failed attempt. Returns `false` when the row has used up its
    /// attempts.
    async fn reschedule(
        &self,
        row: &PendingBlobDeletion,
        message: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let attempts = row.attempts + 1;
        let retry_at = now + backoff(attempts);
        self.queue.record_failure(row.id, message, retry_at).await?;

        if attempts >= self.max_attempts {
            error!(
                storage_key = %row.storage_key,
                share_code = row.share_code.as_deref().unwrap_or("-"),
                attempts,
                last_error = message,
                "Giving up on blob deletion; manual cleanup required"
            );
            Ok(false)
        } else {
            warn!(
                storage_key = %row.storage_key,
                attempts,
                retry_at = %retry_at,
                "Blob deletion failed again"
            );
            Ok(true)
        }
    }
}

/// Delay before attempt `attempts + 1`: 60 s doubling per attempt, capped at
/// six hours.
pub fn backoff(attempts: i32) -> Duration {
    let exponent = attempts.saturating_sub(1).clamp(0, 30) as u32;
    let seconds = BASE_BACKOFF_SECONDS.saturating_mul(1i64 << exponent);
    Duration::seconds(seconds.min(MAX_BACKOFF_SECONDS))
}
