//! In-memory pending blob deletion queue.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use sharecode_core::result::AppResult;
use sharecode_entity::blob::{NewPendingDeletion, PendingBlobDeletion};

use crate::store::BlobDeletionQueue;

/// Deletion queue held in a concurrent hash map.
#[derive(Debug, Clone, Default)]
pub struct MemoryDeletionQueue {
    rows: Arc<DashMap<Uuid, PendingBlobDeletion>>,
}

impl MemoryDeletionQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_by<K: Ord>(
        &self,
        keep: impl Fn(&PendingBlobDeletion) -> bool,
        key: impl Fn(&PendingBlobDeletion) -> K,
        limit: i64,
    ) -> Vec<PendingBlobDeletion> {
        let mut rows: Vec<PendingBlobDeletion> = self
            .rows
            .iter()
            .filter(|r| keep(r.value()))
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|r| key(r));
        rows.truncate(limit.max(0) as usize);
        rows
    }
}

#[async_trait]
impl BlobDeletionQueue for MemoryDeletionQueue {
    async fn enqueue(&self, items: Vec<NewPendingDeletion>) -> AppResult<Vec<Uuid>> {
        let now = Utc::now();
        let ids = items
            .into_iter()
            .map(|item| {
                let row = item.into_row(now);
                let id = row.id;
                self.rows.insert(id, row);
                id
            })
            .collect();
        Ok(ids)
    }

    async fn due(
        &self,
        now: DateTime<Utc>,
        max_attempts: i32,
        limit: i64,
    ) -> AppResult<Vec<PendingBlobDeletion>> {
        Ok(self.sorted_by(|r| r.is_due(now, max_attempts), |r| r.not_before, limit))
    }

    async fn complete(&self, ids: &[Uuid]) -> AppResult<u64> {
        Ok(ids.iter().filter(|id| self.rows.remove(id).is_some()).count() as u64)
    }

    async fn record_failure(
        &self,
        id: Uuid,
        error: &str,
        retry_at: DateTime<Utc>,
    ) -> AppResult<()> {
        if let Some(mut row) = self.rows.get_mut(&id) {
            row.attempts += 1;
            row.last_error = Some(error.to_string());
            row.not_before = retry_at;
        }
        Ok(())
    }

    async fn release(&self, ids: &[Uuid], error: &str, now: DateTime<Utc>) -> AppResult<()> {
        for id in ids {
            if let Some(mut row) = self.rows.get_mut(id) {
                row.last_error = Some(error.to_string());
                row.not_before = now;
            }
        }
        Ok(())
    }

    async fn list(&self, limit: i64) -> AppResult<Vec<PendingBlobDeletion>> {
        Ok(self.sorted_by(|_| true, |r| r.created_at, limit))
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.rows.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_due_respects_not_before_and_attempts() {
        let queue = MemoryDeletionQueue::new();
        let now = Utc::now();
        queue
            .enqueue(vec![
                NewPendingDeletion::purge_failed("k-now", None, "timeout", now),
                NewPendingDeletion::after_grace("k-later", None, now, Duration::hours(1)),
            ])
            .await
            .unwrap();

        let due = queue.due(now, 3, 10).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].storage_key, "k-now");

        for _ in 0..3 {
            queue.record_failure(due[0].id, "still down", now).await.unwrap();
        }
        assert!(queue.due(now, 3, 10).await.unwrap().is_empty());
        assert_eq!(queue.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_release_makes_in_flight_rows_due() {
        let queue = MemoryDeletionQueue::new();
        let now = Utc::now();
        let ids = queue
            .enqueue(vec![NewPendingDeletion::in_flight("k1", None, now, Duration::minutes(5))])
            .await
            .unwrap();
        assert!(queue.due(now, 3, 10).await.unwrap().is_empty());

        queue.release(&ids, "store down", now).await.unwrap();
        let due = queue.due(now, 3, 10).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, ids[0]);
        assert_eq!(due[0].attempts, 0);
        assert_eq!(due[0].last_error.as_deref(), Some("store down"));
    }

    #[tokio::test]
    async fn test_complete_removes_rows() {
        let queue = MemoryDeletionQueue::new();
        let now = Utc::now();
        queue
            .enqueue(vec![NewPendingDeletion::purge_failed("k1", None, "boom", now)])
            .await
            .unwrap();
        let rows = queue.list(10).await.unwrap();
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        assert_eq!(queue.complete(&ids).await.unwrap(), 1);
        assert_eq!(queue.complete(&ids).await.unwrap(), 0);
        assert_eq!(queue.count().await.unwrap(), 0);
    }
}
