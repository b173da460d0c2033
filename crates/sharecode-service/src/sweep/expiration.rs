//! Expiration sweeper.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use sharecode_core::result::AppResult;
use sharecode_core::traits::Clock;
use sharecode_database::ShareStore;
use sharecode_entity::share::ShareCode;

use crate::share::BlobPurger;
use crate::task::run_detached;

/// Result of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    /// Entries removed.
    pub removed: u64,
    /// Blob keys that could not be deleted and were queued.
    pub blob_failures: u64,
    /// Entries whose removal failed; they stay for the next sweep.
    pub failed: u64,
}

/// Removes entries whose expiration instant has passed, along with their
/// blobs.
///
/// Holds no timer. The worker schedule, the CLI, and the HTTP endpoint
/// trigger it.
#[derive(Debug, Clone)]
pub struct ExpirationSweeper {
    store: Arc<dyn ShareStore>,
    purger: Arc<BlobPurger>,
    clock: Arc<dyn Clock>,
    batch_size: i64,
}

impl ExpirationSweeper {
    /// Create a new sweeper that lists at most `batch_size` codes per query.
    pub fn new(
        store: Arc<dyn ShareStore>,
        purger: Arc<BlobPurger>,
        clock: Arc<dyn Clock>,
        batch_size: i64,
    ) -> Self {
        Self {
            store,
            purger,
            clock,
            batch_size: batch_size.max(1),
        }
    }

    /// Remove every entry expired at the current instant.
    ///
    /// Each row is deleted only if it is still expired when the delete runs,
    /// so a concurrent reader or delete never races into a wrong removal.
    /// Codes whose removal fails are skipped by later batches, so they never
    /// hold back the rest. The sweep runs to completion even if the caller is
    /// dropped.
    pub async fn sweep(&self) -> AppResult<SweepReport> {
        let this = self.clone();
        run_detached(async move { this.sweep_at(this.clock.now()).await }).await
    }

    async fn sweep_at(&self, now: DateTime<Utc>) -> AppResult<SweepReport> {
        let mut report = SweepReport::default();
        let mut failed: Vec<ShareCode> = Vec::new();

        loop {
            let codes = self
                .store
                .list_expired_codes(now, &failed, self.batch_size)
                .await?;
            let fetched = codes.len() as i64;

            for code in codes {
                match self.store.remove_if_expired(&code, now).await {
                    Ok(Some(entry)) => {
                        report.removed += 1;
                        let outcome = self.purger.purge(&entry).await;
                        report.blob_failures += outcome.queued;
                    }
                    // Removed by someone else in the meantime.
                    Ok(None) => {}
                    Err(e) => {
                        warn!(share_code = %code, error = %e, "Failed to remove expired share");
                        failed.push(code);
                    }
                }
            }

            if fetched < self.batch_size {
                break;
            }
        }

        report.failed = failed.len() as u64;
        if report.removed > 0 || report.failed > 0 {
            info!(
                removed = report.removed,
                blob_failures = report.blob_failures,
                failed = report.failed,
                "Expiration sweep finished"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Duration;

    use sharecode_core::error::{AppError, ErrorKind};
    use sharecode_database::memory::MemoryShareStore;
    use sharecode_database::{BlobDeletionQueue, ShareStore};
    use sharecode_entity::share::{ExpirationPolicy, FileRecord, NewShareEntry, ShareEntry};

    use super::*;
    use crate::share::{FixedCodeSource, GetMode};
    use crate::testing::Harness;

    /// Memory store whose expired-row delete fails for codes starting with
    /// `BAD`.
    #[derive(Debug)]
    struct FailingRemoveStore {
        inner: Arc<MemoryShareStore>,
    }

    #[async_trait]
    impl ShareStore for FailingRemoveStore {
        async fn insert_if_absent(&self, entry: &ShareEntry) -> AppResult<bool> {
            self.inner.insert_if_absent(entry).await
        }

        async fn find_by_code(&self, code: &ShareCode) -> AppResult<Option<ShareEntry>> {
            self.inner.find_by_code(code).await
        }

        async fn remove(&self, code: &ShareCode) -> AppResult<Option<ShareEntry>> {
            self.inner.remove(code).await
        }

        async fn take_one_time(
            &self,
            code: &ShareCode,
            now: DateTime<Utc>,
        ) -> AppResult<Option<ShareEntry>> {
            self.inner.take_one_time(code, now).await
        }

        async fn list_expired_codes(
            &self,
            now: DateTime<Utc>,
            exclude: &[ShareCode],
            limit: i64,
        ) -> AppResult<Vec<ShareCode>> {
            self.inner.list_expired_codes(now, exclude, limit).await
        }

        async fn remove_if_expired(
            &self,
            code: &ShareCode,
            now: DateTime<Utc>,
        ) -> AppResult<Option<ShareEntry>> {
            if code.as_str().starts_with("BAD") {
                return Err(AppError::database("row locked"));
            }
            self.inner.remove_if_expired(code, now).await
        }

        async fn count(&self) -> AppResult<u64> {
            self.inner.count().await
        }

        async fn health_check(&self) -> AppResult<bool> {
            Ok(true)
        }
    }

    fn new_entry(key: &str, policy: ExpirationPolicy) -> NewShareEntry {
        NewShareEntry {
            files: vec![FileRecord::new("a.txt", 100, key)],
            expiration: Some(policy),
            one_time_code: false,
        }
    }

    #[tokio::test]
    async fn test_sweep_after_a_day_removes_entry_and_blob() {
        let h = Harness::new();
        h.blobs.put("k1", 100);
        let created = h
            .registry
            .create_entry(NewShareEntry {
                files: vec![FileRecord::new("a.txt", 100, "k1")],
                expiration: None,
                one_time_code: false,
            })
            .await
            .unwrap();
        let code = created.share_code.to_string();

        let fetched = h.registry.get_entry(&code, GetMode::Retrieve).await.unwrap();
        assert_eq!(fetched.total_size_bytes, 100);

        h.clock.advance(Duration::hours(25));
        let err = h
            .registry
            .get_entry(&code, GetMode::Retrieve)
            .await
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Expired | ErrorKind::NotFound));

        let report = h.sweeper.sweep().await.unwrap();
        assert_eq!(report.removed, 1);
        assert_eq!(report.blob_failures, 0);
        assert!(!h.blobs.contains("k1"));

        let err = h
            .registry
            .get_entry(&code, GetMode::Retrieve)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent() {
        let h = Harness::new();
        h.registry
            .create_entry(new_entry("k1", ExpirationPolicy::hours(1)))
            .await
            .unwrap();
        h.clock.advance(Duration::hours(2));

        assert_eq!(h.sweeper.sweep().await.unwrap().removed, 1);
        assert_eq!(h.sweeper.sweep().await.unwrap().removed, 0);
    }

    #[tokio::test]
    async fn test_sweep_keeps_live_entries() {
        let h = Harness::new();
        h.registry
            .create_entry(new_entry("old", ExpirationPolicy::hours(1)))
            .await
            .unwrap();
        let live = h
            .registry
            .create_entry(new_entry("new", ExpirationPolicy::days(2)))
            .await
            .unwrap();
        h.clock.advance(Duration::hours(3));

        let report = h.sweeper.sweep().await.unwrap();
        assert_eq!(report.removed, 1);
        assert_eq!(h.store.count().await.unwrap(), 1);
        assert!(
            h.registry
                .get_entry(live.share_code.as_str(), GetMode::Probe)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_sweep_walks_multiple_batches() {
        let h = Harness::new();
        for i in 0..5 {
            h.registry
                .create_entry(new_entry(&format!("k{i}"), ExpirationPolicy::hours(1)))
                .await
                .unwrap();
        }
        h.clock.advance(Duration::hours(1));

        let report = h.sweeper.sweep().await.unwrap();
        assert_eq!(report.removed, 5);
        assert_eq!(h.store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sweep_tolerates_blob_outage() {
        let h = Harness::new();
        h.registry
            .create_entry(new_entry("k1", ExpirationPolicy::hours(1)))
            .await
            .unwrap();
        h.clock.advance(Duration::hours(2));
        h.blobs.set_available(false);

        let report = h.sweeper.sweep().await.unwrap();
        assert_eq!(report.removed, 1);
        assert_eq!(report.blob_failures, 1);
        assert_eq!(h.store.count().await.unwrap(), 0);
        assert_eq!(h.queue.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failing_rows_do_not_block_later_ones() {
        let h = Harness::with_codes(FixedCodeSource::new(["BAD001", "BAD002", "GOOD01"]));
        for key in ["k1", "k2", "k3"] {
            h.registry
                .create_entry(new_entry(key, ExpirationPolicy::hours(1)))
                .await
                .unwrap();
            h.clock.advance(Duration::minutes(1));
        }
        h.clock.advance(Duration::hours(2));

        let sweeper = ExpirationSweeper::new(
            Arc::new(FailingRemoveStore {
                inner: h.store.clone(),
            }),
            Arc::new(BlobPurger::new(
                Arc::new(h.blobs.clone()),
                h.queue.clone(),
                h.clock.clone(),
            )),
            h.clock.clone(),
            2,
        );
        let report = sweeper.sweep().await.unwrap();

        assert_eq!(report.removed, 1);
        assert_eq!(report.failed, 2);
        assert!(
            h.store
                .find_by_code(&ShareCode::parse("GOOD01").unwrap())
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(h.store.count().await.unwrap(), 2);
    }
}
