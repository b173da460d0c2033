//! Shared fixtures for service tests.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{TimeZone, Utc};

use sharecode_core::config::ShareConfig;
use sharecode_core::traits::ManualClock;
use sharecode_database::memory::{MemoryDeletionQueue, MemoryShareStore};
use sharecode_storage::providers::MemoryBlobStore;
use sharecode_storage::{BlobStoreManager, RetryPolicy};

use crate::share::{BlobPurger, CodeSource, ShareRegistry, TimeRandomCodeSource};
use crate::sweep::{BlobReconciler, ExpirationSweeper};

/// Registry, sweeper, and reconciler wired to in-memory backends and a
/// manual clock.
pub(crate) struct Harness {
    pub registry: ShareRegistry,
    pub sweeper: ExpirationSweeper,
    pub reconciler: BlobReconciler,
    pub store: Arc<MemoryShareStore>,
    pub queue: Arc<MemoryDeletionQueue>,
    pub blobs: MemoryBlobStore,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_codes(TimeRandomCodeSource::new())
    }

    pub fn with_codes(codes: impl CodeSource) -> Self {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 9, 1, 9, 0, 0).unwrap(),
        ));
        let store = Arc::new(MemoryShareStore::new());
        let queue = Arc::new(MemoryDeletionQueue::new());
        let blobs = MemoryBlobStore::default();
        let manager = Arc::new(BlobStoreManager::from_provider(
            Arc::new(blobs.clone()),
            RetryPolicy::no_retry(StdDuration::from_secs(1)),
        ));

        let purger = Arc::new(BlobPurger::new(manager.clone(), queue.clone(), clock.clone()));
        let registry = ShareRegistry::new(
            store.clone(),
            purger.clone(),
            Arc::new(codes),
            clock.clone(),
            ShareConfig::default(),
        );
        let sweeper = ExpirationSweeper::new(store.clone(), purger, clock.clone(), 2);
        let reconciler = BlobReconciler::new(queue.clone(), manager, clock.clone(), 3, 100);

        Self {
            registry,
            sweeper,
            reconciler,
            store,
            queue,
            blobs,
            clock,
        }
    }
}
