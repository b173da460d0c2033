//! Cascade deletion of a share's blobs.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, error, warn};
use uuid::Uuid;

use sharecode_core::traits::{BlobStore, Clock};
use sharecode_database::BlobDeletionQueue;
use sharecode_entity::blob::NewPendingDeletion;
use sharecode_entity::share::ShareEntry;

/// What happened to a share's blob keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeOutcome {
    /// Keys the blob store reported as deleted.
    pub deleted: u64,
    /// Keys left in the pending deletion queue instead.
    pub queued: u64,
}

/// How long a journaled key is hidden from the reconciler when no lease is
/// configured.
const DEFAULT_IN_FLIGHT_LEASE_SECONDS: i64 = 5 * 60;

/// Deletes the blobs of a removed share.
///
/// The keys are written to the pending deletion queue before the blob store
/// is called and dropped from it once the delete succeeds, so an interrupted
/// purge still leaves a record. A failing blob store never surfaces as an
/// error: the queued keys become due and the reconciler picks them up.
#[derive(Debug, Clone)]
pub struct BlobPurger {
    blobs: Arc<dyn BlobStore>,
    queue: Arc<dyn BlobDeletionQueue>,
    clock: Arc<dyn Clock>,
    in_flight_lease: Duration,
}

impl BlobPurger {
    /// Create a new purger.
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        queue: Arc<dyn BlobDeletionQueue>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            blobs,
            queue,
            clock,
            in_flight_lease: Duration::seconds(DEFAULT_IN_FLIGHT_LEASE_SECONDS),
        }
    }

    /// Keep journaled keys away from the reconciler for `lease`. Should cover
    /// the longest a blob store delete can take.
    pub fn with_in_flight_lease(mut self, lease: Duration) -> Self {
        self.in_flight_lease = lease;
        self
    }

    /// Delete every blob of `entry` now, leaving the keys queued on failure.
    pub async fn purge(&self, entry: &ShareEntry) -> PurgeOutcome {
        let keys = entry.storage_keys();
        let now = self.clock.now();
        let journal = keys
            .iter()
            .map(|key| {
                NewPendingDeletion::in_flight(
                    key.clone(),
                    Some(entry.share_code.to_string()),
                    now,
                    self.in_flight_lease,
                )
            })
            .collect();
        let ids = self.enqueue(entry, journal).await;

        match self.blobs.delete_files(&keys).await {
            Ok(deleted) => {
                if let Err(e) = self.queue.complete(&ids).await {
                    warn!(
                        share_code = %entry.share_code,
                        error = %e,
                        "Failed to clear purged keys from the queue; reconciler will retry them"
                    );
                }
                debug!(share_code = %entry.share_code, deleted, "Purged share blobs");
                PurgeOutcome { deleted, queued: 0 }
            }
            Err(e) => {
                warn!(
                    share_code = %entry.share_code,
                    keys = keys.len(),
                    error = %e,
                    "Blob delete failed; keys left for reconciliation"
                );
                if !ids.is_empty() {
                    let released = self.queue.release(&ids, &e.message, self.clock.now()).await;
                    if let Err(qe) = released {
                        warn!(
                            share_code = %entry.share_code,
                            error = %qe,
                            "Failed to release queued keys; they become due when the lease ends"
                        );
                    }
                }
                PurgeOutcome {
                    deleted: 0,
                    queued: ids.len() as u64,
                }
            }
        }
    }

    /// Schedule every blob of `entry` for deletion once `grace` has passed.
    pub async fn defer(&self, entry: &ShareEntry, grace: Duration) -> PurgeOutcome {
        let now = self.clock.now();
        let items: Vec<NewPendingDeletion> = entry
            .files
            .iter()
            .map(|f| {
                NewPendingDeletion::after_grace(
                    f.storage_key.clone(),
                    Some(entry.share_code.to_string()),
                    now,
                    grace,
                )
            })
            .collect();
        let queued = self.enqueue(entry, items).await.len() as u64;
        debug!(
            share_code = %entry.share_code,
            queued,
            grace_seconds = grace.num_seconds(),
            "Deferred blob purge"
        );
        PurgeOutcome { deleted: 0, queued }
    }

    async fn enqueue(&self, entry: &ShareEntry, items: Vec<NewPendingDeletion>) -> Vec<Uuid> {
        match self.queue.enqueue(items).await {
            Ok(ids) => ids,
            Err(e) => {
                // Nothing else remembers these keys now.
                error!(
                    share_code = %entry.share_code,
                    keys = ?entry.storage_keys(),
                    error = %e,
                    "Failed to queue blob deletions; blobs may be orphaned"
                );
                Vec::new()
            }
        }
    }
}
