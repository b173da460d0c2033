//! Pending blob deletion entity.
//!
//! A row here is a blob key that still has to be removed from the blob
//! store, either because an earlier delete failed or because the purge was
//! deliberately postponed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Why a key ended up in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "blob_deletion_reason", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeletionReason {
    /// Queued by a cascade delete before it called the blob store. The row
    /// is dropped when the delete succeeds and retried by the reconciler
    /// otherwise.
    PurgeFailed,
    /// A one-time share was consumed; the blob stays downloadable for a grace
    /// period before it is purged.
    OneTimeGrace,
}

impl DeletionReason {
    /// Return the reason as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PurgeFailed => "purge_failed",
            Self::OneTimeGrace => "one_time_grace",
        }
    }
}

impl std::fmt::Display for DeletionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A queued blob deletion.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PendingBlobDeletion {
    /// Row identifier.
    pub id: Uuid,
    /// Key in the blob store.
    pub storage_key: String,
    /// Share the key belonged to, kept for operators.
    pub share_code: Option<String>,
    /// Why the key was queued.
    pub reason: DeletionReason,
    /// Delete attempts made by the reconciler so far.
    pub attempts: i32,
    /// Last error returned by the blob store.
    pub last_error: Option<String>,
    /// The reconciler skips the row until this instant.
    pub not_before: DateTime<Utc>,
    /// When the row was queued.
    pub created_at: DateTime<Utc>,
}

impl PendingBlobDeletion {
    /// Whether the reconciler may try this row at `now`.
    pub fn is_due(&self, now: DateTime<Utc>, max_attempts: i32) -> bool {
        self.not_before <= now && self.attempts < max_attempts
    }
}

/// Data required to queue a blob deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPendingDeletion {
    /// Key in the blob store.
    pub storage_key: String,
    /// Share the key belonged to.
    pub share_code: Option<String>,
    /// Why the key is queued.
    pub reason: DeletionReason,
    /// Earliest instant the reconciler may try.
    pub not_before: DateTime<Utc>,
    /// Error from the failed attempt, if any.
    pub last_error: Option<String>,
}

impl NewPendingDeletion {
    /// A key whose cascade delete failed; retry right away.
    pub fn purge_failed(
        storage_key: impl Into<String>,
        share_code: Option<String>,
        error: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            storage_key: storage_key.into(),
            share_code,
            reason: DeletionReason::PurgeFailed,
            not_before: now,
            last_error: Some(error.into()),
        }
    }

    /// A key about to be deleted by a cascade delete. The reconciler leaves
    /// it alone for `lease`, long enough for that delete to finish.
    pub fn in_flight(
        storage_key: impl Into<String>,
        share_code: Option<String>,
        now: DateTime<Utc>,
        lease: Duration,
    ) -> Self {
        Self {
            storage_key: storage_key.into(),
            share_code,
            reason: DeletionReason::PurgeFailed,
            not_before: now.checked_add_signed(lease).unwrap_or(DateTime::<Utc>::MAX_UTC),
            last_error: None,
        }
    }

    /// A key of a consumed one-time share; purge after `grace`.
    pub fn after_grace(
        storage_key: impl Into<String>,
        share_code: Option<String>,
        now: DateTime<Utc>,
        grace: Duration,
    ) -> Self {
        Self {
            storage_key: storage_key.into(),
            share_code,
            reason: DeletionReason::OneTimeGrace,
            not_before: now + grace,
            last_error: None,
        }
    }

    /// Materialize the row as it will be stored.
    pub fn into_row(self, now: DateTime<Utc>) -> PendingBlobDeletion {
        PendingBlobDeletion {
            id: Uuid::new_v4(),
            storage_key: self.storage_key,
            share_code: self.share_code,
            reason: self.reason,
            attempts: 0,
            last_error: self.last_error,
            not_before: self.not_before,
            created_at: now,
        }
    }
}
