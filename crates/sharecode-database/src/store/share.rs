//! Share entry store trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use sharecode_core::result::AppResult;
use sharecode_entity::share::{ShareCode, ShareEntry};

/// Persistent storage for share entries.
///
/// Every mutating method is a single atomic operation on one row. Callers
/// never hold locks across calls.
#[async_trait]
pub trait ShareStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert the entry unless its code is already taken.
    ///
    /// Returns `false` on a code collision; nothing is written in that case.
    async fn insert_if_absent(&self, entry: &ShareEntry) -> AppResult<bool>;

    /// Look up an entry by exact code.
    async fn find_by_code(&self, code: &ShareCode) -> AppResult<Option<ShareEntry>>;

    /// Remove the entry and return it. `None` if there was nothing to remove.
    async fn remove(&self, code: &ShareCode) -> AppResult<Option<ShareEntry>>;

    /// Remove a one-time entry that has not expired at `now`, returning it.
    ///
    /// Of several concurrent callers at most one receives `Some`.
    async fn take_one_time(
        &self,
        code: &ShareCode,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ShareEntry>>;

    /// Codes of entries whose expiration instant is at or before `now`,
    /// oldest expiry first, skipping `exclude`, at most `limit` of them.
    async fn list_expired_codes(
        &self,
        now: DateTime<Utc>,
        exclude: &[ShareCode],
        limit: i64,
    ) -> AppResult<Vec<ShareCode>>;

    /// Remove the entry only if it is still expired at `now`, returning it.
    async fn remove_if_expired(
        &self,
        code: &ShareCode,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ShareEntry>>;

    /// Number of stored entries, expired or not.
    async fn count(&self) -> AppResult<u64>;

    /// Check whether the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
