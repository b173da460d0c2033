//! In-memory share store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use sharecode_core::result::AppResult;
use sharecode_entity::share::{ShareCode, ShareEntry};

use crate::store::ShareStore;

/// Share store backed by a concurrent hash map.
///
/// Per-key atomicity comes from dashmap's shard locks: `entry` for
/// insert-if-absent and `remove_if` for the conditional deletes.
#[derive(Debug, Clone, Default)]
pub struct MemoryShareStore {
    entries: Arc<DashMap<ShareCode, ShareEntry>>,
}

impl MemoryShareStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShareStore for MemoryShareStore {
    async fn insert_if_absent(&self, entry: &ShareEntry) -> AppResult<bool> {
        match self.entries.entry(entry.share_code.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(entry.clone());
                Ok(true)
            }
        }
    }

    async fn find_by_code(&self, code: &ShareCode) -> AppResult<Option<ShareEntry>> {
        Ok(self.entries.get(code).map(|e| e.value().clone()))
    }

    async fn remove(&self, code: &ShareCode) -> AppResult<Option<ShareEntry>> {
        Ok(self.entries.remove(code).map(|(_, e)| e))
    }

    async fn take_one_time(
        &self,
        code: &ShareCode,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ShareEntry>> {
        Ok(self
            .entries
            .remove_if(code, |_, e| e.one_time_code && !e.is_expired_at(now))
            .map(|(_, e)| e))
    }

    async fn list_expired_codes(
        &self,
        now: DateTime<Utc>,
        exclude: &[ShareCode],
        limit: i64,
    ) -> AppResult<Vec<ShareCode>> {
        let mut expired: Vec<(DateTime<Utc>, ShareCode)> = self
            .entries
            .iter()
            .filter(|e| e.is_expired_at(now) && !exclude.contains(&e.share_code))
            .map(|e| (e.expires_at, e.share_code.clone()))
            .collect();
        expired.sort();
        Ok(expired
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|(_, code)| code)
            .collect())
    }

    async fn remove_if_expired(
        &self,
        code: &ShareCode,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ShareEntry>> {
        Ok(self
            .entries
            .remove_if(code, |_, e| e.is_expired_at(now))
            .map(|(_, e)| e))
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.entries.len() as u64)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
