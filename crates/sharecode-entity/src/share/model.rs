//! Share entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::code::ShareCode;
use super::expiration::ExpirationPolicy;
use super::file::FileRecord;

/// A registered share: the files a sharer uploaded plus the code that
/// unlocks them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareEntry {
    /// The share code (primary key).
    pub share_code: ShareCode,
    /// Files in upload order. Never empty and never modified after creation.
    pub files: Vec<FileRecord>,
    /// Sum of `files[*].size_bytes` at creation.
    pub total_size_bytes: u64,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// Lifetime in seconds from `created_at`.
    pub expires_in_seconds: i64,
    /// `created_at + expires_in_seconds`, stored so expired rows can be
    /// found with an index scan.
    pub expires_at: DateTime<Utc>,
    /// Whether the first successful retrieval destroys the entry.
    pub one_time_code: bool,
}

impl ShareEntry {
    /// Assemble an entry from its parts, deriving the total size and the
    /// expiration instant.
    ///
    /// Returns `None` when the sizes overflow `u64`.
    pub fn assemble(
        share_code: ShareCode,
        files: Vec<FileRecord>,
        created_at: DateTime<Utc>,
        policy: ExpirationPolicy,
        one_time_code: bool,
    ) -> Option<Self> {
        let total_size_bytes = files
            .iter()
            .try_fold(0u64, |acc, f| acc.checked_add(f.size_bytes))?;
        Some(Self {
            share_code,
            files,
            total_size_bytes,
            created_at,
            expires_in_seconds: policy.expires_in_seconds,
            expires_at: policy.expires_at(created_at),
            one_time_code,
        })
    }

    /// Whether the entry's expiration instant is at or before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Blob store keys of every file in the entry.
    pub fn storage_keys(&self) -> Vec<String> {
        self.files.iter().map(|f| f.storage_key.clone()).collect()
    }

    /// Number of files in the entry.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Input for creating a share entry. The code and timestamps are assigned by
/// the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShareEntry {
    /// Files to register, in upload order.
    pub files: Vec<FileRecord>,
    /// Requested lifetime. `None` uses the configured default.
    pub expiration: Option<ExpirationPolicy>,
    /// Whether the entry is destroyed on first retrieval.
    pub one_time_code: bool,
}
