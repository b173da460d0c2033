//! Share entry repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use sharecode_core::error::{AppError, ErrorKind};
use sharecode_core::result::AppResult;
use sharecode_entity::share::{FileRecord, ShareCode, ShareEntry};

use crate::store::ShareStore;

/// Row shape of `share_entries`.
///
/// The total size is kept as TEXT so the full `u64` range round-trips.
#[derive(Debug, FromRow)]
struct ShareEntryRow {
    share_code: ShareCode,
    files: Json<Vec<FileRecord>>,
    total_size_bytes: String,
    created_at: DateTime<Utc>,
    expires_in_seconds: i64,
    expires_at: DateTime<Utc>,
    one_time_code: bool,
}

impl TryFrom<ShareEntryRow> for ShareEntry {
    type Error = AppError;

    fn try_from(row: ShareEntryRow) -> Result<Self, Self::Error> {
        let total_size_bytes = row.total_size_bytes.parse::<u64>().map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!(
                    "Corrupt total_size_bytes '{}' for share {}",
                    row.total_size_bytes, row.share_code
                ),
                e,
            )
        })?;
        Ok(Self {
            share_code: row.share_code,
            files: row.files.0,
            total_size_bytes,
            created_at: row.created_at,
            expires_in_seconds: row.expires_in_seconds,
            expires_at: row.expires_at,
            one_time_code: row.one_time_code,
        })
    }
}

fn into_entry(row: Option<ShareEntryRow>) -> AppResult<Option<ShareEntry>> {
    row.map(ShareEntry::try_from).transpose()
}

/// Repository for share entries.
#[derive(Debug, Clone)]
pub struct ShareRepository {
    pool: PgPool,
}

impl ShareRepository {
    /// Create a new share repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareStore for ShareRepository {
    async fn insert_if_absent(&self, entry: &ShareEntry) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO share_entries (share_code, files, total_size_bytes, created_at, \
             expires_in_seconds, expires_at, one_time_code) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (share_code) DO NOTHING",
        )
        .bind(&entry.share_code)
        .bind(Json(&entry.files))
        .bind(entry.total_size_bytes.to_string())
        .bind(entry.created_at)
        .bind(entry.expires_in_seconds)
        .bind(entry.expires_at)
        .bind(entry.one_time_code)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert share", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_by_code(&self, code: &ShareCode) -> AppResult<Option<ShareEntry>> {
        let row = sqlx::query_as::<_, ShareEntryRow>(
            "SELECT * FROM share_entries WHERE share_code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find share", e))?;

        into_entry(row)
    }

    async fn remove(&self, code: &ShareCode) -> AppResult<Option<ShareEntry>> {
        let row = sqlx::query_as::<_, ShareEntryRow>(
            "DELETE FROM share_entries WHERE share_code = $1 RETURNING *",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete share", e))?;

        into_entry(row)
    }

    async fn take_one_time(
        &self,
        code: &ShareCode,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ShareEntry>> {
        let row = sqlx::query_as::<_, ShareEntryRow>(
            "DELETE FROM share_entries \
             WHERE share_code = $1 AND one_time_code = TRUE AND expires_at > $2 \
             RETURNING *",
        )
        .bind(code)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to consume one-time share", e)
        })?;

        into_entry(row)
    }

    async fn list_expired_codes(
        &self,
        now: DateTime<Utc>,
        exclude: &[ShareCode],
        limit: i64,
    ) -> AppResult<Vec<ShareCode>> {
        let exclude: Vec<String> = exclude.iter().map(ToString::to_string).collect();
        sqlx::query_scalar::<_, ShareCode>(
            "SELECT share_code FROM share_entries \
             WHERE expires_at <= $1 AND NOT (share_code = ANY($2)) \
             ORDER BY expires_at LIMIT $3",
        )
        .bind(now)
        .bind(exclude)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list expired shares", e)
        })
    }

    async fn remove_if_expired(
        &self,
        code: &ShareCode,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ShareEntry>> {
        let row = sqlx::query_as::<_, ShareEntryRow>(
            "DELETE FROM share_entries WHERE share_code = $1 AND expires_at <= $2 RETURNING *",
        )
        .bind(code)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to delete expired share", e)
        })?;

        into_entry(row)
    }

    async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM share_entries")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count shares", e))?;
        Ok(count as u64)
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}
