//! Schema migrations for the share store.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use sharecode_core::error::{AppError, ErrorKind};
use sharecode_core::result::AppResult;

/// Migrations embedded from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Apply every pending migration.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    info!(
        available = MIGRATOR.iter().count(),
        "Applying share store migrations"
    );

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    info!("Share store schema is up to date");
    Ok(())
}

/// A migration and whether it has been applied.
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Migration version (the numeric file prefix).
    pub version: i64,
    /// Human-readable description from the file name.
    pub description: String,
    /// Whether the database has recorded it as applied.
    pub applied: bool,
}

/// List embedded migrations alongside what the database has applied.
pub async fn migration_status(pool: &PgPool) -> AppResult<Vec<MigrationStatus>> {
    // The bookkeeping table does not exist before the first run.
    let applied: Vec<i64> = sqlx::query_scalar(
        "SELECT version FROM _sqlx_migrations WHERE success = TRUE ORDER BY version",
    )
    .fetch_all(pool)
    .await
    .unwrap_or_default();

    Ok(MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .map(|m| MigrationStatus {
            version: m.version,
            description: m.description.to_string(),
            applied: applied.contains(&m.version),
        })
        .collect())
}
