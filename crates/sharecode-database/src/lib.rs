//! # sharecode-database
//!
//! PostgreSQL connection management, migrations, and the persistent stores
//! behind the share registry. Each store is a trait with a PostgreSQL
//! implementation and an in-memory one for development and tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use sharecode_core::config::{DatabaseBackend, DatabaseConfig};
use sharecode_core::result::AppResult;

pub use connection::connect_pool;
pub use store::{BlobDeletionQueue, ShareStore};

/// The set of stores selected by configuration.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Share entries.
    pub shares: Arc<dyn ShareStore>,
    /// Blob keys awaiting deletion.
    pub deletions: Arc<dyn BlobDeletionQueue>,
    /// The PostgreSQL pool, when that backend is in use.
    pub pool: Option<PgPool>,
}

impl Stores {
    /// Open the configured backend, running migrations when asked to.
    pub async fn open(config: &DatabaseConfig) -> AppResult<Self> {
        match config.backend {
            DatabaseBackend::Postgres => {
                let pool = connect_pool(config).await?;
                if config.run_migrations {
                    migration::run_migrations(&pool).await?;
                }
                Ok(Self {
                    shares: Arc::new(repositories::ShareRepository::new(pool.clone())),
                    deletions: Arc::new(repositories::PendingDeletionRepository::new(
                        pool.clone(),
                    )),
                    pool: Some(pool),
                })
            }
            DatabaseBackend::Memory => {
                info!("Using in-memory share store; entries do not survive a restart");
                Ok(Self::in_memory())
            }
        }
    }

    /// Fresh in-memory stores.
    pub fn in_memory() -> Self {
        Self {
            shares: Arc::new(memory::MemoryShareStore::new()),
            deletions: Arc::new(memory::MemoryDeletionQueue::new()),
            pool: None,
        }
    }

    /// Close the underlying pool, if any.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
            info!("Database pool closed");
        }
    }
}
