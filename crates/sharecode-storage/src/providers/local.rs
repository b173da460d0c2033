//! Local directory blob store provider.
//!
//! Keys map to file names directly under the root directory. Used when the
//! files are dropped into a shared volume instead of an external service.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use sharecode_core::error::{AppError, ErrorKind};
use sharecode_core::result::AppResult;
use sharecode_core::traits::blob_store::{BlobStore, UsageInfo};

/// Local filesystem blob store.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    /// Directory holding one file per key.
    root: PathBuf,
    /// Reported storage limit; zero means unknown.
    limit_bytes: u64,
}

impl LocalBlobStore {
    /// Create a new local blob store rooted at the given path.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create blob root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            limit_bytes: 0,
        })
    }

    /// Report `limit_bytes` as the storage limit.
    pub fn with_limit(mut self, limit_bytes: u64) -> Self {
        self.limit_bytes = limit_bytes;
        self
    }

    /// Resolve a key to a path inside the root, rejecting anything that
    /// could escape it.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        if key.is_empty()
            || key == "."
            || key == ".."
            || key.contains(['/', '\\', '\0'])
        {
            return Err(AppError::validation(format!("Invalid blob key: {key:?}")));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.is_dir())
    }

    async fn delete_files(&self, keys: &[String]) -> AppResult<u64> {
        let mut deleted = 0;
        for key in keys {
            let path = self.resolve(key)?;
            match fs::remove_file(&path).await {
                Ok(()) => deleted += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(key, "Blob already absent");
                }
                Err(e) => {
                    return Err(AppError::with_source(
                        ErrorKind::Storage,
                        format!("Failed to delete blob: {key}"),
                        e,
                    ));
                }
            }
        }
        Ok(deleted)
    }

    async fn usage(&self) -> AppResult<UsageInfo> {
        let mut entries = fs::read_dir(&self.root).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read blob root", e)
        })?;

        let mut total_bytes = 0u64;
        let mut files = 0u64;
        while let Some(entry) = entries.next_entry().await? {
            let meta = entry.metadata().await?;
            if meta.is_file() {
                total_bytes += meta.len();
                files += 1;
            }
        }

        Ok(UsageInfo {
            total_bytes,
            app_total_bytes: total_bytes,
            files_uploaded: files,
            limit_bytes: self.limit_bytes,
        })
    }
}
