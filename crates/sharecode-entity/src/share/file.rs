//! File record entity.

use serde::{Deserialize, Serialize};

/// One uploaded file inside a share.
///
/// The size is whatever the uploader reported; it is never compared against
/// the blob store. The name is stored as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Original filename.
    pub name: String,
    /// Size in bytes as reported by the uploader.
    pub size_bytes: u64,
    /// Key of the object in the blob store.
    pub storage_key: String,
}

impl FileRecord {
    /// Create a new file record.
    pub fn new(name: impl Into<String>, size_bytes: u64, storage_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            storage_key: storage_key.into(),
        }
    }
}
