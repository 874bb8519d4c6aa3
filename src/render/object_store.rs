use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::errors::internal::ReportError;
use crate::errors::InternalError;

/// Durable binary store with caller-chosen opaque keys.
///
/// Append-mostly: a key referenced by a report version is never overwritten,
/// so old documents stay retrievable indefinitely.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String, InternalError>;
    async fn get(&self, key: &str) -> Result<Vec<u8>, InternalError>;
}

/// Filesystem-backed object store.
///
/// Keys map to paths under the root; path separators in keys become
/// directories, anything else unsafe is rejected.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, InternalError> {
        if key.is_empty() || key.split('/').any(|part| part.is_empty() || part == "." || part == "..") {
            return Err(ReportError::upstream("object_store", format!("invalid key: {}", key)).into());
        }
        Ok(self.root.join(Path::new(key)))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> Result<String, InternalError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ReportError::upstream("object_store", e.to_string()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ReportError::upstream("object_store", e.to_string()))?;

        Ok(key.to_string())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, InternalError> {
        let path = self.path_for(key)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| ReportError::upstream("object_store", format!("{}: {}", key, e)).into())
    }
}
