//! Blob storage for generated media artifacts

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

use crate::error::{GenerationError, Result};

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under `name`, returning a stable public reference
    async fn put(&self, name: &str, bytes: &[u8], content_type: &str) -> Result<String>;
}

/// Disk-backed store: files under a media directory, addressed through a
/// configured public base URL
#[derive(Debug)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base: String,
}

impl LocalBlobStore {
    pub fn new(root: PathBuf, public_base: &str) -> Self {
        Self {
            root,
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, name: &str, bytes: &[u8], _content_type: &str) -> Result<String> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            GenerationError::ProviderCall(format!(
                "failed to create media directory {}: {}",
                self.root.display(),
                e
            ))
        })?;

        let path = self.root.join(name);
        fs::write(&path, bytes).await.map_err(|e| {
            GenerationError::ProviderCall(format!("failed to write {}: {}", path.display(), e))
        })?;

        Ok(format!("{}/{}", self.public_base, name))
    }
}
