use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::error::StorageError;
use super::naming::{BlobRef, generate_blob_name};
use super::traits::BlobStore;

/// Filesystem-backed blob store.
///
/// Blobs live flat in `base_path` under generated names; the directory is
/// created on construction if it does not exist yet.
pub struct FilesystemBlobStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemBlobStore {
    /// Create a new filesystem blob store.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Compute the filesystem path for a blob.
    fn blob_path(&self, blob: &BlobRef) -> PathBuf {
        self.base_path.join(blob.name())
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(&self, original_name: &str, data: &[u8]) -> Result<BlobRef, StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let blob = BlobRef::from_name(&generate_blob_name(original_name))?;
        let blob_path = self.blob_path(&blob);

        if let Err(e) = fs::write(&blob_path, data).await {
            let _ = fs::remove_file(&blob_path).await;
            return Err(e.into());
        }

        Ok(blob)
    }

    async fn exists(&self, blob: &BlobRef) -> Result<bool, StorageError> {
        Ok(fs::try_exists(self.blob_path(blob)).await?)
    }

    async fn delete(&self, blob: &BlobRef) -> Result<bool, StorageError> {
        match fs::remove_file(self.blob_path(blob)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
