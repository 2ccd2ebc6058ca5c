use async_trait::async_trait;

use super::error::StorageError;
use super::naming::BlobRef;

/// Storage for uploaded image files.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under a freshly generated name derived from `original_name`
    /// and return the public reference to them.
    async fn put(&self, original_name: &str, data: &[u8]) -> Result<BlobRef, StorageError>;

    /// Check whether a blob exists.
    async fn exists(&self, blob: &BlobRef) -> Result<bool, StorageError>;

    /// Delete a blob.
    ///
    /// Returns `true` if the blob was deleted, `false` if it did not exist.
    async fn delete(&self, blob: &BlobRef) -> Result<bool, StorageError>;
}
