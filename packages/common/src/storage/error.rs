use thiserror::Error;

/// Errors that can occur in the blob or record stores.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The record store exists but does not hold a valid product list.
    #[error("record store is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
    /// Serializing the product list failed.
    #[error("failed to serialize records: {0}")]
    Serialize(#[source] serde_json::Error),
    /// A blob reference does not point at a file inside the upload directory.
    #[error("invalid blob reference: {0}")]
    InvalidReference(String),
    /// The blob exceeds the configured size limit.
    #[error("blob exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
}
