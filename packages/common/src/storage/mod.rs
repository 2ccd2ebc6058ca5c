mod error;
mod naming;
mod traits;

pub mod filesystem;
pub mod records;

pub use error::StorageError;
pub use naming::{BlobRef, UPLOAD_URL_PREFIX, generate_blob_name, sanitize_filename};
pub use traits::BlobStore;
