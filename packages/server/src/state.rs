use std::sync::Arc;

use common::storage::filesystem::FilesystemBlobStore;
use common::storage::records::JsonRecordStore;
use common::storage::{BlobStore, StorageError};

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub blob_store: Arc<dyn BlobStore>,
    pub records: Arc<JsonRecordStore>,
}

impl AppState {
    /// Open the blob directory and record store named in `config`, creating
    /// them if they do not exist yet.
    pub async fn init(config: AppConfig) -> Result<Self, StorageError> {
        let blob_store = FilesystemBlobStore::new(
            config.storage.upload_dir.clone(),
            config.storage.max_file_size,
        )
        .await?;
        let records = JsonRecordStore::open(config.storage.database_path.clone()).await?;

        Ok(Self {
            config,
            blob_store: Arc::new(blob_store),
            records: Arc::new(records),
        })
    }
}
