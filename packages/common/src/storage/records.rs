use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard};
use tracing::warn;

use super::error::StorageError;
use crate::product::Product;

/// Product list persisted as a single JSON document.
///
/// Every mutation rewrites the whole file through a temp file and an atomic
/// rename. Mutations within this process are serialized by `write_lock`.
pub struct JsonRecordStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonRecordStore {
    /// Open the store, creating the backing file with an empty list if absent.
    pub async fn open(path: PathBuf) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        let store = Self {
            path,
            write_lock: Mutex::new(()),
        };

        if !fs::try_exists(&store.path).await? {
            store.save(&[]).await?;
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record. A missing file reads as an empty store.
    pub async fn load(&self) -> Result<Vec<Product>, StorageError> {
        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&data).map_err(StorageError::Corrupt)
    }

    /// Read every record, treating any failure as an empty store.
    pub async fn load_or_empty(&self) -> Vec<Product> {
        match self.load().await {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Record store unreadable, serving empty list"
                );
                Vec::new()
            }
        }
    }

    /// Overwrite the backing file with `records`.
    pub async fn save(&self, records: &[Product]) -> Result<(), StorageError> {
        let data = serde_json::to_vec_pretty(records).map_err(StorageError::Serialize)?;
        let temp_path = self.temp_path();

        let result = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp_path, &self.path).await
        }
        .await;

        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Start a read-modify-write cycle.
    ///
    /// The returned transaction holds the store's write lock until it is
    /// committed or dropped. Dropping without [`RecordTxn::commit`] discards
    /// the changes.
    pub async fn begin(&self) -> Result<RecordTxn<'_>, StorageError> {
        let guard = self.write_lock.lock().await;
        let records = self.load().await?;
        Ok(RecordTxn {
            store: self,
            records,
            _guard: guard,
        })
    }

    /// Temp file next to the target so the rename stays on one filesystem.
    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "records".to_string());
        self.path
            .with_file_name(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4()))
    }
}

/// In-flight read-modify-write cycle on a [`JsonRecordStore`].
pub struct RecordTxn<'a> {
    store: &'a JsonRecordStore,
    records: Vec<Product>,
    _guard: MutexGuard<'a, ()>,
}

impl RecordTxn<'_> {
    /// Persist the modified list and release the lock.
    pub async fn commit(self) -> Result<(), StorageError> {
        self.store.save(&self.records).await
    }
}

impl Deref for RecordTxn<'_> {
    type Target = Vec<Product>;

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl DerefMut for RecordTxn<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.records
    }
}
