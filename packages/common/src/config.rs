use std::path::PathBuf;

use serde::Deserialize;

/// Where uploads and product records live, and how much an upload may carry.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory served as static assets. Default: "./public".
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
    /// Directory holding uploaded blobs. Default: "./public/uploads".
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// JSON record store file. Default: "./database.json".
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Maximum number of files accepted in one upload. Default: 20.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Maximum size of a single uploaded file in bytes. Default: 50 MiB.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Where a successful upload redirects to. Default: "/dashboard.html".
    #[serde(default = "default_dashboard_path")]
    pub dashboard_path: String,
}

fn default_public_dir() -> PathBuf {
    "./public".into()
}
fn default_upload_dir() -> PathBuf {
    "./public/uploads".into()
}
fn default_database_path() -> PathBuf {
    "./database.json".into()
}
fn default_max_files() -> usize {
    20
}
fn default_max_file_size() -> u64 {
    50 * 1024 * 1024
}
fn default_dashboard_path() -> String {
    "/dashboard.html".into()
}

impl StorageConfig {
    /// Request body cap for the upload route, with slack for multipart framing.
    pub fn upload_body_limit(&self) -> usize {
        let files = self.max_files as u64 * self.max_file_size;
        usize::try_from(files.saturating_add(1024 * 1024)).unwrap_or(usize::MAX)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            public_dir: default_public_dir(),
            upload_dir: default_upload_dir(),
            database_path: default_database_path(),
            max_files: default_max_files(),
            max_file_size: default_max_file_size(),
            dashboard_path: default_dashboard_path(),
        }
    }
}
