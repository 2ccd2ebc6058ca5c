use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Client;
use reqwest::redirect::Policy;
use serde_json::Value;
use tempfile::TempDir;

use ::common::storage::BlobStore;
use catalog_server::config::{AppConfig, CorsConfig, ServerConfig, StorageConfig};
use catalog_server::state::AppState;

pub mod routes {
    pub const UPLOAD: &str = "/upload";
    pub const PRODUCTS: &str = "/api/products";

    pub fn product(id: &str) -> String {
        format!("/api/products/{id}")
    }
}

/// A running test server backed by its own temp directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub config: StorageConfig,
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// `Location` header, if any.
    pub location: Option<String>,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

/// One file part for an upload request.
pub struct UploadFile<'a> {
    pub name: &'a str,
    pub bytes: &'a [u8],
}

pub fn file<'a>(name: &'a str, bytes: &'a [u8]) -> UploadFile<'a> {
    UploadFile { name, bytes }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn with storage settings adjusted by `customize`.
    pub async fn spawn_with(customize: impl FnOnce(&mut StorageConfig)) -> Self {
        Self::build(customize, |store| store).await
    }

    /// Spawn with the filesystem blob store wrapped by `wrap`.
    pub async fn spawn_with_blob_store(
        wrap: impl FnOnce(Arc<dyn BlobStore>) -> Arc<dyn BlobStore>,
    ) -> Self {
        Self::build(|_| {}, wrap).await
    }

    async fn build(
        customize: impl FnOnce(&mut StorageConfig),
        wrap: impl FnOnce(Arc<dyn BlobStore>) -> Arc<dyn BlobStore>,
    ) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let public_dir = dir.path().join("public");
        std::fs::create_dir_all(&public_dir).expect("Failed to create public dir");
        std::fs::write(
            public_dir.join("dashboard.html"),
            "<html><body>dashboard</body></html>",
        )
        .expect("Failed to write dashboard");

        let mut storage = StorageConfig {
            upload_dir: public_dir.join("uploads"),
            public_dir,
            database_path: dir.path().join("database.json"),
            ..Default::default()
        };
        customize(&mut storage);

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            storage: storage.clone(),
        };

        let mut state = AppState::init(app_config)
            .await
            .expect("Failed to initialize storage");
        state.blob_store = wrap(state.blob_store);
        let app = catalog_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::builder()
                .redirect(Policy::none())
                .build()
                .expect("Failed to build client"),
            config: storage,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn database_path(&self) -> &Path {
        &self.config.database_path
    }

    /// Upload `files` in the `images` field, with an optional category.
    pub async fn upload(&self, files: &[UploadFile<'_>], category: Option<&str>) -> TestResponse {
        let mut form = reqwest::multipart::Form::new();
        for f in files {
            let part = reqwest::multipart::Part::bytes(f.bytes.to_vec())
                .file_name(f.name.to_string())
                .mime_str("image/png")
                .expect("Failed to set MIME type");
            form = form.part("images", part);
        }
        if let Some(category) = category {
            form = form.text("category", category.to_string());
        }
        self.upload_form(form).await
    }

    pub async fn upload_form(&self, form: reqwest::multipart::Form) -> TestResponse {
        let res = self
            .client
            .post(self.url(routes::UPLOAD))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart upload request");

        TestResponse::from_response(res).await
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    /// Current product list as returned by the API.
    pub async fn products(&self) -> Vec<Value> {
        let res = self.get(routes::PRODUCTS).await;
        assert_eq!(res.status, 200, "list failed: {}", res.text);
        res.body
            .as_array()
            .expect("product list should be an array")
            .clone()
    }

    /// On-disk path of the blob behind an `image` reference.
    pub fn blob_path(&self, image: &str) -> PathBuf {
        let name = image
            .strip_prefix("/uploads/")
            .expect("image should live under /uploads/");
        self.config.upload_dir.join(name)
    }

    /// Names of every file in the upload directory, sorted.
    pub fn blob_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.config.upload_dir)
            .expect("upload dir should exist")
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let location = res
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self {
            status,
            location,
            text,
            body,
        }
    }
}
