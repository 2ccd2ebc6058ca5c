use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use common::config::StorageConfig;
use common::{Product, ProductId};
use tracing::{info, instrument};

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

/// Multipart field carrying the image files.
const IMAGES_FIELD: &str = "images";
/// Multipart field carrying the optional category label.
const CATEGORY_FIELD: &str = "category";

pub fn upload_body_limit(storage: &StorageConfig) -> DefaultBodyLimit {
    DefaultBodyLimit::max(storage.upload_body_limit())
}

/// A file part read fully into memory, not yet written anywhere.
struct PendingFile {
    name: String,
    data: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Products",
    operation_id = "uploadProducts",
    summary = "Upload product images",
    description = "Accepts up to `storage.max_files` (default 20) files in the `images` multipart \
        field and an optional `category` text field. Each file may be at most \
        `storage.max_file_size` bytes (default 50 MiB). Text parts named `images` are ignored. \
        Each file becomes one product tagged with the category (or `uncategorized` when it is \
        missing or empty). On success the client is redirected to the dashboard.",
    request_body(content_type = "multipart/form-data", description = "Images with optional category"),
    responses(
        (status = 302, description = "Products created, redirect to the dashboard"),
        (status = 400, description = "No files, too many files or malformed body (VALIDATION_ERROR)", body = ErrorBody),
        (status = 413, description = "A file or the whole body is over its size limit (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 500, description = "Storage failure (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_products(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let limits = &state.config.storage;

    let mut files: Vec<PendingFile> = Vec::new();
    let mut category: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some(IMAGES_FIELD) | Some("images[]") => {
                // Plain text parts are form values, not files.
                let Some(name) = field.file_name().map(str::to_string) else {
                    continue;
                };
                let data = read_field_limited(field, limits.max_file_size).await?;

                // An empty file input still submits a nameless, empty part.
                if name.is_empty() && data.is_empty() {
                    continue;
                }
                if files.len() >= limits.max_files {
                    return Err(AppError::Validation(format!(
                        "At most {} images can be uploaded at once",
                        limits.max_files
                    )));
                }
                files.push(PendingFile { name, data });
            }
            Some(CATEGORY_FIELD) => {
                category = Some(field.text().await?);
            }
            _ => {} // Ignore unknown fields.
        }
    }

    if files.is_empty() {
        return Err(AppError::Validation(
            "No images were selected for upload".into(),
        ));
    }

    let mut txn = state.records.begin().await?;
    for file in &files {
        let blob = state.blob_store.put(&file.name, &file.data).await?;
        let id = unused_id(&txn);
        txn.push(Product::new(id, category.as_deref(), blob.url()));
    }
    txn.commit().await?;

    info!(
        count = files.len(),
        category = category.as_deref().unwrap_or_default(),
        "Stored uploaded images"
    );

    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, limits.dashboard_path.clone())],
    )
        .into_response())
}

/// Generate an id not already present in `records`.
fn unused_id(records: &[Product]) -> ProductId {
    loop {
        let id = ProductId::generate();
        if !records.iter().any(|p| p.id == id) {
            return id;
        }
    }
}

/// Read a multipart field into memory, rejecting it once it exceeds `max_size`.
async fn read_field_limited(
    mut field: axum::extract::multipart::Field<'_>,
    max_size: u64,
) -> Result<Vec<u8>, AppError> {
    let mut data = Vec::new();

    while let Some(chunk) = field.chunk().await? {
        if (data.len() + chunk.len()) as u64 > max_size {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds maximum size of {max_size} bytes"
            )));
        }
        data.extend_from_slice(&chunk);
    }

    Ok(data)
}
