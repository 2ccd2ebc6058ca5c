use axum::Json;
use axum::extract::{Path, State};
use common::storage::BlobRef;
use common::{Product, ProductId};
use tracing::{info, instrument, warn};

use crate::error::{AppError, ErrorBody};
use crate::models::product::DeleteResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/products",
    tag = "Products",
    operation_id = "listProducts",
    summary = "List all products",
    description = "Returns every product in upload order. An unreadable record store yields an \
        empty list.",
    responses(
        (status = 200, description = "All products", body = Vec<Product>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_products(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.records.load_or_empty().await)
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "Products",
    operation_id = "deleteProduct",
    summary = "Delete a product",
    description = "Removes the product and its stored image. Deleting an unknown id succeeds \
        without changing anything.",
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted or absent", body = DeleteResponse),
        (status = 500, description = "Storage failure (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = ProductId::from(id);
    let mut txn = state.records.begin().await?;

    let Some(pos) = txn.iter().position(|p| p.id == id) else {
        info!(%id, "No product matched, nothing to delete");
        return Ok(Json(DeleteResponse { success: true }));
    };

    match BlobRef::parse(&txn[pos].image) {
        Ok(blob) => {
            if !state.blob_store.delete(&blob).await? {
                warn!(%id, blob = %blob, "Product image was already missing");
            }
        }
        Err(e) => {
            warn!(%id, error = %e, "Product image is not an upload, leaving it in place");
        }
    }

    txn.remove(pos);
    txn.commit().await?;

    info!(%id, "Deleted product");
    Ok(Json(DeleteResponse { success: true }))
}
