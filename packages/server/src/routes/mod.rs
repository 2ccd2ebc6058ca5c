use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::StorageConfig;
use crate::handlers::product::*;
use crate::handlers::upload::*;
use crate::state::AppState;

/// JSON API, nested under `/api`.
pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_products))
        .routes(routes!(delete_product))
}

/// Form upload endpoint, mounted at the root so HTML forms can post to it.
pub fn upload_routes(storage: &StorageConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(upload_products))
        .layer(upload_body_limit(storage))
}
