use serde::Serialize;

/// Response body of a successful delete.
#[derive(Serialize, utoipa::ToSchema)]
pub struct DeleteResponse {
    #[schema(example = true)]
    pub success: bool,
}
