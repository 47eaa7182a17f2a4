use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use ndadesk_core::Nda;
use ndadesk_dashboard::NdaForm;

/// Generic error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    #[schema(example = "not signed in")]
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status indicator.
    #[schema(example = "ok")]
    pub status: String,
    /// Name of the configured backend.
    #[schema(example = "supabase")]
    pub backend: String,
}

/// Every NDA visible to the caller, most recently sent first.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListNdasResponse {
    pub ndas: Vec<Nda>,
    #[schema(example = 3)]
    pub total: usize,
}

/// Request body for `POST /v1/ndas`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateNdaRequest {
    #[schema(example = "Acme Co")]
    pub customer_name: String,
    #[schema(example = "legal@acme.com")]
    pub customer_email: String,
}

impl From<CreateNdaRequest> for NdaForm {
    fn from(req: CreateNdaRequest) -> Self {
        Self::new(req.customer_name, req.customer_email)
    }
}

/// Request body for `POST /v1/ndas/{id}/lock`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LockRequest {
    /// The lock state the caller currently sees; the record is set to its
    /// negation.
    #[schema(example = false)]
    pub locked: bool,
}
