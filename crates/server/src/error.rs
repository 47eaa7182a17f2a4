use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use ndadesk_backend::BackendError;
use ndadesk_dashboard::DashboardError;

/// Errors that can occur when running the NdaDesk server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A dashboard command or render failed.
    #[error(transparent)]
    Dashboard(#[from] DashboardError),

    /// A response could not be assembled.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<BackendError> for ServerError {
    fn from(e: BackendError) -> Self {
        Self::Dashboard(DashboardError::Backend(e))
    }
}

/// HTTP status for a dashboard failure. Also used when a failure is
/// re-rendered as a page alert rather than returned as JSON.
pub fn dashboard_status(e: &DashboardError) -> StatusCode {
    match e {
        DashboardError::Unauthenticated
        | DashboardError::Backend(BackendError::Unauthorized(_)) => StatusCode::UNAUTHORIZED,
        DashboardError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DashboardError::Busy(_)
        | DashboardError::Locked(_)
        | DashboardError::Backend(BackendError::Locked(_)) => StatusCode::CONFLICT,
        DashboardError::Backend(BackendError::NotFound(_)) => StatusCode::NOT_FOUND,
        // Client errors from the backend (bad credentials, constraint
        // violations) pass through; anything else is a gateway failure.
        DashboardError::Backend(BackendError::Rejected { status, .. }) => {
            StatusCode::from_u16(*status)
                .ok()
                .filter(StatusCode::is_client_error)
                .unwrap_or(StatusCode::BAD_GATEWAY)
        }
        DashboardError::Backend(_) => StatusCode::BAD_GATEWAY,
        DashboardError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Dashboard(e) => dashboard_status(e),
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
