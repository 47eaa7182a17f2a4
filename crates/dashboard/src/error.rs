use ndadesk_backend::BackendError;
use ndadesk_core::NdaId;
use thiserror::Error;

use crate::pending::PendingKey;

/// Errors from dashboard commands and rendering.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// No session, or the backend no longer recognises it.
    #[error("not signed in")]
    Unauthenticated,

    /// The submitted form failed validation.
    #[error("{0}")]
    InvalidInput(String),

    /// A mutation holding the same key is still in flight.
    #[error("{0}")]
    Busy(PendingKey),

    /// A reminder was requested for a locked record.
    #[error("This NDA is locked; unlock it to send a reminder")]
    Locked(NdaId),

    /// The backend rejected or failed the operation. Displays the backend's
    /// own message.
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("render error: {0}")]
    Render(String),
}

impl DashboardError {
    /// Whether the caller should be sent back to the entry page.
    pub fn requires_sign_in(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated | Self::Backend(BackendError::Unauthorized(_))
        )
    }
}
