use thiserror::Error;

/// Errors from backend auth and row operations.
///
/// The `Display` form of [`BackendError::Rejected`] is the backend's own
/// message, so it can be shown to the user verbatim.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("not authenticated: {0}")]
    Unauthorized(String),

    #[error("record not found: {0}")]
    NotFound(String),

    /// The record exists but is locked against the attempted change.
    #[error("record is locked: {0}")]
    Locked(String),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}
