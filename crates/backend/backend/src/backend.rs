use async_trait::async_trait;

use ndadesk_core::{Identity, Nda, NdaId, NdaPatch, NewNda, Session};

use crate::error::BackendError;

/// The managed backend service: authentication plus the `ndas` table.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
/// Access control is the backend's responsibility; every row operation is
/// performed on behalf of the caller's [`Session`].
#[async_trait]
pub trait NdaBackend: Send + Sync {
    /// Short backend name used in logs and health output.
    fn name(&self) -> &str;

    /// Resolve the identity behind a session. Returns `None` when the token
    /// is unknown, expired or revoked.
    async fn current_identity(&self, session: &Session) -> Result<Option<Identity>, BackendError>;

    /// Exchange email and password for a new session.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Session, Identity), BackendError>;

    /// Terminate a session. Signing out an unknown session is not an error.
    async fn sign_out(&self, session: &Session) -> Result<(), BackendError>;

    /// Fetch every NDA, most recently sent first.
    async fn list_ndas(&self, session: &Session) -> Result<Vec<Nda>, BackendError>;

    /// Insert a new NDA and return the stored record with its assigned id.
    async fn insert_nda(&self, session: &Session, new: &NewNda) -> Result<Nda, BackendError>;

    /// Apply `patch` to the record with `id` and return the updated record.
    ///
    /// Returns [`BackendError::NotFound`] when no record matches, and
    /// [`BackendError::Locked`] when `patch.unless_locked` is set and the
    /// record is locked. The lock check and the write must be a single
    /// conditional update.
    async fn update_nda(
        &self,
        session: &Session,
        id: &NdaId,
        patch: &NdaPatch,
    ) -> Result<Nda, BackendError>;
}
