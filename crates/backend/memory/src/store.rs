use async_trait::async_trait;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::debug;

use ndadesk_backend::{BackendError, NdaBackend};
use ndadesk_core::{
    Identity, Nda, NdaId, NdaPatch, NewNda, Session, UserId, sort_by_sent_date_desc,
};

/// A registered account: identity plus the SHA-256 hex of its password.
#[derive(Debug, Clone)]
struct Account {
    identity: Identity,
    password_hash: String,
}

/// Hash a password to the lookup format (lowercase hex SHA-256).
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// In-process [`NdaBackend`] backed by [`DashMap`]s.
///
/// Intended for tests and local demos. Accounts, sessions and records live
/// only as long as the value. A failure can be injected with
/// [`inject_failure`](Self::inject_failure) to exercise error paths; while
/// set, every row operation is rejected with that message.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    accounts: DashMap<String, Account>,
    sessions: DashMap<String, Identity>,
    ndas: DashMap<NdaId, Nda>,
    failure: RwLock<Option<String>>,
}

impl MemoryBackend {
    /// Create a new, empty backend with no accounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account and return its identity.
    ///
    /// Registering an existing email replaces its password and keeps its id.
    pub fn add_user(&self, email: &str, password: &str) -> Identity {
        let password_hash = hash_password(password);
        let mut entry = self
            .accounts
            .entry(email.to_owned())
            .or_insert_with(|| Account {
                identity: Identity::new(
                    UserId::new(uuid::Uuid::new_v4().to_string()),
                    Some(email.to_owned()),
                ),
                password_hash: password_hash.clone(),
            });
        entry.password_hash = password_hash;
        entry.identity.clone()
    }

    /// Issue a session for `identity` without a password check.
    pub fn issue_session(&self, identity: &Identity) -> Session {
        let token = uuid::Uuid::new_v4().simple().to_string();
        self.sessions.insert(token.clone(), identity.clone());
        Session::new(token)
    }

    /// Reject every subsequent row operation with `message`.
    pub async fn inject_failure(&self, message: impl Into<String>) {
        *self.failure.write().await = Some(message.into());
    }

    /// Undo [`inject_failure`](Self::inject_failure).
    pub async fn clear_failure(&self) {
        *self.failure.write().await = None;
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.ndas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ndas.is_empty()
    }

    async fn check_failure(&self) -> Result<(), BackendError> {
        match self.failure.read().await.as_ref() {
            Some(message) => Err(BackendError::Rejected {
                status: 503,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Resolve the session or fail with `Unauthorized`, as row-level
    /// security would.
    fn require_identity(&self, session: &Session) -> Result<Identity, BackendError> {
        self.sessions
            .get(session.access_token())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BackendError::Unauthorized("invalid or expired session".to_owned()))
    }
}

#[async_trait]
impl NdaBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn current_identity(&self, session: &Session) -> Result<Option<Identity>, BackendError> {
        Ok(self
            .sessions
            .get(session.access_token())
            .map(|entry| entry.value().clone()))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Session, Identity), BackendError> {
        let identity = self
            .accounts
            .get(email)
            .filter(|account| account.password_hash == hash_password(password))
            .map(|account| account.identity.clone())
            .ok_or_else(|| BackendError::Rejected {
                status: 400,
                message: "Invalid login credentials".to_owned(),
            })?;

        let session = self.issue_session(&identity);
        debug!(user_id = %identity.id, "memory session issued");
        Ok((session, identity))
    }

    async fn sign_out(&self, session: &Session) -> Result<(), BackendError> {
        self.sessions.remove(session.access_token());
        Ok(())
    }

    async fn list_ndas(&self, session: &Session) -> Result<Vec<Nda>, BackendError> {
        self.check_failure().await?;
        self.require_identity(session)?;

        let mut ndas: Vec<Nda> = self.ndas.iter().map(|e| e.value().clone()).collect();
        sort_by_sent_date_desc(&mut ndas);
        Ok(ndas)
    }

    async fn insert_nda(&self, session: &Session, new: &NewNda) -> Result<Nda, BackendError> {
        self.check_failure().await?;
        self.require_identity(session)?;

        let id = NdaId::new(uuid::Uuid::new_v4().to_string());
        let nda = Nda::from_new(id.clone(), new);
        self.ndas.insert(id, nda.clone());
        Ok(nda)
    }

    async fn update_nda(
        &self,
        session: &Session,
        id: &NdaId,
        patch: &NdaPatch,
    ) -> Result<Nda, BackendError> {
        self.check_failure().await?;
        self.require_identity(session)?;

        let mut entry = self
            .ndas
            .get_mut(id)
            .ok_or_else(|| BackendError::NotFound(id.to_string()))?;
        // Checked under the shard lock held by `get_mut`.
        if !patch.permits(entry.value()) {
            return Err(BackendError::Locked(id.to_string()));
        }
        patch.apply(entry.value_mut());
        Ok(entry.value().clone())
    }
}
