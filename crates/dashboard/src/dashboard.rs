use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use ndadesk_backend::{BackendError, NdaBackend};
use ndadesk_core::{
    Identity, Nda, NdaId, NdaPatch, NewNda, Session, sort_by_sent_date_desc, validate_email,
};

use crate::error::DashboardError;
use crate::pending::{PendingActions, PendingGuard, PendingKey};
use crate::view::{Alert, DashboardPage, FormState, NdaRow};

/// Where unauthenticated visitors and signed-out users are sent.
pub const ENTRY_PATH: &str = "/";

/// Outcome of the session guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted(Identity),
    Redirect(&'static str),
}

/// What the dashboard route should produce.
#[derive(Debug, Clone)]
pub enum Screen {
    Redirect(&'static str),
    Page(Box<DashboardPage>),
}

/// Result of a list load. A failed load yields an empty list plus the error
/// message; the page stays usable either way.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub ndas: Vec<Nda>,
    pub error: Option<String>,
}

/// The "send NDA" form as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NdaForm {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
}

impl NdaForm {
    pub fn new(customer_name: impl Into<String>, customer_email: impl Into<String>) -> Self {
        Self {
            customer_name: customer_name.into(),
            customer_email: customer_email.into(),
        }
    }

    /// Trimmed `(name, email)` if both are present and the email is
    /// well-formed.
    pub fn validate(&self) -> Result<(&str, &str), DashboardError> {
        let name = self.customer_name.trim();
        let email = self.customer_email.trim();
        if name.is_empty() {
            return Err(DashboardError::InvalidInput(
                "Customer name is required".to_owned(),
            ));
        }
        validate_email(email).map_err(|e| DashboardError::InvalidInput(format!("Customer {e}")))?;
        Ok((name, email))
    }

    /// The form as it should be re-displayed after a failed submit.
    pub fn retained(&self) -> FormState {
        FormState::retained(&self.customer_name, &self.customer_email)
    }
}

/// The NDA dashboard.
///
/// Holds the injected backend and the set of in-flight mutations. Cheap to
/// share behind an `Arc`; every method takes the caller's session
/// explicitly.
pub struct Dashboard {
    backend: Arc<dyn NdaBackend>,
    pending: PendingActions,
}

impl Dashboard {
    pub fn new(backend: Arc<dyn NdaBackend>) -> Self {
        Self {
            backend,
            pending: PendingActions::new(),
        }
    }

    pub fn backend(&self) -> &Arc<dyn NdaBackend> {
        &self.backend
    }

    pub fn pending(&self) -> &PendingActions {
        &self.pending
    }

    /// Session guard. Advisory only: the backend enforces access control on
    /// every row operation regardless of what this returns.
    pub async fn guard(&self, session: Option<&Session>) -> Access {
        let Some(session) = session else {
            return Access::Redirect(ENTRY_PATH);
        };
        match self.backend.current_identity(session).await {
            Ok(Some(identity)) => Access::Granted(identity),
            Ok(None) => Access::Redirect(ENTRY_PATH),
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "identity lookup failed");
                Access::Redirect(ENTRY_PATH)
            }
        }
    }

    /// Password sign-in from the entry page.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Session, Identity), DashboardError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(DashboardError::InvalidInput(
                "Email and password are required".to_owned(),
            ));
        }
        let (session, identity) = self
            .backend
            .sign_in_with_password(email, password)
            .await
            .inspect_err(|e| warn!(backend = self.backend.name(), error = %e, "sign-in failed"))?;

        info!(user_id = %identity.id, "signed in");
        Ok((session, identity))
    }

    /// Fetch every record, most recently sent first.
    ///
    /// Ordering is re-applied locally so the result is sorted whatever the
    /// backend returns.
    pub async fn list(&self, session: &Session) -> Result<Vec<Nda>, DashboardError> {
        let mut ndas = self.backend.list_ndas(session).await?;
        sort_by_sent_date_desc(&mut ndas);
        Ok(ndas)
    }

    /// [`list`](Self::list) for the page: the snapshot is always replaced
    /// wholesale, and a failure yields an empty list plus the message.
    pub async fn load(&self, session: &Session) -> Listing {
        match self.list(session).await {
            Ok(ndas) => Listing { ndas, error: None },
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "failed to load NDAs");
                Listing {
                    ndas: Vec::new(),
                    error: Some(format!("Could not load NDAs: {e}")),
                }
            }
        }
    }

    /// Guard, load and build the page.
    pub async fn open(
        &self,
        session: Option<&Session>,
        form: FormState,
        mut alerts: Vec<Alert>,
    ) -> Screen {
        let identity = match self.guard(session).await {
            Access::Granted(identity) => identity,
            Access::Redirect(to) => return Screen::Redirect(to),
        };
        let Some(session) = session else {
            return Screen::Redirect(ENTRY_PATH);
        };

        let listing = self.load(session).await;
        if let Some(error) = listing.error {
            alerts.push(Alert::error(error));
        }
        let rows = listing
            .ndas
            .iter()
            .map(|nda| NdaRow::new(nda, self.pending.is_record_pending(&nda.id)))
            .collect();

        Screen::Page(Box::new(DashboardPage::new(
            identity.email,
            rows,
            form,
            alerts,
        )))
    }

    /// Create command: insert a new NDA sent now by the current user.
    pub async fn send_nda(&self, session: &Session, form: &NdaForm) -> Result<Nda, DashboardError> {
        let (name, email) = form.validate()?;

        let identity = self
            .backend
            .current_identity(session)
            .await?
            .ok_or(DashboardError::Unauthenticated)?;
        let _guard = self.claim(PendingKey::Create(identity.id.clone()))?;

        let new = NewNda::draft(name, email, identity.id.clone(), Utc::now());
        let nda = self.backend.insert_nda(session, &new).await.inspect_err(|e| {
            warn!(user_id = %identity.id, error = %e, "failed to send NDA");
        })?;

        info!(nda_id = %nda.id, user_id = %identity.id, "NDA sent");
        Ok(nda)
    }

    /// Reminder command: stamp `reminder_sent` with the current time.
    ///
    /// Repeated reminders are allowed and move the timestamp forward. A
    /// locked record refuses the reminder at the backend, so a stale page
    /// cannot remind past the lock.
    pub async fn send_reminder(&self, session: &Session, id: &NdaId) -> Result<Nda, DashboardError> {
        let _guard = self.claim(PendingKey::Record(id.clone()))?;

        let nda = self
            .backend
            .update_nda(session, id, &NdaPatch::reminder(Utc::now()))
            .await
            .map_err(|e| match e {
                BackendError::Locked(_) => DashboardError::Locked(id.clone()),
                e => e.into(),
            })
            .inspect_err(|e| warn!(nda_id = %id, error = %e, "failed to send reminder"))?;

        info!(nda_id = %id, "reminder sent");
        Ok(nda)
    }

    /// Lock toggle command: set `locked` to the negation of `current`.
    pub async fn toggle_lock(
        &self,
        session: &Session,
        id: &NdaId,
        current: bool,
    ) -> Result<Nda, DashboardError> {
        let _guard = self.claim(PendingKey::Record(id.clone()))?;

        let nda = self
            .backend
            .update_nda(session, id, &NdaPatch::lock(!current))
            .await
            .inspect_err(|e| warn!(nda_id = %id, error = %e, "failed to toggle lock"))?;

        info!(nda_id = %id, locked = nda.locked, "lock toggled");
        Ok(nda)
    }

    /// Logout command. Always yields the entry path; a failed sign-out is
    /// logged since the caller drops its copy of the session anyway.
    pub async fn logout(&self, session: Option<&Session>) -> &'static str {
        if let Some(session) = session {
            if let Err(e) = self.backend.sign_out(session).await {
                warn!(backend = self.backend.name(), error = %e, "sign-out failed");
            } else {
                info!("signed out");
            }
        }
        ENTRY_PATH
    }

    fn claim(&self, key: PendingKey) -> Result<PendingGuard, DashboardError> {
        self.pending
            .try_begin(key.clone())
            .ok_or(DashboardError::Busy(key))
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("backend", &self.backend.name())
            .field("pending", &self.pending.len())
            .finish()
    }
}
