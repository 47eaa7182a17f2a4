//! The NDA record and the payloads used to create and mutate it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{NdaId, UserId};

/// Lifecycle status of an NDA as stored by the backend.
///
/// Only `sent` is ever written by the dashboard. Other values (e.g. `signed`)
/// are produced elsewhere and are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NdaStatus {
    /// The NDA was sent and is awaiting signature.
    #[default]
    Sent,
    /// The customer signed the NDA.
    Signed,
    /// Any status this dashboard does not know about.
    Other(String),
}

impl NdaStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Sent => "sent",
            Self::Signed => "signed",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for NdaStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "sent" => Self::Sent,
            "signed" => Self::Signed,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for NdaStatus {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<NdaStatus> for String {
    fn from(status: NdaStatus) -> Self {
        match status {
            NdaStatus::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for NdaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted NDA record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Nda {
    /// Unique identifier assigned by the backend.
    pub id: NdaId,
    /// Customer display name.
    #[cfg_attr(feature = "openapi", schema(example = "Acme Co"))]
    pub customer_name: String,
    /// Customer email address.
    #[cfg_attr(feature = "openapi", schema(example = "legal@acme.com"))]
    pub customer_email: String,
    /// When the NDA was sent. Immutable after creation.
    pub sent_date: DateTime<Utc>,
    /// When the most recent reminder was sent, if any.
    #[serde(default)]
    pub reminder_sent: Option<DateTime<Utc>>,
    /// Current status.
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "sent"))]
    pub status: NdaStatus,
    /// Locked records no longer accept reminders.
    #[serde(default)]
    pub locked: bool,
    /// Link to the signed document. Written by an external signing flow.
    #[serde(default)]
    pub file_url: Option<String>,
    /// User who created the record.
    pub created_by: UserId,
}

impl Nda {
    /// Materialize a freshly inserted record from its insert payload.
    #[must_use]
    pub fn from_new(id: NdaId, new: &NewNda) -> Self {
        Self {
            id,
            customer_name: new.customer_name.clone(),
            customer_email: new.customer_email.clone(),
            sent_date: new.sent_date,
            reminder_sent: None,
            status: new.status.clone(),
            locked: new.locked,
            file_url: None,
            created_by: new.created_by.clone(),
        }
    }

    /// Whether the reminder action may be offered for this record.
    #[must_use]
    pub fn accepts_reminders(&self) -> bool {
        !self.locked
    }
}

/// Insert payload for a new NDA.
///
/// Construct with [`NewNda::draft`], which pins the creation defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewNda {
    pub customer_name: String,
    pub customer_email: String,
    pub sent_date: DateTime<Utc>,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub status: NdaStatus,
    pub locked: bool,
    pub created_by: UserId,
}

impl NewNda {
    /// Build the insert payload for an NDA sent at `now` by `created_by`.
    ///
    /// Status is always `sent` and the record starts unlocked.
    #[must_use]
    pub fn draft(
        customer_name: impl Into<String>,
        customer_email: impl Into<String>,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            customer_name: customer_name.into(),
            customer_email: customer_email.into(),
            sent_date: now,
            status: NdaStatus::Sent,
            locked: false,
            created_by,
        }
    }
}

/// Field-level changes applied by update-by-id.
///
/// Only the mutable fields are representable; `id`, `sent_date` and
/// `created_by` cannot be patched. `unless_locked` is a row filter, not a
/// column: backends must apply the patch only to a record that is unlocked
/// at the moment of the update and fail with a locked error otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NdaPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_sent: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(skip)]
    pub unless_locked: bool,
}

impl NdaPatch {
    /// Record a reminder sent at `at`. Locked records refuse it.
    #[must_use]
    pub fn reminder(at: DateTime<Utc>) -> Self {
        Self {
            reminder_sent: Some(at),
            unless_locked: true,
            ..Self::default()
        }
    }

    /// Set the lock flag.
    #[must_use]
    pub fn lock(locked: bool) -> Self {
        Self {
            locked: Some(locked),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reminder_sent.is_none() && self.locked.is_none()
    }

    /// Whether this patch may be applied to `nda` in its current state.
    #[must_use]
    pub fn permits(&self, nda: &Nda) -> bool {
        !(self.unless_locked && nda.locked)
    }

    /// Apply the present fields to `nda`, leaving the rest untouched.
    pub fn apply(&self, nda: &mut Nda) {
        if let Some(at) = self.reminder_sent {
            nda.reminder_sent = Some(at);
        }
        if let Some(locked) = self.locked {
            nda.locked = locked;
        }
    }
}

/// Order records most recently sent first.
///
/// The sort is stable, so records sharing a `sent_date` keep the order the
/// backend returned them in.
pub fn sort_by_sent_date_desc(ndas: &mut [Nda]) {
    ndas.sort_by(|a, b| b.sent_date.cmp(&a.sent_date));
}

/// Why an email address was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("email is required")]
    Empty,
    #[error("email must not contain whitespace")]
    Whitespace,
    #[error("email must contain a single '@'")]
    MissingAt,
    #[error("email is missing the part before '@'")]
    EmptyLocal,
    #[error("email is missing the domain after '@'")]
    EmptyDomain,
}

/// Minimal syntax check matching what a browser `type=email` input enforces.
pub fn validate_email(email: &str) -> Result<(), EmailError> {
    if email.is_empty() {
        return Err(EmailError::Empty);
    }
    if email.chars().any(char::is_whitespace) {
        return Err(EmailError::Whitespace);
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(EmailError::MissingAt);
    };
    if domain.contains('@') {
        return Err(EmailError::MissingAt);
    }
    if local.is_empty() {
        return Err(EmailError::EmptyLocal);
    }
    if domain.is_empty() || domain.starts_with('.') || domain.ends_with('.') {
        return Err(EmailError::EmptyDomain);
    }
    Ok(())
}
