//! Authenticated actor and the bearer session that proves it.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// The authenticated actor behind a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Identity {
    /// Backend user id, recorded as `created_by` on new records.
    pub id: UserId,
    /// Sign-in email, if the backend exposes one.
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    #[must_use]
    pub fn new(id: impl Into<UserId>, email: Option<String>) -> Self {
        Self {
            id: id.into(),
            email,
        }
    }
}

/// An opaque bearer token issued by the backend's auth service.
///
/// The token is wrapped in [`SecretString`] so it is redacted from `Debug`
/// output and never ends up in logs.
#[derive(Debug, Clone)]
pub struct Session {
    access_token: SecretString,
}

impl Session {
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
        }
    }

    /// The raw token, for building `Authorization` headers and cookies.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }
}
