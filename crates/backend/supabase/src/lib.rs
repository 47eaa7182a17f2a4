//! Supabase backend for NdaDesk.
//!
//! Talks to a Supabase project over its two public HTTP APIs:
//!
//! - GoTrue (`/auth/v1`) for password sign-in, identity lookup and sign-out
//! - PostgREST (`/rest/v1`) for the `ndas` table
//!
//! Every request carries the project's anon key in the `apikey` header.
//! Row requests are authorized with the caller's access token, so the
//! project's row-level security policies apply.
//!
//! ```no_run
//! use ndadesk_backend_supabase::SupabaseBackendBuilder;
//! use std::time::Duration;
//!
//! let backend = SupabaseBackendBuilder::new("https://xyzcompany.supabase.co", "anon-key")
//!     .timeout(Duration::from_secs(10))
//!     .build()
//!     .unwrap();
//! ```

mod wire;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use ndadesk_backend::{BackendError, NdaBackend};
use ndadesk_core::{Identity, Nda, NdaId, NdaPatch, NewNda, Session};

use self::wire::{ErrorBody, PasswordGrant, TokenResponse, UserResponse};

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default table holding NDA rows.
pub const DEFAULT_TABLE: &str = "ndas";

/// [`NdaBackend`] backed by a Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseBackend {
    client: Client,
    base_url: String,
    anon_key: SecretString,
    table: String,
}

/// Builder for configuring a [`SupabaseBackend`].
#[derive(Debug)]
pub struct SupabaseBackendBuilder {
    base_url: String,
    anon_key: SecretString,
    table: String,
    timeout: Duration,
    client: Option<Client>,
}

impl SupabaseBackendBuilder {
    /// Create a new builder for the project at `base_url`.
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: SecretString::new(anon_key.into()),
            table: DEFAULT_TABLE.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            client: None,
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a different table name than `ndas`.
    #[must_use]
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Use a custom reqwest Client.
    #[must_use]
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the backend.
    pub fn build(self) -> Result<SupabaseBackend, BackendError> {
        if self.base_url.is_empty() {
            return Err(BackendError::Configuration(
                "supabase url must not be empty".to_owned(),
            ));
        }
        if self.anon_key.expose_secret().is_empty() {
            return Err(BackendError::Configuration(
                "supabase anon key must not be empty".to_owned(),
            ));
        }

        let client = match self.client {
            Some(c) => c,
            None => Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| BackendError::Configuration(e.to_string()))?,
        };

        Ok(SupabaseBackend {
            client,
            base_url: self.base_url,
            anon_key: self.anon_key,
            table: self.table,
        })
    }
}

impl SupabaseBackend {
    /// Create a builder for advanced configuration.
    pub fn builder(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
    ) -> SupabaseBackendBuilder {
        SupabaseBackendBuilder::new(base_url, anon_key)
    }

    /// Get the project base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    fn rest_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    /// Attach the anon key and a bearer token (the session's, or the anon
    /// key itself for unauthenticated auth calls).
    fn authorize(&self, req: RequestBuilder, session: Option<&Session>) -> RequestBuilder {
        let anon = self.anon_key.expose_secret();
        let bearer = session.map_or(anon.as_str(), Session::access_token);
        req.header("apikey", anon)
            .header("Authorization", format!("Bearer {bearer}"))
    }

    async fn send(req: RequestBuilder) -> Result<Response, BackendError> {
        req.send()
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))
    }

    async fn fetch_nda(&self, session: &Session, id: &NdaId) -> Result<Option<Nda>, BackendError> {
        let filter = format!("eq.{id}");
        let req = self
            .authorize(self.client.get(self.rest_url()), Some(session))
            .query(&[("select", "*"), ("id", filter.as_str())]);
        Ok(Self::rows(Self::send(req).await?).await?.into_iter().next())
    }

    async fn rows(response: Response) -> Result<Vec<Nda>, BackendError> {
        if response.status().is_success() {
            response
                .json::<Vec<Nda>>()
                .await
                .map_err(|e| BackendError::Serialization(e.to_string()))
        } else {
            Err(error_from(response).await)
        }
    }
}

/// Turn a non-success response into a [`BackendError`], preferring the
/// backend's own message.
async fn error_from(response: Response) -> BackendError {
    let status = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_owned()
        });

    if status == StatusCode::UNAUTHORIZED {
        BackendError::Unauthorized(message)
    } else {
        BackendError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl NdaBackend for SupabaseBackend {
    fn name(&self) -> &str {
        "supabase"
    }

    async fn current_identity(&self, session: &Session) -> Result<Option<Identity>, BackendError> {
        let req = self.authorize(self.client.get(self.auth_url("user")), Some(session));
        let response = Self::send(req).await?;

        match response.status() {
            s if s.is_success() => {
                let user = response
                    .json::<UserResponse>()
                    .await
                    .map_err(|e| BackendError::Serialization(e.to_string()))?;
                Ok(Some(user.into()))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            _ => Err(error_from(response).await),
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Session, Identity), BackendError> {
        let req = self
            .authorize(self.client.post(self.auth_url("token")), None)
            .query(&[("grant_type", "password")])
            .json(&PasswordGrant { email, password });
        let response = Self::send(req).await?;

        if !response.status().is_success() {
            // GoTrue answers bad credentials with 400; keep the message.
            return Err(match error_from(response).await {
                BackendError::Unauthorized(message) => BackendError::Rejected {
                    status: 401,
                    message,
                },
                other => other,
            });
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| BackendError::Serialization(e.to_string()))?;
        debug!(user_id = %token.user.id, "supabase session issued");
        Ok((Session::new(token.access_token), token.user.into()))
    }

    async fn sign_out(&self, session: &Session) -> Result<(), BackendError> {
        let req = self.authorize(self.client.post(self.auth_url("logout")), Some(session));
        let response = Self::send(req).await?;

        match response.status() {
            s if s.is_success() => Ok(()),
            // Already expired or revoked.
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(()),
            _ => Err(error_from(response).await),
        }
    }

    async fn list_ndas(&self, session: &Session) -> Result<Vec<Nda>, BackendError> {
        let req = self
            .authorize(self.client.get(self.rest_url()), Some(session))
            .query(&[("select", "*"), ("order", "sent_date.desc")]);
        Self::rows(Self::send(req).await?).await
    }

    async fn insert_nda(&self, session: &Session, new: &NewNda) -> Result<Nda, BackendError> {
        let req = self
            .authorize(self.client.post(self.rest_url()), Some(session))
            .header("Prefer", "return=representation")
            .json(new);
        Self::rows(Self::send(req).await?)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                BackendError::Serialization("insert returned no representation".to_owned())
            })
    }

    async fn update_nda(
        &self,
        session: &Session,
        id: &NdaId,
        patch: &NdaPatch,
    ) -> Result<Nda, BackendError> {
        let filter = format!("eq.{id}");
        let mut req = self
            .authorize(self.client.patch(self.rest_url()), Some(session))
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=representation")
            .json(patch);
        if patch.unless_locked {
            req = req.query(&[("locked", "eq.false")]);
        }

        if let Some(nda) = Self::rows(Self::send(req).await?).await?.into_iter().next() {
            return Ok(nda);
        }
        // Nothing matched: tell a locked record apart from a missing one.
        if patch.unless_locked && self.fetch_nda(session, id).await?.is_some() {
            return Err(BackendError::Locked(id.to_string()));
        }
        Err(BackendError::NotFound(id.to_string()))
    }
}
