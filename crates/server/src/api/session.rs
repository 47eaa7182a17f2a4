//! Session transport: the `ndadesk_session` cookie for pages and the
//! `Authorization: Bearer` header for the JSON API.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};

use ndadesk_core::Session;
use ndadesk_dashboard::DashboardError;

use crate::error::ServerError;

/// Name of the cookie holding the backend access token.
pub const SESSION_COOKIE: &str = "ndadesk_session";

/// Read the session token from the `Cookie` header(s).
pub fn session_from_cookies(headers: &HeaderMap) -> Option<Session> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .map(Session::new)
}

/// Read the session token from `Authorization: Bearer <token>`.
pub fn session_from_bearer(headers: &HeaderMap) -> Option<Session> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| Session::new(token))
}

/// `Set-Cookie` value storing `session`.
pub fn session_cookie(session: &Session, secure: bool) -> Result<HeaderValue, ServerError> {
    cookie_header(session.access_token(), None, secure)
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(secure: bool) -> Result<HeaderValue, ServerError> {
    cookie_header("", Some(0), secure)
}

fn cookie_header(
    token: &str,
    max_age: Option<u64>,
    secure: bool,
) -> Result<HeaderValue, ServerError> {
    let mut cookie = format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/");
    if let Some(max_age) = max_age {
        cookie.push_str(&format!("; Max-Age={max_age}"));
    }
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|_| ServerError::Internal("session token is not a valid cookie value".into()))
}

/// The page session, if the browser sent one. Never rejects; the dashboard
/// guard decides what a missing session means.
#[derive(Debug, Clone)]
pub struct CookieSession(pub Option<Session>);

impl<S: Send + Sync> FromRequestParts<S> for CookieSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_from_cookies(&parts.headers)))
    }
}

/// The API session. Rejects with `401` when the header is missing.
#[derive(Debug, Clone)]
pub struct BearerSession(pub Session);

impl<S: Send + Sync> FromRequestParts<S> for BearerSession {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_from_bearer(&parts.headers)
            .map(Self)
            .ok_or(ServerError::Dashboard(DashboardError::Unauthenticated))
    }
}
