//! JSON API over the dashboard commands.
//!
//! Authenticated with `Authorization: Bearer <access token>`, the same token
//! the page flow keeps in its cookie.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use ndadesk_core::NdaId;
use ndadesk_dashboard::NdaForm;

use crate::error::ServerError;

use super::AppState;
use super::schemas::{CreateNdaRequest, ErrorResponse, ListNdasResponse, LockRequest};
use super::session::BearerSession;

/// `GET /v1/ndas` -- list every NDA.
#[utoipa::path(
    get,
    path = "/v1/ndas",
    tag = "NDAs",
    summary = "List NDAs",
    description = "Returns every NDA visible to the caller, sorted by sent date, newest first.",
    responses(
        (status = 200, description = "All NDAs", body = ListNdasResponse),
        (status = 401, description = "Missing or expired session", body = ErrorResponse),
        (status = 502, description = "Backend failure", body = ErrorResponse),
    )
)]
pub async fn list_ndas(
    State(state): State<AppState>,
    BearerSession(session): BearerSession,
) -> Result<impl IntoResponse, ServerError> {
    let ndas = state.dashboard.list(&session).await?;
    let total = ndas.len();
    Ok(Json(ListNdasResponse { ndas, total }))
}

/// `POST /v1/ndas` -- send a new NDA.
#[utoipa::path(
    post,
    path = "/v1/ndas",
    tag = "NDAs",
    summary = "Send an NDA",
    description = "Creates an NDA in status `sent`, unlocked, attributed to the caller.",
    request_body = CreateNdaRequest,
    responses(
        (status = 201, description = "NDA created", body = ndadesk_core::Nda),
        (status = 400, description = "Missing name or malformed email", body = ErrorResponse),
        (status = 401, description = "Missing or expired session", body = ErrorResponse),
        (status = 409, description = "A create by this user is in progress", body = ErrorResponse),
        (status = 502, description = "Backend failure", body = ErrorResponse),
    )
)]
pub async fn create_nda(
    State(state): State<AppState>,
    BearerSession(session): BearerSession,
    Json(req): Json<CreateNdaRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let nda = state
        .dashboard
        .send_nda(&session, &NdaForm::from(req))
        .await?;
    Ok((StatusCode::CREATED, Json(nda)))
}

/// `POST /v1/ndas/{id}/reminder` -- stamp a reminder.
#[utoipa::path(
    post,
    path = "/v1/ndas/{id}/reminder",
    tag = "NDAs",
    summary = "Send a reminder",
    description = "Sets the reminder timestamp to now. Repeat reminders move it forward. Locked NDAs refuse reminders.",
    params(("id" = String, Path, description = "NDA id")),
    responses(
        (status = 200, description = "Updated NDA", body = ndadesk_core::Nda),
        (status = 401, description = "Missing or expired session", body = ErrorResponse),
        (status = 404, description = "No such NDA", body = ErrorResponse),
        (status = 409, description = "NDA is locked, or another change to it is in progress", body = ErrorResponse),
        (status = 502, description = "Backend failure", body = ErrorResponse),
    )
)]
pub async fn send_reminder(
    State(state): State<AppState>,
    BearerSession(session): BearerSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let nda = state
        .dashboard
        .send_reminder(&session, &NdaId::new(id))
        .await?;
    Ok(Json(nda))
}

/// `POST /v1/ndas/{id}/lock` -- flip the lock flag.
#[utoipa::path(
    post,
    path = "/v1/ndas/{id}/lock",
    tag = "NDAs",
    summary = "Toggle lock",
    description = "Sets `locked` to the negation of the state sent in the body.",
    params(("id" = String, Path, description = "NDA id")),
    request_body = LockRequest,
    responses(
        (status = 200, description = "Updated NDA", body = ndadesk_core::Nda),
        (status = 401, description = "Missing or expired session", body = ErrorResponse),
        (status = 404, description = "No such NDA", body = ErrorResponse),
        (status = 409, description = "Another change to this NDA is in progress", body = ErrorResponse),
        (status = 502, description = "Backend failure", body = ErrorResponse),
    )
)]
pub async fn toggle_lock(
    State(state): State<AppState>,
    BearerSession(session): BearerSession,
    Path(id): Path<String>,
    Json(req): Json<LockRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let nda = state
        .dashboard
        .toggle_lock(&session, &NdaId::new(id), req.locked)
        .await?;
    Ok(Json(nda))
}
