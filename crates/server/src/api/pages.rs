//! Server-rendered pages: the sign-in entry page and the dashboard.
//!
//! Successful mutations answer `303 See Other` back to the dashboard
//! (post/redirect/get) so the list is reloaded by the follow-up `GET`.
//! Failures re-render the dashboard in place with an alert.

use axum::Form;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

use ndadesk_core::{NdaId, Session};
use ndadesk_dashboard::{
    Access, Alert, DashboardError, ENTRY_PATH, EntryPage, FormState, NdaForm, Notice, Screen,
};

use crate::error::{ServerError, dashboard_status};

use super::AppState;
use super::session::{CookieSession, clear_session_cookie, session_cookie};

pub const DASHBOARD_PATH: &str = "/dashboard";

/// Query string of `GET /dashboard`.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// `open` shows the "send NDA" form.
    pub form: Option<String>,
    /// Success notice code carried across a redirect.
    pub notice: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LockForm {
    /// Lock state shown on the page when the button was pressed.
    pub locked: bool,
}

/// `GET /` -- sign-in page, or straight to the dashboard when signed in.
pub async fn entry(
    State(state): State<AppState>,
    CookieSession(session): CookieSession,
) -> Result<Response, ServerError> {
    if let Access::Granted(_) = state.dashboard.guard(session.as_ref()).await {
        return Ok(Redirect::to(DASHBOARD_PATH).into_response());
    }
    let html = state.renderer.entry(&EntryPage::default())?;
    Ok(Html(html).into_response())
}

/// `POST /login` -- password sign-in.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, ServerError> {
    match state.dashboard.sign_in(&form.email, &form.password).await {
        Ok((session, _identity)) => {
            let cookie = session_cookie(&session, state.secure_cookies)?;
            Ok(([(SET_COOKIE, cookie)], Redirect::to(DASHBOARD_PATH)).into_response())
        }
        Err(e) => {
            let page = EntryPage {
                email: form.email,
                error: Some(e.to_string()),
            };
            let html = state.renderer.entry(&page)?;
            Ok((dashboard_status(&e), Html(html)).into_response())
        }
    }
}

/// `GET /dashboard` -- guard, load and render.
pub async fn dashboard(
    State(state): State<AppState>,
    CookieSession(session): CookieSession,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, ServerError> {
    let form = if query.form.as_deref() == Some("open") {
        FormState::open()
    } else {
        FormState::hidden()
    };
    let alerts = query
        .notice
        .as_deref()
        .and_then(Notice::from_code)
        .map(Notice::alert)
        .into_iter()
        .collect();
    render(&state, session.as_ref(), form, alerts, StatusCode::OK).await
}

/// `POST /dashboard/ndas` -- create command.
pub async fn create_nda(
    State(state): State<AppState>,
    CookieSession(session): CookieSession,
    Form(form): Form<NdaForm>,
) -> Result<Response, ServerError> {
    let Some(session) = session else {
        return Ok(Redirect::to(ENTRY_PATH).into_response());
    };
    match state.dashboard.send_nda(&session, &form).await {
        Ok(_) => Ok(notice_redirect(Notice::NdaSent)),
        Err(e) => {
            let alert = Alert::error(format!("Error: {e}"));
            failure(&state, &session, &e, form.retained(), alert).await
        }
    }
}

/// `POST /dashboard/ndas/{id}/reminder` -- reminder command.
pub async fn send_reminder(
    State(state): State<AppState>,
    CookieSession(session): CookieSession,
    Path(id): Path<String>,
) -> Result<Response, ServerError> {
    let Some(session) = session else {
        return Ok(Redirect::to(ENTRY_PATH).into_response());
    };
    match state.dashboard.send_reminder(&session, &NdaId::new(id)).await {
        Ok(_) => Ok(notice_redirect(Notice::ReminderSent)),
        Err(e) => {
            let alert = Alert::error(format!("Could not send reminder: {e}"));
            failure(&state, &session, &e, FormState::hidden(), alert).await
        }
    }
}

/// `POST /dashboard/ndas/{id}/lock` -- lock toggle command.
pub async fn toggle_lock(
    State(state): State<AppState>,
    CookieSession(session): CookieSession,
    Path(id): Path<String>,
    Form(form): Form<LockForm>,
) -> Result<Response, ServerError> {
    let Some(session) = session else {
        return Ok(Redirect::to(ENTRY_PATH).into_response());
    };
    match state
        .dashboard
        .toggle_lock(&session, &NdaId::new(id), form.locked)
        .await
    {
        Ok(_) => Ok(Redirect::to(DASHBOARD_PATH).into_response()),
        Err(e) => {
            let verb = if form.locked { "unlock" } else { "lock" };
            let alert = Alert::error(format!("Could not {verb} NDA: {e}"));
            failure(&state, &session, &e, FormState::hidden(), alert).await
        }
    }
}

/// `POST /logout` -- end the session and clear the cookie.
pub async fn logout(
    State(state): State<AppState>,
    CookieSession(session): CookieSession,
) -> Result<Response, ServerError> {
    let to = state.dashboard.logout(session.as_ref()).await;
    let cookie = clear_session_cookie(state.secure_cookies)?;
    Ok(([(SET_COOKIE, cookie)], Redirect::to(to)).into_response())
}

fn notice_redirect(notice: Notice) -> Response {
    Redirect::to(&format!("{DASHBOARD_PATH}?notice={}", notice.code())).into_response()
}

/// A failed command: back to sign-in if the session is gone, otherwise the
/// dashboard again with the alert and the given form state.
async fn failure(
    state: &AppState,
    session: &Session,
    error: &DashboardError,
    form: FormState,
    alert: Alert,
) -> Result<Response, ServerError> {
    if error.requires_sign_in() {
        return Ok(Redirect::to(ENTRY_PATH).into_response());
    }
    render(
        state,
        Some(session),
        form,
        vec![alert],
        dashboard_status(error),
    )
    .await
}

async fn render(
    state: &AppState,
    session: Option<&Session>,
    form: FormState,
    alerts: Vec<Alert>,
    status: StatusCode,
) -> Result<Response, ServerError> {
    match state.dashboard.open(session, form, alerts).await {
        Screen::Redirect(to) => Ok(Redirect::to(to).into_response()),
        Screen::Page(page) => {
            let html = state.renderer.dashboard(&page)?;
            Ok((status, Html(html)).into_response())
        }
    }
}
