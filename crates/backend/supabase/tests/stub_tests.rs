//! Runs the Supabase backend against an in-process stub of the GoTrue and
//! PostgREST endpoints it uses.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use ndadesk_backend::testing::run_backend_conformance_tests;
use ndadesk_backend::{BackendError, NdaBackend};
use ndadesk_backend_supabase::{SupabaseBackend, SupabaseBackendBuilder};
use ndadesk_core::{
    Identity, Nda, NdaId, NdaPatch, NewNda, Session, UserId, sort_by_sent_date_desc,
};

const ANON_KEY: &str = "test-anon-key";

// -- Stub server ----------------------------------------------------------

#[derive(Default)]
struct Stub {
    /// email -> (password, user id)
    users: HashMap<String, (String, String)>,
    /// access token -> (user id, email)
    tokens: HashMap<String, (String, String)>,
    rows: Vec<Nda>,
    reject_inserts: Option<String>,
    requests_without_apikey: usize,
}

type Shared = Arc<Mutex<Stub>>;

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_owned)
}

async fn authed(stub: &Shared, headers: &HeaderMap) -> Result<(String, String), Response> {
    let mut guard = stub.lock().await;
    if headers.get("apikey").and_then(|v| v.to_str().ok()) != Some(ANON_KEY) {
        guard.requests_without_apikey += 1;
    }
    bearer(headers)
        .and_then(|token| guard.tokens.get(&token).cloned())
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "code": "PGRST301", "message": "JWT expired" })),
            )
                .into_response()
        })
}

async fn get_user(State(stub): State<Shared>, headers: HeaderMap) -> Response {
    match authed(&stub, &headers).await {
        Ok((id, email)) => Json(json!({ "id": id, "email": email })).into_response(),
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "code": 401, "msg": "invalid JWT" })),
        )
            .into_response(),
    }
}

#[derive(serde::Deserialize)]
struct PasswordGrant {
    email: String,
    password: String,
}

async fn token(
    State(stub): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
    Json(grant): Json<PasswordGrant>,
) -> Response {
    assert_eq!(params.get("grant_type").map(String::as_str), Some("password"));
    let mut guard = stub.lock().await;
    let Some((password, id)) = guard.users.get(&grant.email).cloned() else {
        return invalid_grant();
    };
    if password != grant.password {
        return invalid_grant();
    }
    let access_token = uuid::Uuid::new_v4().to_string();
    guard
        .tokens
        .insert(access_token.clone(), (id.clone(), grant.email.clone()));
    Json(json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires_in": 3600,
        "user": { "id": id, "email": grant.email }
    }))
    .into_response()
}

fn invalid_grant() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })),
    )
        .into_response()
}

async fn logout(State(stub): State<Shared>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer(&headers) {
        stub.lock().await.tokens.remove(&token);
    }
    StatusCode::NO_CONTENT
}

async fn list_rows(
    State(stub): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(resp) = authed(&stub, &headers).await {
        return resp;
    }
    let mut rows = stub.lock().await.rows.clone();
    if let Some(id) = params.get("id").and_then(|f| f.strip_prefix("eq.")) {
        rows.retain(|row| row.id.as_str() == id);
    }
    if params.get("order").map(String::as_str) == Some("sent_date.desc") {
        sort_by_sent_date_desc(&mut rows);
    }
    Json(rows).into_response()
}

async fn insert_row(
    State(stub): State<Shared>,
    headers: HeaderMap,
    Json(new): Json<NewNda>,
) -> Response {
    if let Err(resp) = authed(&stub, &headers).await {
        return resp;
    }
    let mut guard = stub.lock().await;
    if let Some(message) = guard.reject_inserts.clone() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "code": "23514", "message": message })),
        )
            .into_response();
    }
    let nda = Nda::from_new(NdaId::new(uuid::Uuid::new_v4().to_string()), &new);
    guard.rows.push(nda.clone());
    (StatusCode::CREATED, Json(vec![nda])).into_response()
}

async fn update_rows(
    State(stub): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    Json(patch): Json<NdaPatch>,
) -> Response {
    if let Err(resp) = authed(&stub, &headers).await {
        return resp;
    }
    let id = params
        .get("id")
        .and_then(|f| f.strip_prefix("eq."))
        .map(str::to_owned)
        .unwrap_or_default();
    let unlocked_only = params.get("locked").map(String::as_str) == Some("eq.false");
    let mut guard = stub.lock().await;
    let updated: Vec<Nda> = guard
        .rows
        .iter_mut()
        .filter(|row| row.id.as_str() == id && !(unlocked_only && row.locked))
        .map(|row| {
            patch.apply(row);
            row.clone()
        })
        .collect();
    Json(updated).into_response()
}

struct StubServer {
    addr: SocketAddr,
    stub: Shared,
}

impl StubServer {
    async fn start() -> Self {
        let stub: Shared = Arc::default();
        let app = Router::new()
            .route("/auth/v1/user", get(get_user))
            .route("/auth/v1/token", post(token))
            .route("/auth/v1/logout", post(logout))
            .route(
                "/rest/v1/ndas",
                get(list_rows).post(insert_row).patch(update_rows),
            )
            .with_state(Arc::clone(&stub));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, stub }
    }

    fn backend(&self) -> SupabaseBackend {
        SupabaseBackendBuilder::new(format!("http://{}", self.addr), ANON_KEY)
            .build()
            .unwrap()
    }

    async fn add_user(&self, email: &str, password: &str) -> Identity {
        let id = uuid::Uuid::new_v4().to_string();
        self.stub
            .lock()
            .await
            .users
            .insert(email.to_owned(), (password.to_owned(), id.clone()));
        Identity::new(UserId::new(id), Some(email.to_owned()))
    }
}

// -- Tests ----------------------------------------------------------------

#[tokio::test]
async fn conformance_against_stub() {
    let server = StubServer::start().await;
    let expected = server.add_user("admin@example.com", "hunter2").await;
    let backend = server.backend();

    let (session, identity) = backend
        .sign_in_with_password("admin@example.com", "hunter2")
        .await
        .unwrap();
    assert_eq!(identity, expected);

    run_backend_conformance_tests(&backend, &session, &identity)
        .await
        .unwrap();

    assert_eq!(
        server.stub.lock().await.requests_without_apikey,
        0,
        "every request should carry the anon key"
    );
}

#[tokio::test]
async fn bad_credentials_surface_gotrue_message() {
    let server = StubServer::start().await;
    server.add_user("admin@example.com", "hunter2").await;

    let err = server
        .backend()
        .sign_in_with_password("admin@example.com", "nope")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid login credentials");
    assert!(matches!(err, BackendError::Rejected { status: 400, .. }));
}

#[tokio::test]
async fn insert_rejection_surfaces_postgrest_message() {
    let server = StubServer::start().await;
    server.add_user("admin@example.com", "pw").await;
    let backend = server.backend();
    let (session, identity) = backend
        .sign_in_with_password("admin@example.com", "pw")
        .await
        .unwrap();

    server.stub.lock().await.reject_inserts =
        Some("new row violates row-level security policy".to_owned());

    let new = NewNda::draft("Acme Co", "a@acme.com", identity.id, chrono::Utc::now());
    let err = backend.insert_nda(&session, &new).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "new row violates row-level security policy"
    );
}

#[tokio::test]
async fn expired_session_is_unauthorized_for_rows() {
    let server = StubServer::start().await;
    let backend = server.backend();
    let session = Session::new("expired-token");

    assert!(backend.current_identity(&session).await.unwrap().is_none());
    let err = backend.list_ndas(&session).await.unwrap_err();
    assert!(
        matches!(err, BackendError::Unauthorized(ref m) if m == "JWT expired"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn unreachable_project_is_a_connection_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = SupabaseBackendBuilder::new(format!("http://{addr}"), ANON_KEY)
        .build()
        .unwrap();
    let err = backend
        .list_ndas(&Session::new("token"))
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Connection(_)), "got {err:?}");
}
