use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use ndadesk_backend_memory::MemoryBackend;
use ndadesk_core::Session;
use ndadesk_server::api::AppState;

// -- Helpers --------------------------------------------------------------

struct TestApp {
    router: axum::Router,
    backend: Arc<MemoryBackend>,
    session: Session,
}

fn build_app() -> TestApp {
    let backend = Arc::new(MemoryBackend::new());
    let identity = backend.add_user("admin@example.com", "hunter2");
    let session = backend.issue_session(&identity);
    let state = AppState::new(Arc::clone(&backend) as _, false).expect("state should build");
    TestApp {
        router: ndadesk_server::api::router(state),
        backend,
        session,
    }
}

impl TestApp {
    fn bearer(&self) -> String {
        format!("Bearer {}", self.session.access_token())
    }

    async fn call(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    fn get(&self, uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, self.bearer())
            .body(Body::empty())
            .unwrap()
    }

    fn post(&self, uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, self.bearer())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    async fn create(&self, name: &str, email: &str) -> serde_json::Value {
        let (status, body) = self
            .call(self.post(
                "/v1/ndas",
                &serde_json::json!({"customer_name": name, "customer_email": email}),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }
}

// -- Tests ----------------------------------------------------------------

#[tokio::test]
async fn health_returns_backend_name() {
    let app = build_app();
    let (status, body) = app
        .call(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "memory");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = build_app();
    let (status, body) = app
        .call(
            Request::builder()
                .uri("/api-doc/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/v1/ndas"].is_object());
}

#[tokio::test]
async fn missing_bearer_is_401() {
    let app = build_app();
    let (status, body) = app
        .call(Request::builder().uri("/v1/ndas").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "not signed in");
}

#[tokio::test]
async fn expired_bearer_is_401() {
    let app = build_app();
    let request = Request::builder()
        .uri("/v1/ndas")
        .header(header::AUTHORIZATION, "Bearer not-a-session")
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.call(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_returns_sent_unlocked_record() {
    let app = build_app();
    let nda = app.create("Acme Co", "a@acme.com").await;

    assert_eq!(nda["customer_name"], "Acme Co");
    assert_eq!(nda["customer_email"], "a@acme.com");
    assert_eq!(nda["status"], "sent");
    assert_eq!(nda["locked"], false);
    assert!(nda["reminder_sent"].is_null());
    assert!(nda["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(app.backend.len(), 1);
}

#[tokio::test]
async fn create_validates_input() {
    let app = build_app();
    let (status, body) = app
        .call(app.post(
            "/v1/ndas",
            &serde_json::json!({"customer_name": "", "customer_email": "a@acme.com"}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Customer name is required");
    assert!(app.backend.is_empty());
}

#[tokio::test]
async fn list_is_newest_first() {
    let app = build_app();
    for name in ["Old Co", "Mid Co", "New Co"] {
        app.create(name, "legal@example.com").await;
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    let (status, body) = app.call(app.get("/v1/ndas")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    let names: Vec<&str> = body["ndas"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["customer_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["New Co", "Mid Co", "Old Co"]);
}

#[tokio::test]
async fn reminder_and_lock_round_trip() {
    let app = build_app();
    let nda = app.create("Acme Co", "a@acme.com").await;
    let id = nda["id"].as_str().unwrap();

    let (status, reminded) = app
        .call(app.post(&format!("/v1/ndas/{id}/reminder"), &serde_json::json!({})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(reminded["reminder_sent"].is_string());

    let (status, locked) = app
        .call(app.post(
            &format!("/v1/ndas/{id}/lock"),
            &serde_json::json!({"locked": false}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(locked["locked"], true);

    let (_, unlocked) = app
        .call(app.post(
            &format!("/v1/ndas/{id}/lock"),
            &serde_json::json!({"locked": true}),
        ))
        .await;
    assert_eq!(unlocked["locked"], false);
}

#[tokio::test]
async fn reminder_on_locked_record_is_409() {
    let app = build_app();
    let nda = app.create("Acme Co", "a@acme.com").await;
    let id = nda["id"].as_str().unwrap();
    app.call(app.post(
        &format!("/v1/ndas/{id}/lock"),
        &serde_json::json!({"locked": false}),
    ))
    .await;

    let (status, body) = app
        .call(app.post(&format!("/v1/ndas/{id}/reminder"), &serde_json::json!({})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"],
        "This NDA is locked; unlock it to send a reminder"
    );

    let (_, listed) = app.call(app.get("/v1/ndas")).await;
    assert!(listed["ndas"][0]["reminder_sent"].is_null());
}

#[tokio::test]
async fn unknown_record_is_404() {
    let app = build_app();
    let (status, _) = app
        .call(app.post("/v1/ndas/missing/reminder", &serde_json::json!({})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn backend_failure_is_502_with_message() {
    let app = build_app();
    app.backend.inject_failure("upstream timed out").await;

    let (status, body) = app.call(app.get("/v1/ndas")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "upstream timed out");
}
