pub mod health;
pub mod ndas;
pub mod openapi;
pub mod pages;
pub mod schemas;
pub mod session;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use ndadesk_backend::NdaBackend;
use ndadesk_dashboard::{Dashboard, Renderer};

use crate::error::ServerError;

use self::openapi::ApiDoc;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Dashboard commands over the injected backend.
    pub dashboard: Arc<Dashboard>,
    /// Compiled page templates.
    pub renderer: Arc<Renderer>,
    /// Whether session cookies carry the `Secure` attribute.
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(backend: Arc<dyn NdaBackend>, secure_cookies: bool) -> Result<Self, ServerError> {
        Ok(Self {
            dashboard: Arc::new(Dashboard::new(backend)),
            renderer: Arc::new(Renderer::new()?),
            secure_cookies,
        })
    }
}

/// Build the Axum router with the pages, the JSON API, and Swagger UI.
pub fn router(state: AppState) -> Router {
    let pages = Router::new()
        .route("/", get(pages::entry))
        .route("/login", post(pages::login))
        .route("/logout", post(pages::logout))
        .route("/dashboard", get(pages::dashboard))
        .route("/dashboard/ndas", post(pages::create_nda))
        .route(
            "/dashboard/ndas/{id}/reminder",
            post(pages::send_reminder),
        )
        .route("/dashboard/ndas/{id}/lock", post(pages::toggle_lock));

    // Browsers only reach the pages same-origin; CORS covers the JSON API.
    let api = Router::new()
        .route("/health", get(health::health))
        .route("/v1/ndas", get(ndas::list_ndas).post(ndas::create_nda))
        .route("/v1/ndas/{id}/reminder", post(ndas::send_reminder))
        .route("/v1/ndas/{id}/lock", post(ndas::toggle_lock))
        .layer(CorsLayer::permissive());

    Router::new()
        .merge(pages)
        .merge(api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
