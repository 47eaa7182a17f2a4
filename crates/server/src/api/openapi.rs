#![allow(clippy::needless_for_each)]

use ndadesk_core::{Nda, NdaId, UserId};

use super::schemas::{
    CreateNdaRequest, ErrorResponse, HealthResponse, ListNdasResponse, LockRequest,
};

#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "NdaDesk API",
        version = "0.1.0",
        description = "JSON API for the NdaDesk NDA dashboard. Authenticate with `Authorization: Bearer <access token>`.",
        license(name = "Apache-2.0")
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "NDAs", description = "List, send, remind and lock NDAs"),
    ),
    paths(
        super::health::health,
        super::ndas::list_ndas,
        super::ndas::create_nda,
        super::ndas::send_reminder,
        super::ndas::toggle_lock,
    ),
    components(schemas(
        Nda,
        NdaId,
        UserId,
        CreateNdaRequest,
        LockRequest,
        ListNdasResponse,
        HealthResponse,
        ErrorResponse,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::*;

    #[test]
    fn documents_every_json_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for path in [
            "/health",
            "/v1/ndas",
            "/v1/ndas/{id}/reminder",
            "/v1/ndas/{id}/lock",
        ] {
            assert!(paths.contains(&path), "missing {path} in {paths:?}");
        }
    }
}
