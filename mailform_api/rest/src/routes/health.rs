use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use mailform_core_dispatch_contracts::DispatchService;
use serde::Serialize;

pub fn router(service: Arc<impl DispatchService>) -> Router<()> {
    Router::new()
        .route("/health", routing::get(health))
        .with_state(service)
}

#[derive(Serialize)]
struct HealthResponse {
    http: bool,
    provider: bool,
}

async fn health(service: State<Arc<impl DispatchService>>) -> Response {
    let provider = service.is_configured();

    let status = if provider {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(HealthResponse {
            http: true,
            provider,
        }),
    )
        .into_response()
}
