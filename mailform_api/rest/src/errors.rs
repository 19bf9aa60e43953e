use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mailform_core_dispatch_contracts::DispatchError;
use mailform_models::dispatch::{
    DispatchResult, MISCONFIGURED_MESSAGE, PROVIDER_FAILURE_MESSAGE, UNEXPECTED_FAILURE_MESSAGE,
};
use tracing::error;

/// Report an unexpected failure, passing its message on to the client.
pub fn internal_server_error(err: impl Into<anyhow::Error>) -> Response {
    let err = err.into();
    error!("Unhandled error in send-email handler: {err:#}");
    let message = err.to_string();
    let message = if message.is_empty() {
        UNEXPECTED_FAILURE_MESSAGE.into()
    } else {
        message
    };
    respond(DispatchResult::failure(500, message))
}

pub fn dispatch_error(err: DispatchError) -> Response {
    match err {
        DispatchError::NotConfigured => respond(DispatchResult::failure(500, MISCONFIGURED_MESSAGE)),
        DispatchError::Rejected { status, message } => respond(DispatchResult::failure(
            status,
            message.unwrap_or_else(|| PROVIDER_FAILURE_MESSAGE.into()),
        )),
        DispatchError::Other(err) => internal_server_error(err),
    }
}

pub fn respond(result: DispatchResult) -> Response {
    let status = StatusCode::from_u16(result.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(result.body())).into_response()
}
