use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use mailform_core_dispatch_contracts::DispatchService;
use mailform_models::dispatch::{
    DispatchResult, MessageBody, METHOD_NOT_ALLOWED_MESSAGE, MISSING_FIELDS_MESSAGE,
};
use tokio_util::task::TaskTracker;
use tracing::{error, info};

use crate::{
    errors::{dispatch_error, internal_server_error, respond},
    models::contact::ApiContactRequest,
};

pub const ROUTE: &str = "/api/send-email";

pub fn router<Dispatch: DispatchService>(
    service: Arc<Dispatch>,
    tasks: TaskTracker,
) -> Router<()> {
    Router::new()
        .route(
            ROUTE,
            routing::post(send_email::<Dispatch>).fallback(method_not_allowed),
        )
        .with_state(Arc::new(SendEmailState { service, tasks }))
}

struct SendEmailState<Dispatch> {
    service: Arc<Dispatch>,
    tasks: TaskTracker,
}

async fn send_email<Dispatch: DispatchService>(
    state: State<Arc<SendEmailState<Dispatch>>>,
    body: Bytes,
) -> Response {
    info!("API route {ROUTE} hit");

    let request = match serde_json::from_slice::<ApiContactRequest>(&body) {
        Ok(request) => request,
        Err(err) => return internal_server_error(err),
    };
    let Some(request) = request.validate() else {
        error!("Missing name or email in request body");
        return respond(DispatchResult::failure(400, MISSING_FIELDS_MESSAGE));
    };
    info!("Received request to send email to: {}", *request.email);

    // The provider call must finish even if the client goes away and this
    // future is dropped, so it runs on its own task.
    let service = Arc::clone(&state.service);
    let task = state
        .tasks
        .spawn(async move { service.dispatch(request).await });

    match task.await {
        Ok(Ok(())) => respond(DispatchResult::accepted()),
        Ok(Err(err)) => dispatch_error(err),
        Err(err) => internal_server_error(err),
    }
}

async fn method_not_allowed(method: Method) -> Response {
    info!("Method {method} not allowed");
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        Json(MessageBody {
            message: Some(METHOD_NOT_ALLOWED_MESSAGE.into()),
        }),
    )
        .into_response()
}
