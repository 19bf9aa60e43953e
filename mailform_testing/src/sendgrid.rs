use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

pub const SEND_ROUTE: &str = "/v3/mail/send";
pub const SENT_ROUTE: &str = "/v3/mail/sent";

/// Recipients in this domain are rejected with `400 Bad Request`.
pub const REJECT_DOMAIN: &str = "reject.test";
/// Recipients in this domain fail with a non-JSON `503 Service Unavailable`.
pub const BROKEN_DOMAIN: &str = "broken.test";

pub const INVALID_API_KEY_MESSAGE: &str =
    "The provided authorization grant is invalid, expired, or revoked";
pub const REJECTED_RECIPIENT_MESSAGE: &str = "The to email does not contain a valid address.";

pub async fn start_server(host: IpAddr, port: u16, api_key: String) -> anyhow::Result<()> {
    info!("Starting sendgrid testing server on {host}:{port}");
    info!("Mail send endpoint: http://{host}:{port}{SEND_ROUTE}");
    info!("Accepted mails: http://{host}:{port}{SENT_ROUTE}");
    info!("API key: {api_key:?}");
    info!(
        "Recipients @{REJECT_DOMAIN} are rejected with 400, recipients @{BROKEN_DOMAIN} fail \
         with a non-JSON 503"
    );

    let router = router(api_key, Mailbox::default());

    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind to {host}:{port}"))?;
    axum::serve(listener, router)
        .await
        .context("Failed to start HTTP server")
}

/// Start the testing server on an ephemeral localhost port in the background.
pub async fn spawn(api_key: impl Into<String>) -> anyhow::Result<(SocketAddr, Mailbox)> {
    let mailbox = Mailbox::default();
    let router = router(api_key.into(), mailbox.clone());

    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .context("Failed to bind to ephemeral port")?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move { axum::serve(listener, router).await });

    Ok((addr, mailbox))
}

pub fn router(api_key: String, mailbox: Mailbox) -> Router {
    Router::new()
        .route(SEND_ROUTE, routing::post(send))
        .route(SENT_ROUTE, routing::get(sent))
        .with_state(Arc::new(StateInner { api_key, mailbox }))
}

/// Every mail the testing server accepted, in order of arrival.
#[derive(Debug, Clone, Default)]
pub struct Mailbox(Arc<RwLock<Vec<ReceivedMail>>>);

impl Mailbox {
    pub async fn mails(&self) -> Vec<ReceivedMail> {
        self.0.read().await.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceivedMail {
    pub to_email: String,
    pub to_name: Option<String>,
    pub from_email: String,
    pub from_name: Option<String>,
    pub subject: String,
    pub content_type: String,
    pub content: String,
}

type AppState = State<Arc<StateInner>>;
struct StateInner {
    api_key: String,
    mailbox: Mailbox,
}

#[derive(Deserialize)]
struct MailSendRequest {
    personalizations: Vec<Personalization>,
    from: Address,
    subject: Option<String>,
    content: Vec<Content>,
}

#[derive(Deserialize)]
struct Personalization {
    to: Vec<Address>,
    subject: Option<String>,
}

#[derive(Deserialize)]
struct Address {
    email: String,
    name: Option<String>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(rename = "type")]
    content_type: String,
    value: String,
}

async fn send(state: AppState, headers: HeaderMap, body: String) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|key| key == state.api_key);
    if !authorized {
        return error(StatusCode::UNAUTHORIZED, None, INVALID_API_KEY_MESSAGE);
    }

    let request = match serde_json::from_str::<MailSendRequest>(&body) {
        Ok(request) => request,
        Err(err) => return error(StatusCode::BAD_REQUEST, None, &err.to_string()),
    };

    let Some(personalization) = request.personalizations.into_iter().next() else {
        return error(
            StatusCode::BAD_REQUEST,
            Some("personalizations"),
            "The personalizations field is required and must have at least one personalization.",
        );
    };
    let Some(to) = personalization.to.into_iter().next() else {
        return error(
            StatusCode::BAD_REQUEST,
            Some("personalizations.0.to"),
            "The to array is required for all personalization objects, and must have at least \
             one email object with a valid email address.",
        );
    };
    let Some(subject) = personalization.subject.or(request.subject) else {
        return error(
            StatusCode::BAD_REQUEST,
            Some("subject"),
            "The subject is required.",
        );
    };
    let Some(content) = request.content.into_iter().next() else {
        return error(
            StatusCode::BAD_REQUEST,
            Some("content"),
            "Unless a valid template_id is provided, the content parameter is required.",
        );
    };

    let domain = to.email.rsplit_once('@').map(|(_, domain)| domain);
    if domain == Some(REJECT_DOMAIN) {
        return error(
            StatusCode::BAD_REQUEST,
            Some("personalizations.0.to"),
            REJECTED_RECIPIENT_MESSAGE,
        );
    }
    if domain == Some(BROKEN_DOMAIN) {
        return (StatusCode::SERVICE_UNAVAILABLE, "upstream connect error").into_response();
    }

    state.mailbox.0.write().await.push(ReceivedMail {
        to_email: to.email,
        to_name: to.name,
        from_email: request.from.email,
        from_name: request.from.name,
        subject,
        content_type: content.content_type,
        content: content.value,
    });

    StatusCode::ACCEPTED.into_response()
}

async fn sent(state: AppState) -> Json<Vec<ReceivedMail>> {
    Json(state.mailbox.mails().await)
}

fn error(status: StatusCode, field: Option<&str>, message: &str) -> Response {
    let body = json!({
        "errors": [{ "message": message, "field": field, "help": null }],
    });
    (status, Json(body)).into_response()
}
