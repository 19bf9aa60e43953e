use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
};
use mailform_api_rest::RestServer;
use mailform_core_dispatch_contracts::{DispatchError, MockDispatchService};
use mailform_models::contact::ContactRequest;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

#[tokio::test]
async fn accepted() {
    let dispatch = MockDispatchService::new().with_dispatch(request(), Ok(()));

    let response = send(dispatch, Method::POST, valid_body()).await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(response.headers().contains_key("X-Request-Id"));
    assert_eq!(
        body(response).await,
        json!({"message": "Email sent successfully! Check your inbox."})
    );
}

#[tokio::test]
async fn method_not_allowed() {
    for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
        let response = send(MockDispatchService::new(), method.clone(), valid_body()).await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_eq!(response.headers()[header::ALLOW], "POST");
        assert_eq!(body(response).await, json!({"message": "Method Not Allowed"}));
    }
}

#[tokio::test]
async fn missing_fields() {
    for payload in [
        json!({"email": "max.mustermann@example.de"}),
        json!({"name": "Max Mustermann"}),
        json!({}),
        json!({"name": "", "email": "max.mustermann@example.de"}),
        json!({"name": "Max Mustermann", "email": null}),
        json!({"name": false, "email": "max.mustermann@example.de"}),
        json!({"name": "Max Mustermann", "email": 0}),
    ] {
        let response = send(MockDispatchService::new(), Method::POST, payload.to_string()).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(
            body(response).await,
            json!({"message": "Missing required fields: name and email"})
        );
    }
}

#[tokio::test]
async fn malformed_json() {
    let response = send(MockDispatchService::new(), Method::POST, "{not json".into()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let message = body(response).await["message"].as_str().unwrap().to_owned();
    assert!(!message.is_empty());
    assert_ne!(message, "Missing required fields: name and email");
}

#[tokio::test]
async fn not_configured() {
    let dispatch =
        MockDispatchService::new().with_dispatch(request(), Err(DispatchError::NotConfigured));

    let response = send(dispatch, Method::POST, valid_body()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body(response).await,
        json!({"message": "Server configuration error. Administrator has been notified."})
    );
}

#[tokio::test]
async fn provider_rejection_forwarded() {
    let dispatch = MockDispatchService::new().with_dispatch(
        request(),
        Err(DispatchError::Rejected {
            status: 403,
            message: Some("The from address does not match a verified Sender Identity.".into()),
        }),
    );

    let response = send(dispatch, Method::POST, valid_body()).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body(response).await,
        json!({"message": "The from address does not match a verified Sender Identity."})
    );
}

#[tokio::test]
async fn provider_rejection_without_message() {
    let dispatch = MockDispatchService::new().with_dispatch(
        request(),
        Err(DispatchError::Rejected {
            status: 503,
            message: None,
        }),
    );

    let response = send(dispatch, Method::POST, valid_body()).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body(response).await,
        json!({"message": "Failed to send email due to an unknown SendGrid error."})
    );
}

#[tokio::test]
async fn unexpected_error() {
    let dispatch = MockDispatchService::new().with_dispatch(
        request(),
        Err(DispatchError::Other(anyhow::anyhow!("fetch failed"))),
    );

    let response = send(dispatch, Method::POST, valid_body()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body(response).await, json!({"message": "fetch failed"}));
}

#[tokio::test]
async fn health() {
    for (configured, status) in [
        (true, StatusCode::OK),
        (false, StatusCode::INTERNAL_SERVER_ERROR),
    ] {
        let router = RestServer::new(MockDispatchService::new().with_is_configured(configured))
            .router();

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), status);
        assert_eq!(
            body(response).await,
            json!({"http": true, "provider": configured})
        );
    }
}

fn request() -> ContactRequest {
    ContactRequest::from_fields(
        Some("Max Mustermann".into()),
        Some("max.mustermann@example.de".into()),
    )
    .unwrap()
}

fn valid_body() -> String {
    json!({"name": "Max Mustermann", "email": "max.mustermann@example.de"}).to_string()
}

async fn send(dispatch: MockDispatchService, method: Method, body: String) -> Response {
    RestServer::new(dispatch)
        .router()
        .oneshot(
            Request::builder()
                .method(method)
                .uri("/api/send-email")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
