//! Integration tests for signature rejection paths on the webhook route.
//!
//! Complements the unit tests in `crypto.rs` by asserting the HTTP
//! contract: every verification failure is a 400 with a plain-text
//! diagnostic and leaves no trace in the database.

use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use roomsync_api::{create_router, AppState, WebhookVerifier};
use roomsync_core::RealClock;
use roomsync_testing::{sign_webhook, MockUpstream, TestEnv, TEST_WEBHOOK_SECRET};
use roomsync_upstream::{ClientConfig, SnapshotClient};
use tower::ServiceExt;

fn app_state(env: &TestEnv, upstream_url: String) -> AppState {
    AppState {
        storage: env.storage.clone(),
        verifier: WebhookVerifier::new(TEST_WEBHOOK_SECRET).expect("build verifier"),
        snapshots: SnapshotClient::new(ClientConfig {
            base_url: upstream_url,
            api_token: "sk_test_token".to_string(),
            timeout: Duration::from_secs(5),
            ..ClientConfig::default()
        })
        .expect("build snapshot client"),
        clock: Arc::new(RealClock::new()),
    }
}

fn request_with(id: &str, timestamp: i64, signature: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .header("webhook-id", id)
        .header("webhook-timestamp", timestamp.to_string())
        .header("webhook-signature", signature)
        .body(Body::from(body.to_string()))
        .expect("build request")
}

const BODY: &str = r#"{"type":"ydocUpdated","data":{"roomId":"room-1"}}"#;

#[tokio::test]
async fn stale_timestamp_is_rejected() {
    let env = TestEnv::new().await.expect("test env");
    let upstream = MockUpstream::start().await;
    upstream.expect_no_fetches().await;

    let app = create_router(app_state(&env, upstream.uri()));

    let timestamp = chrono::Utc::now().timestamp() - 3600;
    let signature = sign_webhook(TEST_WEBHOOK_SECRET, "msg_1", timestamp, BODY.as_bytes());

    let response = app
        .oneshot(request_with("msg_1", timestamp, &signature, BODY))
        .await
        .expect("execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(env.storage.documents.count().await.expect("count"), 0);
}

#[tokio::test]
async fn future_timestamp_is_rejected() {
    let env = TestEnv::new().await.expect("test env");
    let upstream = MockUpstream::start().await;
    upstream.expect_no_fetches().await;

    let app = create_router(app_state(&env, upstream.uri()));

    let timestamp = chrono::Utc::now().timestamp() + 3600;
    let signature = sign_webhook(TEST_WEBHOOK_SECRET, "msg_1", timestamp, BODY.as_bytes());

    let response = app
        .oneshot(request_with("msg_1", timestamp, &signature, BODY))
        .await
        .expect("execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signature_from_a_different_secret_is_rejected() {
    let env = TestEnv::new().await.expect("test env");
    let upstream = MockUpstream::start().await;
    upstream.expect_no_fetches().await;

    let app = create_router(app_state(&env, upstream.uri()));

    let timestamp = chrono::Utc::now().timestamp();
    let signature = sign_webhook("whsec_b3RoZXItc2VjcmV0", "msg_1", timestamp, BODY.as_bytes());

    let response = app
        .oneshot(request_with("msg_1", timestamp, &signature, BODY))
        .await
        .expect("execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(env.storage.documents.count().await.expect("count"), 0);
}

#[tokio::test]
async fn garbage_signature_header_is_rejected() {
    let env = TestEnv::new().await.expect("test env");
    let upstream = MockUpstream::start().await;
    upstream.expect_no_fetches().await;

    let app = create_router(app_state(&env, upstream.uri()));

    let timestamp = chrono::Utc::now().timestamp();

    let response = app
        .oneshot(request_with("msg_1", timestamp, "not-a-signature", BODY))
        .await
        .expect("execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn correctly_signed_garbage_payload_is_rejected() {
    let env = TestEnv::new().await.expect("test env");
    let upstream = MockUpstream::start().await;
    upstream.expect_no_fetches().await;

    let app = create_router(app_state(&env, upstream.uri()));

    let body = "definitely not json";
    let timestamp = chrono::Utc::now().timestamp();
    let signature = sign_webhook(TEST_WEBHOOK_SECRET, "msg_1", timestamp, body.as_bytes());

    let response = app
        .oneshot(request_with("msg_1", timestamp, &signature, body))
        .await
        .expect("execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(env.storage.documents.count().await.expect("count"), 0);
}
