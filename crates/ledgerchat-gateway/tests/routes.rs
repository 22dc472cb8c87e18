// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route-level tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use ledgerchat_config::{ClassifierMode, ServerConfig};
use ledgerchat_gateway::handlers::{
    EMPTY_MESSAGE, MISSING_MESSAGE_FIELD, NOT_JSON_MESSAGE, TIMEOUT_MESSAGE,
};
use ledgerchat_gateway::{build_router, GatewayState};
use ledgerchat_router::{ChatPipeline, ClassificationCascade, CLARIFICATION_MESSAGE};
use ledgerchat_test_utils::{MockClassifier, MockLookup};
use serde_json::Value;
use tower::ServiceExt;

fn app_with(pipeline: ChatPipeline, server: ServerConfig) -> Router {
    let timeout = Duration::from_secs(server.request_timeout_secs);
    build_router(&server, GatewayState::new(Arc::new(pipeline), timeout))
}

fn app(lookup: MockLookup) -> Router {
    app_with(
        ChatPipeline::new(ClassificationCascade::local_only(), Arc::new(lookup)),
        ServerConfig::default(),
    )
}

fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chatbot")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn index_describes_service() {
    let request = Request::get("/").body(Body::empty()).unwrap();
    let (status, body) = send(app(MockLookup::new()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "API funcionando correctamente");
    assert!(body["endpoints"]
        .as_array()
        .unwrap()
        .contains(&Value::from("/chatbot")));
}

#[tokio::test]
async fn best_buyers_returns_three_rows() {
    let (status, body) = send(
        app(MockLookup::new()),
        post_json(r#"{"message": "¿Quiénes son los mejores compradores?"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"][0]["name"], "Ana Martínez");
    assert!(body["processing_time"].as_str().unwrap().ends_with('s'));
}

#[tokio::test]
async fn count_returns_total() {
    let (status, body) = send(
        app(MockLookup::new()),
        post_json(r#"{"message": "cuántos compradores hay"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 5);
}

#[tokio::test]
async fn irrelevant_message_gets_clarification() {
    let (status, body) = send(
        app(MockLookup::new()),
        post_json(r#"{"message": "hola, ¿qué tal el clima?"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], CLARIFICATION_MESSAGE);
}

#[tokio::test]
async fn malformed_requests_are_400() {
    let cases = [
        ("not json at all", NOT_JSON_MESSAGE),
        (r#"{"text": "hola"}"#, MISSING_MESSAGE_FIELD),
        (r#"{"message": "   "}"#, EMPTY_MESSAGE),
    ];
    for (raw, expected) in cases {
        let (status, body) = send(app(MockLookup::new()), post_json(raw)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {raw}");
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], expected);
    }
}

#[tokio::test]
async fn missing_content_type_is_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/chatbot")
        .body(Body::from(r#"{"message": "hola"}"#))
        .unwrap();
    let (status, body) = send(app(MockLookup::new()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], NOT_JSON_MESSAGE);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = ServerConfig {
        max_body_bytes: 64,
        ..ServerConfig::default()
    };
    let app = app_with(
        ChatPipeline::new(
            ClassificationCascade::local_only(),
            Arc::new(MockLookup::new()),
        ),
        server,
    );
    let big = format!(r#"{{"message": "{}"}}"#, "a".repeat(500));
    let (status, body) = send(app, post_json(&big)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn lookup_fault_is_generic_500() {
    let (status, body) = send(
        app(MockLookup::failing()),
        post_json(r#"{"message": "cuántos deudores hay"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert!(!body.to_string().contains("mock lookup failure"));
}

#[tokio::test(start_paused = true)]
async fn slow_pipeline_is_504() {
    let cascade = ClassificationCascade::new(
        ClassifierMode::Primary,
        Arc::new(MockClassifier::hanging("primary")),
        Arc::new(MockClassifier::unconfigured("secondary")),
        Duration::from_secs(600),
    );
    let server = ServerConfig {
        request_timeout_secs: 1,
        ..ServerConfig::default()
    };
    let app = app_with(
        ChatPipeline::new(cascade, Arc::new(MockLookup::new())),
        server,
    );

    let (status, body) = send(app, post_json(r#"{"message": "top compradores"}"#)).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["message"], TIMEOUT_MESSAGE);
}

#[test]
fn classifier_budget_longer_than_request_is_rejected() {
    let errors = ledgerchat_config::load_and_validate_str("[classifier]\ntimeout_secs = 20\n")
        .unwrap_err();
    assert!(errors
        .iter()
        .any(|e| e.to_string().contains("request_timeout_secs")));
}

#[tokio::test(start_paused = true)]
async fn hanging_providers_fall_back_within_request_budget() {
    let config = ledgerchat_config::load_and_validate_str(
        "[classifier]\nmode = \"auto\"\ntimeout_secs = 14\n",
    )
    .unwrap();
    let cascade = ClassificationCascade::new(
        config.classifier.mode,
        Arc::new(MockClassifier::hanging("primary")),
        Arc::new(MockClassifier::hanging("secondary")),
        Duration::from_secs(config.classifier.timeout_secs),
    );
    let app = app_with(
        ChatPipeline::new(cascade, Arc::new(MockLookup::new())),
        config.server,
    );

    let (status, body) = send(app, post_json(r#"{"message": "cuántos compradores hay"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["total"], 5);
}

#[tokio::test]
async fn health_reports_components() {
    let request = Request::get("/chatbot/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(MockLookup::new()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["storage"]["status"], "healthy");
    assert_eq!(body["classifiers"][0]["name"], "patterns");
    assert_eq!(body["classifiers"][0]["availability"], "ready");
}

#[tokio::test]
async fn health_is_503_when_storage_is_down() {
    let request = Request::get("/chatbot/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(MockLookup::failing()), request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "error");
    assert_eq!(body["storage"]["status"], "unhealthy");
}
