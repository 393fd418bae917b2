//! The HTTP surface, driven through the real router.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use sha2::{Digest, Sha256};
use tower::Service;

use common::*;
use dp_domain::config::Config;
use dp_gateway::api;
use dp_gateway::runtime::ToolRegistry;
use dp_gateway::state::AppState;
use dp_providers::LlmProvider;

fn app_state(llm: Option<Arc<dyn LlmProvider>>, token: Option<&str>) -> AppState {
    AppState {
        config: Arc::new(Config::default()),
        llm,
        data: Arc::new(store()),
        tools: Arc::new(ToolRegistry::builtin()),
        api_token_hash: token.map(|t| Sha256::digest(t.as_bytes()).to_vec()),
    }
}

fn app(state: AppState) -> Router {
    api::router(state.clone()).with_state(state)
}

async fn send(app: Router, req: Request<Body>) -> Response {
    let mut svc = app;
    std::future::poll_fn(|cx| Service::<Request<Body>>::poll_ready(&mut svc, cx))
        .await
        .unwrap();
    svc.call(req).await.unwrap()
}

fn post_message(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/assistant")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(resp: Response) -> serde_json::Value {
    serde_json::from_str(&body_text(resp).await).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let resp = send(
        app(app_state(None, Some("secret"))),
        Request::get("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "ok");
}

#[tokio::test]
async fn success_is_plain_text() {
    let llm = Arc::new(ScriptedLlm::new().then(text_turn(&["All ", "clear."])));
    let resp = send(app(app_state(Some(llm), None)), post_message(r#"{"message":"hi"}"#)).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(body_text(resp).await, "All clear.");
}

#[tokio::test]
async fn missing_credential_is_500_with_env_name() {
    let resp = send(app(app_state(None, None)), post_message(r#"{"message":"hi"}"#)).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(resp).await,
        serde_json::json!({ "error": "GROQ_API_KEY is not set" })
    );
}

#[tokio::test]
async fn blank_message_is_400() {
    let llm = Arc::new(ScriptedLlm::new());
    let resp = send(app(app_state(Some(llm), None)), post_message(r#"{"message":"   "}"#)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "message is required");
}

#[tokio::test]
async fn malformed_body_is_a_json_error() {
    let llm = Arc::new(ScriptedLlm::new());
    let resp = send(app(app_state(Some(llm), None)), post_message("{not json")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
    let error = body_json(resp).await["error"].as_str().unwrap().to_string();
    assert!(error.contains("JSON"));
}

#[tokio::test]
async fn missing_content_type_is_a_json_error() {
    let llm = Arc::new(ScriptedLlm::new());
    let resp = send(
        app(app_state(Some(llm), None)),
        Request::post("/api/assistant")
            .body(Body::from(r#"{"message":"hi"}"#))
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let error = body_json(resp).await["error"].as_str().unwrap().to_string();
    assert!(error.contains("Content-Type"));
}

#[tokio::test]
async fn turn_limit_is_500_too_many_turns() {
    let mut llm = ScriptedLlm::new();
    for i in 0..5 {
        let id = format!("c{i}");
        llm = llm.then([tool_call(0, &id, "getStats", "{}"), finish("tool_calls")].concat());
    }
    let resp = send(
        app(app_state(Some(Arc::new(llm)), None)),
        post_message(r#"{"message":"spin"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(resp).await["error"], "Too many turns");
}

#[tokio::test]
async fn upstream_failure_is_500_with_message() {
    let resp = send(
        app(app_state(Some(Arc::new(RejectingLlm)), None)),
        post_message(r#"{"message":"hi"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = body_json(resp).await["error"].as_str().unwrap().to_string();
    assert!(error.contains("HTTP 401"));
}

#[tokio::test]
async fn protected_routes_require_the_token() {
    let state = app_state(None, Some("secret"));

    let resp = send(
        app(state.clone()),
        Request::get("/api/assistant/tools").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send(
        app(state),
        Request::get("/api/assistant/tools")
            .header(header::AUTHORIZATION, "Bearer secret")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["count"], 16);
    assert_eq!(body["tools"][0]["name"], "searchNotes");
}
