//! Assistant endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use super::api_error;
use crate::runtime::run_assistant;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AssistantRequest {
    #[serde(default)]
    pub message: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/assistant: run the tool-calling loop, return the final text
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn assistant(
    State(state): State<AppState>,
    body: Result<Json<AssistantRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return api_error(rejection.status(), rejection.body_text()),
    };

    let deps = match state.assistant_deps() {
        Ok(d) => d,
        Err(e) => return e.into_response(),
    };

    let message = body.message.trim();
    if message.is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "message is required");
    }

    match run_assistant(&deps, message).await {
        Ok(reply) => {
            tracing::info!(
                request_id = %reply.request_id,
                turns = reply.turns,
                tool_calls = reply.tool_calls.len(),
                "assistant request completed"
            );
            (
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                reply.text,
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /api/assistant/tools: the tool catalog offered to the model
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn list_tools(State(state): State<AppState>) -> impl IntoResponse {
    let tools = state.tools.definitions();
    Json(serde_json::json!({
        "count": tools.len(),
        "tools": tools,
    }))
}
