//! The conversation driver: one bounded, sequential tool-calling loop per
//! assistant request.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde::Serialize;
use tracing::Instrument;

use dp_data::DataProvider;
use dp_domain::config::AssistantConfig;
use dp_domain::stream::{StreamEvent, Usage};
use dp_domain::tool::{Message, ToolCall};
use dp_domain::trace::TraceEvent;
use dp_providers::{ChatRequest, LlmProvider};

use super::accumulator::ToolCallAccumulator;
use super::context::{build_system_prompt, initial_transcript};
use super::error::AssistantError;
use super::tools::{ToolContext, ToolRegistry};
use super::widget::encode_tool_result;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Inputs and outputs
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Collaborators for one run. Cheap to clone; everything is shared.
#[derive(Clone)]
pub struct AssistantDeps {
    pub llm: Arc<dyn LlmProvider>,
    pub data: Arc<dyn DataProvider>,
    pub tools: Arc<ToolRegistry>,
    pub settings: AssistantConfig,
    pub temperature: Option<f32>,
}

/// One tool call as it was dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchedCall {
    pub name: String,
    pub call_id: String,
    pub is_error: bool,
    pub is_widget: bool,
}

/// The result of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct AssistantReply {
    /// Final model text, verbatim. May contain widget marker spans.
    pub text: String,
    /// Tool rounds that ran before the final answer.
    pub turns: usize,
    pub request_id: String,
    pub tool_calls: Vec<DispatchedCall>,
    /// Token usage summed over every model call that reported it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Where the driver is in its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverPhase {
    AwaitingModelResponse,
    StreamInProgress,
    DispatchingTools,
    Done,
    TurnLimitExceeded,
}

impl DriverPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingModelResponse => "awaiting_model_response",
            Self::StreamInProgress => "stream_in_progress",
            Self::DispatchingTools => "dispatching_tools",
            Self::Done => "done",
            Self::TurnLimitExceeded => "turn_limit_exceeded",
        }
    }
}

fn enter_phase(phase: DriverPhase, turn: usize) {
    tracing::debug!(phase = phase.as_str(), turn, "driver phase");
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Driver
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Answer `message`, calling tools as the model requests them.
pub async fn run_assistant(
    deps: &AssistantDeps,
    message: &str,
) -> Result<AssistantReply, AssistantError> {
    run_assistant_at(deps, message, Utc::now()).await
}

/// [`run_assistant`] with an explicit request time.
pub async fn run_assistant_at(
    deps: &AssistantDeps,
    message: &str,
    now: DateTime<Utc>,
) -> Result<AssistantReply, AssistantError> {
    let request_id = uuid::Uuid::new_v4().to_string();
    let span = tracing::info_span!(
        "assistant.turn",
        request_id = %request_id,
        "otel.kind" = "SERVER",
    );
    let deadline_ms = deps.settings.request_timeout_ms;

    let run = drive(deps, message, now, request_id).instrument(span);
    match tokio::time::timeout(Duration::from_millis(deadline_ms), run).await {
        Ok(result) => {
            if let Err(e) = &result {
                tracing::warn!(kind = e.kind(), error = %e, "assistant request failed");
            }
            result
        }
        Err(_) => {
            tracing::warn!(timeout_ms = deadline_ms, "assistant request timed out");
            Err(AssistantError::Timeout(deadline_ms))
        }
    }
}

async fn drive(
    deps: &AssistantDeps,
    message: &str,
    now: DateTime<Utc>,
    request_id: String,
) -> Result<AssistantReply, AssistantError> {
    let snapshot = deps
        .data
        .get_dashboard_snapshot()
        .await
        .map_err(AssistantError::Context)?;
    let mut transcript = initial_transcript(build_system_prompt(&snapshot, now), message);

    let definitions = deps.tools.definitions();
    let ctx = ToolContext {
        data: deps.data.clone(),
        now,
        notes_search_pool: deps.settings.notes_search_pool,
    };
    let max_turns = deps.settings.max_turns;

    let mut turns = 0usize;
    let mut dispatched = Vec::new();
    let mut usage_total: Option<Usage> = None;

    loop {
        enter_phase(DriverPhase::AwaitingModelResponse, turns);

        let req = ChatRequest {
            messages: transcript.clone(),
            tools: definitions.clone(),
            temperature: deps.temperature,
            model: None,
        };
        let llm_span = tracing::info_span!(
            "llm.call",
            "otel.kind" = "CLIENT",
            provider = deps.llm.provider_id(),
            model = deps.llm.default_model(),
            turn = turns + 1,
            input_tokens = tracing::field::Empty,
            output_tokens = tracing::field::Empty,
        );
        let started = Instant::now();
        let outcome = consume_stream(deps.llm.as_ref(), &req, turns)
            .instrument(llm_span.clone())
            .await?;

        if let Some(u) = &outcome.usage {
            llm_span.record("input_tokens", u.prompt_tokens);
            llm_span.record("output_tokens", u.completion_tokens);
            usage_total = Some(add_usage(usage_total, u));
        }
        TraceEvent::LlmRequest {
            provider: deps.llm.provider_id().to_string(),
            model: deps.llm.default_model().to_string(),
            turn: turns + 1,
            duration_ms: started.elapsed().as_millis() as u64,
            tool_calls: outcome.calls.len(),
            prompt_tokens: outcome.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens: outcome.usage.as_ref().map(|u| u.completion_tokens),
        }
        .emit();

        if outcome.calls.is_empty() {
            enter_phase(DriverPhase::Done, turns);
            TraceEvent::AssistantCompleted {
                request_id: request_id.clone(),
                turns,
                output_chars: outcome.text.chars().count(),
            }
            .emit();
            return Ok(AssistantReply {
                text: outcome.text,
                turns,
                request_id,
                tool_calls: dispatched,
                usage: usage_total,
            });
        }

        enter_phase(DriverPhase::DispatchingTools, turns);
        transcript.push(Message::assistant_tool_calls(&outcome.text, &outcome.calls));

        for call in &outcome.calls {
            let record = dispatch_one(&deps.tools, &ctx, call, &mut transcript).await;
            dispatched.push(record);
        }

        turns += 1;
        if turns >= max_turns {
            enter_phase(DriverPhase::TurnLimitExceeded, turns);
            return Err(AssistantError::TurnLimitExceeded { max_turns });
        }
    }
}

/// What one model call produced once its stream ended.
struct StreamOutcome {
    text: String,
    calls: Vec<ToolCall>,
    usage: Option<Usage>,
}

async fn consume_stream(
    llm: &dyn LlmProvider,
    req: &ChatRequest,
    turn: usize,
) -> Result<StreamOutcome, AssistantError> {
    let mut stream = llm.chat_stream(req).await.map_err(AssistantError::Upstream)?;
    enter_phase(DriverPhase::StreamInProgress, turn);

    let mut text = String::new();
    let mut acc = ToolCallAccumulator::new();
    let mut usage = None;

    while let Some(event) = stream.next().await {
        match event.map_err(AssistantError::Upstream)? {
            StreamEvent::Token { text: t } => text.push_str(&t),
            StreamEvent::ToolCallFragment {
                index,
                call_id,
                name,
                arguments,
            } => acc.push(index, call_id.as_deref(), name.as_deref(), arguments.as_deref()),
            StreamEvent::Done {
                usage: u,
                finish_reason,
            } => {
                tracing::debug!(finish_reason = ?finish_reason, "model stream finished");
                if u.is_some() {
                    usage = u;
                }
            }
        }
    }

    Ok(StreamOutcome {
        text,
        calls: acc.finish(),
        usage,
    })
}

/// Run one call, append its tool message, and report what happened.
async fn dispatch_one(
    tools: &ToolRegistry,
    ctx: &ToolContext,
    call: &ToolCall,
    transcript: &mut Vec<Message>,
) -> DispatchedCall {
    let span = tracing::info_span!(
        "tool.call",
        tool_name = %call.tool_name,
        call_id = %call.call_id,
    );
    let started = Instant::now();
    let result = tools
        .dispatch(ctx, &call.tool_name, &call.arguments)
        .instrument(span)
        .await;

    let is_error = result.is_err();
    let is_widget = result.as_ref().is_ok_and(|o| o.is_widget());
    if let Err(e) = &result {
        tracing::warn!(tool = %call.tool_name, call_id = %call.call_id, error = %e, "tool call failed");
    }
    transcript.push(Message::tool_result(
        call.call_id.clone(),
        encode_tool_result(&result),
    ));

    TraceEvent::ToolDispatched {
        tool_name: call.tool_name.clone(),
        call_id: call.call_id.clone(),
        is_error,
        is_widget,
        duration_ms: started.elapsed().as_millis() as u64,
    }
    .emit();

    DispatchedCall {
        name: call.tool_name.clone(),
        call_id: call.call_id.clone(),
        is_error,
        is_widget,
    }
}

fn add_usage(total: Option<Usage>, u: &Usage) -> Usage {
    match total {
        None => u.clone(),
        Some(t) => Usage {
            prompt_tokens: t.prompt_tokens + u.prompt_tokens,
            completion_tokens: t.completion_tokens + u.completion_tokens,
            total_tokens: t.total_tokens + u.total_tokens,
        },
    }
}
