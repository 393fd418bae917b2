use serde::Serialize;

/// Structured trace events emitted across all DeskPilot crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    LlmRequest {
        provider: String,
        model: String,
        turn: usize,
        duration_ms: u64,
        tool_calls: usize,
        prompt_tokens: Option<u32>,
        completion_tokens: Option<u32>,
    },
    ToolDispatched {
        tool_name: String,
        call_id: String,
        is_error: bool,
        is_widget: bool,
        duration_ms: u64,
    },
    DataCall {
        endpoint: String,
        status: u16,
        duration_ms: u64,
    },
    AssistantCompleted {
        request_id: String,
        turns: usize,
        output_chars: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "dp_event");
    }
}
