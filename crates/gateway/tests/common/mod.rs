//! Shared doubles for the gateway integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use serde_json::{json, Map, Value};

use dp_data::{DataProvider, FixtureStore};
use dp_domain::config::AssistantConfig;
use dp_domain::error::{Error, Result};
use dp_domain::records::{CalendarEvent, Client, Note, Project, Task, TaskQuery};
use dp_domain::stream::{BoxStream, StreamEvent};
use dp_domain::tool::{ContentPart, Message, MessageContent};
use dp_gateway::runtime::{AssistantDeps, ToolRegistry};
use dp_providers::sse::sse_chunk_stream;
use dp_providers::{ChatRequest, LlmProvider, OpenAiStreamParser};

// ── scripted model ───────────────────────────────────────────────────

/// Replays one scripted response body per model call. Every body goes
/// through the real SSE decoder and stream parser, split into the given
/// byte chunks.
#[derive(Default)]
pub struct ScriptedLlm {
    turns: Mutex<VecDeque<Vec<Vec<u8>>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response body delivered as a single chunk.
    pub fn then(self, body: String) -> Self {
        self.then_chunks(vec![body.into_bytes()])
    }

    /// Queue a response body delivered as explicit chunks.
    pub fn then_chunks(self, chunks: Vec<Vec<u8>>) -> Self {
        self.turns.lock().unwrap().push_back(chunks);
        self
    }

    /// Every request the driver sent, in order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedLlm {
    async fn chat_stream(&self, req: &ChatRequest) -> Result<BoxStream<'static, Result<StreamEvent>>> {
        self.requests.lock().unwrap().push(req.clone());
        let chunks = self.turns.lock().unwrap().pop_front().ok_or_else(|| Error::Provider {
            provider: "scripted".into(),
            message: "no scripted response left".into(),
        })?;
        let chunk_stream = futures_util::stream::iter(chunks.into_iter().map(Ok::<_, Error>));
        let mut parser = OpenAiStreamParser::new();
        Ok(sse_chunk_stream(chunk_stream, move |data| parser.parse(data)))
    }

    fn provider_id(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }
}

/// A model endpoint that rejects every request.
pub struct RejectingLlm;

#[async_trait::async_trait]
impl LlmProvider for RejectingLlm {
    async fn chat_stream(&self, _req: &ChatRequest) -> Result<BoxStream<'static, Result<StreamEvent>>> {
        Err(Error::Provider {
            provider: "groq".into(),
            message: "HTTP 401 - invalid api key".into(),
        })
    }

    fn provider_id(&self) -> &str {
        "groq"
    }

    fn default_model(&self) -> &str {
        "llama"
    }
}

/// A model endpoint that accepts the request and never sends a byte.
pub struct StalledLlm;

#[async_trait::async_trait]
impl LlmProvider for StalledLlm {
    async fn chat_stream(&self, _req: &ChatRequest) -> Result<BoxStream<'static, Result<StreamEvent>>> {
        Ok(Box::pin(futures_util::stream::pending::<Result<StreamEvent>>()))
    }

    fn provider_id(&self) -> &str {
        "stalled"
    }

    fn default_model(&self) -> &str {
        "stalled"
    }
}

// ── SSE body builders ────────────────────────────────────────────────

pub fn content(text: &str) -> String {
    let chunk = json!({ "choices": [{ "index": 0, "delta": { "content": text } }] });
    format!("data: {chunk}\n\n")
}

/// A tool-call delta. `index` is omitted from the wire when `None`.
pub fn tool_delta(
    index: Option<usize>,
    id: Option<&str>,
    name: Option<&str>,
    arguments: Option<&str>,
) -> String {
    let mut entry = Map::new();
    if let Some(i) = index {
        entry.insert("index".into(), json!(i));
    }
    if let Some(id) = id {
        entry.insert("id".into(), json!(id));
        entry.insert("type".into(), json!("function"));
    }
    let mut function = Map::new();
    if let Some(n) = name {
        function.insert("name".into(), json!(n));
    }
    if let Some(a) = arguments {
        function.insert("arguments".into(), json!(a));
    }
    entry.insert("function".into(), Value::Object(function));
    let chunk = json!({ "choices": [{ "index": 0, "delta": { "tool_calls": [entry] } }] });
    format!("data: {chunk}\n\n")
}

/// A complete single-fragment tool call.
pub fn tool_call(index: usize, id: &str, name: &str, arguments: &str) -> String {
    tool_delta(Some(index), Some(id), Some(name), Some(arguments))
}

pub fn finish(reason: &str) -> String {
    let chunk = json!({ "choices": [{ "index": 0, "delta": {}, "finish_reason": reason }] });
    format!("data: {chunk}\n\ndata: [DONE]\n\n")
}

/// A full text-only response body.
pub fn text_turn(parts: &[&str]) -> String {
    let mut body: String = parts.iter().map(|p| content(p)).collect();
    body.push_str(&finish("stop"));
    body
}

// ── fixture data ─────────────────────────────────────────────────────

pub fn task(id: &str, name: &str) -> Task {
    Task {
        id: id.into(),
        name: name.into(),
        description: None,
        priority: Some("high".into()),
        status: Some("task".into()),
        project_id: None,
        due_date: None,
        extra: Map::new(),
    }
}

pub fn event(id: &str, start: chrono::DateTime<Utc>) -> CalendarEvent {
    CalendarEvent {
        id: id.into(),
        title: format!("Event {id}"),
        start,
        end: None,
        extra: Map::new(),
    }
}

pub fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
}

pub fn store() -> FixtureStore {
    FixtureStore::default()
        .with_tasks(vec![task("t1", "Ship release"), task("t2", "Write changelog")])
        .with_dashboard(json!({ "tasks": { "total": 2 }, "notes": { "total": 0 } }))
}

pub fn deps(llm: Arc<dyn LlmProvider>, data: Arc<dyn DataProvider>) -> AssistantDeps {
    AssistantDeps {
        llm,
        data,
        tools: Arc::new(ToolRegistry::builtin()),
        settings: AssistantConfig::default(),
        temperature: None,
    }
}

/// Content of a `tool` message.
pub fn tool_result_content(msg: &Message) -> &str {
    match &msg.content {
        MessageContent::Parts(parts) => parts
            .iter()
            .find_map(|p| match p {
                ContentPart::ToolResult { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .expect("tool message has a tool_result part"),
        MessageContent::Text(t) => t.as_str(),
    }
}

// ── failing data layer ───────────────────────────────────────────────

pub struct DownData;

#[async_trait::async_trait]
impl DataProvider for DownData {
    async fn get_dashboard_snapshot(&self) -> Result<Value> {
        Err(Error::Data("GET /api/dashboard returned 503".into()))
    }
    async fn get_notes(&self, _limit: usize) -> Result<Vec<Note>> {
        Err(Error::Data("down".into()))
    }
    async fn get_tasks(&self, _query: &TaskQuery) -> Result<Vec<Task>> {
        Err(Error::Data("down".into()))
    }
    async fn get_projects(&self) -> Result<Vec<Project>> {
        Err(Error::Data("down".into()))
    }
    async fn get_events(&self) -> Result<Vec<CalendarEvent>> {
        Err(Error::Data("down".into()))
    }
    async fn get_clients(&self) -> Result<Vec<Client>> {
        Err(Error::Data("down".into()))
    }
}
