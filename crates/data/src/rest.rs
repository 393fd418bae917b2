//! REST implementation of [`DataProvider`].
//!
//! `RestDataClient` wraps a `reqwest::Client` and translates every trait
//! method into the corresponding call against the platform backend API,
//! with automatic retry + exponential back-off on transient (5xx /
//! timeout) failures.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dp_domain::config::DataConfig;
use dp_domain::error::{Error, Result};
use dp_domain::records::{CalendarEvent, Client, Note, Project, Task, TaskQuery};
use dp_domain::trace::TraceEvent;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::provider::DataProvider;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A REST client for the platform backend.
///
/// Created once and shared by every request. The underlying
/// `reqwest::Client` maintains a connection pool.
#[derive(Debug, Clone)]
pub struct RestDataClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    max_retries: u32,
}

impl RestDataClient {
    /// Build a new client from `DataConfig`. The bearer token is read from
    /// the environment variable named by `api_key_env`, if any.
    pub fn new(cfg: &DataConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        let api_key = cfg.api_key_env.as_deref().and_then(|var| {
            let key = std::env::var(var).ok().filter(|k| !k.trim().is_empty());
            if key.is_none() {
                tracing::warn!(env = %var, "data backend token env var is not set; calling without auth");
            }
            key
        });

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            api_key,
            max_retries: cfg.max_retries,
        })
    }

    // ── request helpers ──────────────────────────────────────────────

    /// Decorate a `RequestBuilder` with the standard DeskPilot headers.
    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        let rb = rb
            .header("X-Client-Type", "deskpilot-assistant")
            .header("X-Trace-Id", Uuid::new_v4().to_string());

        match self.api_key {
            Some(ref key) => rb.bearer_auth(key),
            None => rb,
        }
    }

    /// Build the full URL for a path like `/api/tasks`.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ── retry engine ─────────────────────────────────────────────────

    /// Execute a request with retry + exponential back-off on transient errors.
    ///
    /// * Retries on 5xx status codes, timeouts, and connection errors.
    /// * Does **not** retry on 4xx (client errors are permanent).
    /// * Emits a `TraceEvent::DataCall` after every attempt.
    async fn execute_with_retry(
        &self,
        endpoint: &str,
        build_request: impl Fn() -> RequestBuilder,
    ) -> Result<Response> {
        let mut last_err: Option<Error> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                tokio::time::sleep(backoff).await;
            }

            let start = Instant::now();
            let result = self.decorate(build_request()).send().await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    TraceEvent::DataCall {
                        endpoint: endpoint.to_owned(),
                        status,
                        duration_ms,
                    }
                    .emit();

                    if resp.status().is_server_error() {
                        let body = resp.text().await.unwrap_or_default();
                        last_err = Some(Error::Data(format!("{endpoint} returned {status}: {body}")));
                        continue;
                    }

                    if resp.status().is_client_error() {
                        let resp_status = resp.status();
                        let body = resp.text().await.unwrap_or_default();
                        if resp_status == StatusCode::UNAUTHORIZED
                            || resp_status == StatusCode::FORBIDDEN
                        {
                            return Err(Error::Auth(format!(
                                "{endpoint} auth failed ({status}): {body}"
                            )));
                        }
                        return Err(Error::Data(format!("{endpoint} returned {status}: {body}")));
                    }

                    return Ok(resp);
                }
                Err(e) => {
                    TraceEvent::DataCall {
                        endpoint: endpoint.to_owned(),
                        status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                        duration_ms,
                    }
                    .emit();

                    tracing::debug!(endpoint, attempt, error = %e, "data backend call failed");
                    last_err = Some(from_reqwest(e));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| Error::Data(format!("{endpoint}: all retries exhausted"))))
    }

    /// GET `path` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        build_request: impl Fn() -> RequestBuilder,
    ) -> Result<T> {
        let resp = self.execute_with_retry(endpoint, build_request).await?;
        let body = resp.text().await.map_err(from_reqwest)?;
        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| Error::Data(format!("failed to parse {endpoint} response: {e}")))?;
        serde_json::from_value(unwrap_envelope(value))
            .map_err(|e| Error::Data(format!("unexpected {endpoint} payload: {e}")))
    }
}

/// Backends answer either with a bare value or with `{ "data": value }`.
fn unwrap_envelope(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(mut map) if map.len() == 1 && map.contains_key("data") => {
            map.remove("data").unwrap_or_default()
        }
        other => other,
    }
}

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
///
/// `dp-domain` carries no HTTP client, and this crate does not depend on
/// `dp-providers`, so each HTTP crate keeps its own conversion.
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl DataProvider for RestDataClient {
    async fn get_dashboard_snapshot(&self) -> Result<serde_json::Value> {
        let url = self.url("/api/dashboard");
        self.get_json("GET /api/dashboard", || self.http.get(&url))
            .await
    }

    async fn get_notes(&self, limit: usize) -> Result<Vec<Note>> {
        let url = self.url("/api/notes");
        self.get_json("GET /api/notes", || {
            self.http.get(&url).query(&[("limit", limit)])
        })
        .await
    }

    async fn get_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>> {
        let url = self.url("/api/tasks");
        self.get_json("GET /api/tasks", || self.http.get(&url).query(query))
            .await
    }

    async fn get_projects(&self) -> Result<Vec<Project>> {
        let url = self.url("/api/projects");
        self.get_json("GET /api/projects", || self.http.get(&url))
            .await
    }

    async fn get_events(&self) -> Result<Vec<CalendarEvent>> {
        let url = self.url("/api/events");
        self.get_json("GET /api/events", || self.http.get(&url))
            .await
    }

    async fn get_clients(&self) -> Result<Vec<Client>> {
        let url = self.url("/api/clients");
        self.get_json("GET /api/clients", || self.http.get(&url))
            .await
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
