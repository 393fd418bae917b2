use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

/// Fatal failures of one assistant request.
///
/// Recoverable problems (malformed stream lines, malformed tool
/// arguments, failing tools) never surface here; they are absorbed by the
/// driver and only show up in the transcript.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// No model API key is available. Carries the env var name.
    #[error("{0} is not set")]
    MissingCredential(String),

    /// The dashboard snapshot for the system prompt could not be loaded.
    #[error("failed to load dashboard context: {0}")]
    Context(#[source] dp_domain::error::Error),

    /// Non-2xx from the model endpoint, or the stream broke mid-body.
    #[error("{0}")]
    Upstream(#[source] dp_domain::error::Error),

    /// The model kept requesting tools for `max_turns` round-trips.
    #[error("Too many turns")]
    TurnLimitExceeded { max_turns: usize },

    /// The overall request deadline elapsed.
    #[error("assistant request timed out after {0} ms")]
    Timeout(u64),
}

impl AssistantError {
    /// Short machine-readable tag for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential(_) => "missing_credential",
            Self::Context(_) => "context",
            Self::Upstream(_) => "upstream",
            Self::TurnLimitExceeded { .. } => "turn_limit_exceeded",
            Self::Timeout(_) => "timeout",
        }
    }
}

impl IntoResponse for AssistantError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dp_domain::error::Error;

    #[test]
    fn messages_match_wire_contract() {
        assert_eq!(
            AssistantError::MissingCredential("GROQ_API_KEY".into()).to_string(),
            "GROQ_API_KEY is not set"
        );
        assert_eq!(
            AssistantError::TurnLimitExceeded { max_turns: 5 }.to_string(),
            "Too many turns"
        );
    }

    #[test]
    fn upstream_error_embeds_status_and_body() {
        let err = AssistantError::Upstream(Error::Provider {
            provider: "groq".into(),
            message: "HTTP 401 - invalid key".into(),
        });
        assert_eq!(err.to_string(), "provider groq: HTTP 401 - invalid key");
        assert_eq!(err.kind(), "upstream");
    }
}
