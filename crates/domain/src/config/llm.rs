use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chat-completions endpoint
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The OpenAI-compatible endpoint the assistant talks to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider id used in logs and error messages.
    #[serde(default = "d_provider_id")]
    pub provider_id: String,
    /// Base URL; `/chat/completions` is appended.
    #[serde(default = "d_base_url")]
    pub base_url: String,
    #[serde(default = "d_model")]
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    /// Inline key for throwaway setups. Prefer `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Transport timeout for one streamed completion.
    #[serde(default = "d_120000")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider_id: d_provider_id(),
            base_url: d_base_url(),
            model: d_model(),
            api_key_env: d_api_key_env(),
            api_key: None,
            temperature: None,
            timeout_ms: 120_000,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_provider_id() -> String {
    "groq".into()
}
fn d_base_url() -> String {
    "https://api.groq.com/openai/v1".into()
}
fn d_model() -> String {
    "llama-3.3-70b-versatile".into()
}
fn d_api_key_env() -> String {
    "GROQ_API_KEY".into()
}
fn d_120000() -> u64 {
    120_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_groq() {
        let cfg = LlmConfig::default();
        assert_eq!(cfg.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(cfg.api_key_env, "GROQ_API_KEY");
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn override_model_and_env() {
        let cfg: LlmConfig = toml::from_str(
            r#"
            base_url = "http://localhost:11434/v1"
            model = "qwen2.5"
            api_key_env = "LOCAL_KEY"
            temperature = 0.2
        "#,
        )
        .unwrap();
        assert_eq!(cfg.model, "qwen2.5");
        assert_eq!(cfg.api_key_env, "LOCAL_KEY");
        assert_eq!(cfg.temperature, Some(0.2));
        assert_eq!(cfg.timeout_ms, 120_000);
    }
}
