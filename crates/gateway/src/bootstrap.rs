//! Application bootstrap: validates config and builds [`AppState`].

use std::sync::Arc;

use sha2::{Digest, Sha256};

use dp_domain::config::{Config, ConfigSeverity};
use dp_domain::error::Error;
use dp_providers::{LlmProvider, OpenAiCompatProvider};

use crate::runtime::ToolRegistry;
use crate::state::AppState;

/// Build the fully-initialised [`AppState`] from a validated config.
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Validate config ──────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let errors = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("config validation failed with {errors} error(s)");
    }

    // ── Data layer ───────────────────────────────────────────────────
    let data = dp_data::create_provider(&config.data)?;

    // ── Model provider ───────────────────────────────────────────────
    let llm = build_llm(&config)?;

    // ── Tools ────────────────────────────────────────────────────────
    let tools = Arc::new(ToolRegistry::builtin());
    tracing::info!(count = tools.len(), "assistant tools registered");

    // ── API token ────────────────────────────────────────────────────
    let api_token_hash = api_token_hash(&config.server.api_token_env);

    Ok(AppState {
        config,
        llm,
        data,
        tools,
        api_token_hash,
    })
}

/// A missing key is not fatal at startup; the assistant endpoint reports
/// it per request instead.
fn build_llm(config: &Config) -> anyhow::Result<Option<Arc<dyn LlmProvider>>> {
    match OpenAiCompatProvider::from_config(&config.llm) {
        Ok(p) => {
            tracing::info!(
                provider = %config.llm.provider_id,
                model = %config.llm.model,
                "model provider ready"
            );
            Ok(Some(Arc::new(p)))
        }
        Err(Error::Auth(msg)) => {
            tracing::warn!("model provider unavailable: {msg}");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn api_token_hash(env_var: &str) -> Option<Vec<u8>> {
    match std::env::var(env_var).ok().filter(|t| !t.is_empty()) {
        Some(token) => {
            tracing::info!(source = %env_var, "API bearer-token auth enabled");
            Some(Sha256::digest(token.as_bytes()).to_vec())
        }
        None => {
            tracing::warn!(
                "API bearer-token auth DISABLED; set the {env_var} env var to require a token"
            );
            None
        }
    }
}
