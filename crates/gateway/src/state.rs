use std::sync::Arc;

use dp_data::DataProvider;
use dp_domain::config::Config;
use dp_providers::LlmProvider;

use crate::runtime::{AssistantDeps, AssistantError, ToolRegistry};

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// `None` when no model API key was available at startup; assistant
    /// requests then fail with the missing-credential error.
    pub llm: Option<Arc<dyn LlmProvider>>,
    pub data: Arc<dyn DataProvider>,
    pub tools: Arc<ToolRegistry>,
    /// SHA-256 of the API bearer token, read once at startup.
    /// `None` means no token is configured (dev mode).
    pub api_token_hash: Option<Vec<u8>>,
}

impl AppState {
    /// Collaborators for one assistant run.
    pub fn assistant_deps(&self) -> Result<AssistantDeps, AssistantError> {
        let llm = self
            .llm
            .clone()
            .ok_or_else(|| AssistantError::MissingCredential(self.config.llm.api_key_env.clone()))?;
        Ok(AssistantDeps {
            llm,
            data: self.data.clone(),
            tools: self.tools.clone(),
            settings: self.config.assistant.clone(),
            temperature: self.config.llm.temperature,
        })
    }
}
