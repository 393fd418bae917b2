use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Data layer connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub backend: DataBackend,
    /// Base URL of the platform backend API (`rest` backend).
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Environment variable holding the backend bearer token.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// JSON document with `notes`, `tasks`, `projects`, `events`,
    /// `clients`, and `dashboard` (`fixture` backend).
    #[serde(default)]
    pub fixture_path: Option<PathBuf>,
    #[serde(default = "d_8000")]
    pub timeout_ms: u64,
    #[serde(default = "d_2")]
    pub max_retries: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataBackend {
    #[default]
    Rest,
    Fixture,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            backend: DataBackend::Rest,
            base_url: d_base_url(),
            api_key_env: None,
            fixture_path: None,
            timeout_ms: 8000,
            max_retries: 2,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_base_url() -> String {
    "http://localhost:8000".into()
}
fn d_8000() -> u64 {
    8000
}
fn d_2() -> u32 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_backend_parses() {
        let cfg: DataConfig = toml::from_str(
            r#"
            backend = "fixture"
            fixture_path = "data/demo.json"
        "#,
        )
        .unwrap();
        assert_eq!(cfg.backend, DataBackend::Fixture);
        assert_eq!(cfg.fixture_path, Some(PathBuf::from("data/demo.json")));
        assert_eq!(cfg.max_retries, 2);
    }
}
