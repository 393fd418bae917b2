//! Shared utility functions for provider adapters.

use dp_domain::config::LlmConfig;
use dp_domain::error::{Error, Result};

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
///
/// Timeout errors map to [`Error::Timeout`]; everything else maps to
/// [`Error::Http`].
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// Resolve the model API key.
///
/// Precedence:
/// 1. `api_key` field (plaintext, warns)
/// 2. the environment variable named by `api_key_env`
///
/// An unset or blank variable is an [`Error::Auth`] whose message is
/// `"<ENV> is not set"`.
pub fn resolve_api_key(cfg: &LlmConfig) -> Result<String> {
    if let Some(ref key) = cfg.api_key {
        if !key.trim().is_empty() {
            tracing::warn!(
                "API key loaded from plaintext config field 'api_key'; \
                 prefer 'api_key_env' instead"
            );
            return Ok(key.clone());
        }
    }

    match std::env::var(&cfg.api_key_env) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(Error::Auth(format!("{} is not set", cfg.api_key_env))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plaintext_key_wins() {
        let cfg = LlmConfig {
            api_key: Some("sk-inline".into()),
            api_key_env: "DP_TEST_SHOULD_NOT_BE_READ".into(),
            ..Default::default()
        };
        assert_eq!(resolve_api_key(&cfg).unwrap(), "sk-inline");
    }

    #[test]
    fn env_var_is_read() {
        let var = "DP_TEST_RESOLVE_ENV_KEY_4411";
        std::env::set_var(var, "env-secret");
        let cfg = LlmConfig {
            api_key_env: var.into(),
            ..Default::default()
        };
        assert_eq!(resolve_api_key(&cfg).unwrap(), "env-secret");
        std::env::remove_var(var);
    }

    #[test]
    fn missing_env_names_the_variable() {
        let cfg = LlmConfig {
            api_key_env: "DP_TEST_NONEXISTENT_VAR_9182".into(),
            ..Default::default()
        };
        let err = resolve_api_key(&cfg).unwrap_err();
        assert!(matches!(err, Error::Auth(ref m) if m == "DP_TEST_NONEXISTENT_VAR_9182 is not set"));
    }

    #[test]
    fn blank_env_counts_as_missing() {
        let var = "DP_TEST_BLANK_KEY_5150";
        std::env::set_var(var, "  ");
        let cfg = LlmConfig {
            api_key_env: var.into(),
            ..Default::default()
        };
        assert!(resolve_api_key(&cfg).is_err());
        std::env::remove_var(var);
    }
}
