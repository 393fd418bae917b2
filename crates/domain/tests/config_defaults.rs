use dp_domain::config::{Config, ConfigSeverity, DataBackend};

#[test]
fn default_host_is_localhost() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 3300);
}

#[test]
fn default_config_validates_clean() {
    let config = Config::default();
    let errors: Vec<_> = config
        .validate()
        .into_iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .collect();
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
}

#[test]
fn assistant_defaults() {
    let config = Config::default();
    assert_eq!(config.assistant.max_turns, 5);
    assert_eq!(config.assistant.request_timeout_ms, 60_000);
    assert_eq!(config.assistant.notes_search_pool, 50);
}

#[test]
fn full_file_parses() {
    let toml_str = r#"
[server]
host = "0.0.0.0"
port = 4000

[llm]
model = "llama-3.1-8b-instant"

[assistant]
max_turns = 3

[data]
backend = "fixture"
fixture_path = "demo.json"

[observability]
otlp_endpoint = "http://localhost:4317"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.llm.model, "llama-3.1-8b-instant");
    assert_eq!(config.llm.api_key_env, "GROQ_API_KEY");
    assert_eq!(config.assistant.max_turns, 3);
    assert_eq!(config.data.backend, DataBackend::Fixture);
    assert!(config.validate().is_empty());
}

#[test]
fn cors_config_parses_custom_origins() {
    let toml_str = r#"
[server.cors]
allowed_origins = ["https://myapp.com", "http://localhost:3000"]
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.cors.allowed_origins.len(), 2);
    assert!(config
        .server
        .cors
        .allowed_origins
        .contains(&"https://myapp.com".to_string()));
}

#[test]
fn wildcard_cors_is_a_warning() {
    let toml_str = r#"
[server.cors]
allowed_origins = ["*"]
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, ConfigSeverity::Warning);
    assert_eq!(issues[0].field, "server.cors.allowed_origins");
}

#[test]
fn zero_max_turns_is_an_error() {
    let mut config = Config::default();
    config.assistant.max_turns = 0;
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|e| e.field == "assistant.max_turns" && e.severity == ConfigSeverity::Error));
}

#[test]
fn fixture_backend_requires_path() {
    let mut config = Config::default();
    config.data.backend = DataBackend::Fixture;
    let issues = config.validate();
    assert!(issues.iter().any(|e| e.field == "data.fixture_path"));
}

#[test]
fn validation_display_format() {
    let mut config = Config::default();
    config.server.port = 0;
    let issues = config.validate();
    assert_eq!(
        issues[0].to_string(),
        "[ERROR] server.port: port must be greater than 0"
    );
}
