pub mod ask;
pub mod config;

use clap::{Parser, Subcommand};

/// DeskPilot: the assistant service for the productivity workspace.
#[derive(Debug, Parser)]
#[command(name = "deskpilot", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server (default when no subcommand is given).
    Serve,
    /// Send one message to the assistant and print the reply.
    Ask {
        /// The message to send.
        message: String,
        /// Print the reply, turn count and tool calls as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the tool catalog offered to the model.
    Tools,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `DP_CONFIG` (or
/// `config.toml` by default). A missing file yields the defaults.
/// Returns the parsed [`Config`](dp_domain::config::Config) and the path
/// that was used.
pub fn load_config() -> anyhow::Result<(dp_domain::config::Config, String)> {
    let config_path = std::env::var("DP_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = load_config_from(&config_path)?;
    Ok((config, config_path))
}

pub fn load_config_from(config_path: &str) -> anyhow::Result<dp_domain::config::Config> {
    if !std::path::Path::new(config_path).exists() {
        return Ok(dp_domain::config::Config::default());
    }
    let raw = std::fs::read_to_string(config_path)
        .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))
}
