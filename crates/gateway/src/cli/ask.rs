//! `deskpilot ask`: one-shot assistant run.
//!
//! Sends a single message through the full tool-calling loop and prints
//! the final text. Useful for scripting and for trying prompts against a
//! fixture data set.

use std::sync::Arc;

use dp_domain::config::Config;

use crate::bootstrap;
use crate::runtime::run_assistant;

pub async fn run(config: Arc<Config>, message: String, json_output: bool) -> anyhow::Result<()> {
    let state = bootstrap::build_app_state(config)?;
    let deps = state.assistant_deps()?;

    let reply = run_assistant(&deps, &message).await?;

    if json_output {
        let json = serde_json::to_string_pretty(&reply)
            .map_err(|e| anyhow::anyhow!("serializing reply: {e}"))?;
        println!("{json}");
    } else {
        for call in &reply.tool_calls {
            eprintln!("\x1b[2m[tool: {}]\x1b[0m", call.name);
        }
        println!("{}", reply.text);
    }

    Ok(())
}

/// Print the tool catalog as pretty JSON.
pub fn print_tools() -> anyhow::Result<()> {
    let tools = crate::runtime::ToolRegistry::builtin().definitions();
    let json = serde_json::to_string_pretty(&tools)
        .map_err(|e| anyhow::anyhow!("serializing tool catalog: {e}"))?;
    println!("{json}");
    Ok(())
}
