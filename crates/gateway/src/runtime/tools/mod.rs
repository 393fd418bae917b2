//! Tool registry for the assistant: the catalog sent to the model and the
//! dispatch table are both produced from the registered handlers.

mod args;
mod deferred;
mod display;
mod query;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use dp_data::DataProvider;
use dp_domain::tool::ToolDefinition;

use super::widget::ToolOutput;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Handler contract
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Everything a tool may read while handling one call.
#[derive(Clone)]
pub struct ToolContext {
    pub data: Arc<dyn DataProvider>,
    /// Request time; "upcoming" and date-only arguments are relative to it.
    pub now: DateTime<Utc>,
    /// How many notes `searchNotes` pulls before filtering.
    pub notes_search_pool: usize,
}

/// Tool-level failures. Each one becomes `{"error": "<message>"}` in the
/// transcript; none of them aborts the request.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0} is required")]
    MissingArgument(&'static str),

    #[error("invalid {name}: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error(transparent)]
    Data(#[from] dp_domain::error::Error),
}

#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn call(&self, ctx: &ToolContext, args: &Value) -> Result<ToolOutput, ToolError>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Registry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Name → handler map that remembers registration order for the catalog.
#[derive(Default)]
pub struct ToolRegistry {
    handlers: Vec<(String, Arc<dyn ToolHandler>)>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sixteen built-in assistant tools.
    pub fn builtin() -> Self {
        let mut reg = Self::new();
        query::register(&mut reg);
        deferred::register(&mut reg);
        display::register(&mut reg);
        reg
    }

    /// Add a handler. A later registration with the same name replaces the
    /// earlier one in place.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        let name = handler.definition().name;
        match self.index.get(&name) {
            Some(&i) => self.handlers[i].1 = handler,
            None => {
                self.index.insert(name.clone(), self.handlers.len());
                self.handlers.push((name, handler));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Tool definitions in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.handlers.iter().map(|(_, h)| h.definition()).collect()
    }

    /// Run one tool call.
    pub async fn dispatch(
        &self,
        ctx: &ToolContext,
        name: &str,
        args: &Value,
    ) -> Result<ToolOutput, ToolError> {
        let Some(&i) = self.index.get(name) else {
            return Err(ToolError::UnknownTool(name.to_string()));
        };
        self.handlers[i].1.call(ctx, args).await
    }
}
