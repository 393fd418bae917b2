//! Assistant runtime: builds the opening transcript, drives the streaming
//! tool-calling loop, and dispatches tools against the data layer.
//!
//! Entry point: [`run_assistant`] takes the user's message and returns the
//! final assistant text once the model stops asking for tools.

pub mod accumulator;
pub mod context;
pub mod error;
pub mod tools;
pub mod turn;
pub mod widget;

pub use error::AssistantError;
pub use tools::{ToolContext, ToolError, ToolHandler, ToolRegistry};
pub use turn::{run_assistant, run_assistant_at, AssistantDeps, AssistantReply, DispatchedCall};
pub use widget::{encode_tool_result, ToolOutput, WidgetKind, WIDGET_MARKER};
