//! Tool results and their transcript encoding.
//!
//! Display tools return a widget: a typed payload the UI renders as a
//! card. Widgets travel inside the free-text tool message wrapped in a
//! pair of [`WIDGET_MARKER`] sentinels; everything else is plain JSON.
//! The model copies the marked span into its answer, and the client scans
//! the final text for marker pairs.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::tools::ToolError;

/// Delimiter placed on both sides of a widget's JSON.
///
/// Nothing escapes this literal inside user or model text; a message that
/// contains it verbatim will confuse the client's scanner.
pub const WIDGET_MARKER: &str = "__WIDGET__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Task,
    Note,
    Event,
    Project,
    Stats,
}

impl WidgetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Note => "note",
            Self::Event => "event",
            Self::Project => "project",
            Self::Stats => "stats",
        }
    }
}

/// A successful tool result.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// A plain JSON payload for the model to read.
    Data(Value),
    /// A display payload the UI renders as a card.
    Widget { kind: WidgetKind, data: Value },
}

impl ToolOutput {
    pub fn is_widget(&self) -> bool {
        matches!(self, Self::Widget { .. })
    }

    /// The JSON form of the result. Widgets become
    /// `{ "widget": "<kind>", "data": <payload> }`.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Data(v) => v.clone(),
            Self::Widget { kind, data } => json!({ "widget": kind.as_str(), "data": data }),
        }
    }
}

/// The content of the `tool` message for one dispatched call.
///
/// * widget → `__WIDGET__<json>__WIDGET__`
/// * data → `<json>`
/// * error → `{"error":"<message>"}`
pub fn encode_tool_result(result: &Result<ToolOutput, ToolError>) -> String {
    match result {
        Ok(output @ ToolOutput::Widget { .. }) => {
            format!("{WIDGET_MARKER}{}{WIDGET_MARKER}", output.to_value())
        }
        Ok(output) => output.to_value().to_string(),
        Err(e) => json!({ "error": e.to_string() }).to_string(),
    }
}
