//! Reassembly of streamed tool calls.

use std::collections::BTreeMap;

use dp_domain::tool::ToolCall;
use serde_json::Value;

/// One tool call while its fragments are still arriving.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialToolCall {
    pub call_id: Option<String>,
    pub name: String,
    pub arguments: String,
}

/// Tool-call fragments keyed by their positional stream index.
///
/// Fragments are appended in arrival order. Nothing is interpreted until
/// [`finish`](Self::finish) runs after the stream has ended.
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    calls: BTreeMap<usize, PartialToolCall>,
}

impl ToolCallAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        index: usize,
        call_id: Option<&str>,
        name: Option<&str>,
        arguments: Option<&str>,
    ) {
        let entry = self.calls.entry(index).or_default();
        if let Some(id) = call_id.filter(|id| !id.is_empty()) {
            // First id wins; some servers repeat it on every fragment.
            entry.call_id.get_or_insert_with(|| id.to_string());
        }
        if let Some(name) = name {
            entry.name.push_str(name);
        }
        if let Some(args) = arguments {
            entry.arguments.push_str(args);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn get(&self, index: usize) -> Option<&PartialToolCall> {
        self.calls.get(&index)
    }

    /// Finalize every call in ascending index order.
    ///
    /// Arguments are parsed as JSON here. Empty text becomes `{}`; text
    /// that does not parse is logged and also becomes `{}` so the tool
    /// still runs. A call without an id gets `call_<index>`.
    pub fn finish(self) -> Vec<ToolCall> {
        self.calls
            .into_iter()
            .map(|(index, partial)| {
                let call_id = partial
                    .call_id
                    .unwrap_or_else(|| format!("call_{index}"));
                let arguments = parse_arguments(&call_id, &partial.name, &partial.arguments);
                ToolCall {
                    call_id,
                    tool_name: partial.name,
                    arguments,
                }
            })
            .collect()
    }
}

fn parse_arguments(call_id: &str, tool_name: &str, raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Default::default());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(
                call_id = %call_id,
                tool = %tool_name,
                error = %e,
                "tool call arguments are not valid JSON; defaulting to empty object"
            );
            Value::Object(Default::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fragments_concatenate_in_order() {
        let mut acc = ToolCallAccumulator::new();
        acc.push(0, Some("call_a"), Some("list"), Some("{\"li"));
        acc.push(0, None, Some("Tasks"), Some("mit\":"));
        acc.push(0, None, None, Some("3}"));

        let calls = acc.finish();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].call_id, "call_a");
        assert_eq!(calls[0].tool_name, "listTasks");
        assert_eq!(calls[0].arguments, json!({"limit": 3}));
    }

    #[test]
    fn calls_finish_in_index_order() {
        let mut acc = ToolCallAccumulator::new();
        acc.push(1, Some("b"), Some("getStats"), None);
        acc.push(0, Some("a"), Some("listProjects"), None);
        acc.push(1, None, None, Some("{}"));

        let names: Vec<_> = acc.finish().into_iter().map(|c| c.tool_name).collect();
        assert_eq!(names, vec!["listProjects", "getStats"]);
    }

    #[test]
    fn first_id_wins() {
        let mut acc = ToolCallAccumulator::new();
        acc.push(0, Some("first"), Some("getStats"), None);
        acc.push(0, Some("second"), None, None);
        assert_eq!(acc.get(0).unwrap().call_id.as_deref(), Some("first"));
    }

    #[test]
    fn missing_id_gets_synthetic_one() {
        let mut acc = ToolCallAccumulator::new();
        acc.push(3, None, Some("getStats"), None);
        assert_eq!(acc.finish()[0].call_id, "call_3");
    }

    #[test]
    fn empty_arguments_become_empty_object() {
        let mut acc = ToolCallAccumulator::new();
        acc.push(0, Some("a"), Some("displayTasks"), Some(""));
        assert_eq!(acc.finish()[0].arguments, json!({}));
    }

    #[test]
    fn malformed_arguments_become_empty_object() {
        let mut acc = ToolCallAccumulator::new();
        acc.push(0, Some("a"), Some("searchNotes"), Some("{not json"));
        assert_eq!(acc.finish()[0].arguments, json!({}));
    }
}
