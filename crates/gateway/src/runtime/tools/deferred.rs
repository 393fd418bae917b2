//! Creation tools. They never write: the arguments are echoed back with an
//! instruction for the UI to finalize the record.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use dp_domain::tool::ToolDefinition;

use super::args;
use super::query::def;
use super::{ToolContext, ToolError, ToolHandler, ToolRegistry};
use crate::runtime::widget::ToolOutput;

pub(super) fn register(reg: &mut ToolRegistry) {
    reg.register(Arc::new(CreateNote));
    reg.register(Arc::new(CreateTask));
}

/// Every argument the model sent, nulls dropped.
fn echo(args: &Value) -> Map<String, Value> {
    args.as_object()
        .map(|obj| {
            obj.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        })
        .unwrap_or_default()
}

struct CreateNote;

#[async_trait::async_trait]
impl ToolHandler for CreateNote {
    fn definition(&self) -> ToolDefinition {
        def(
            "createNote",
            "Prepare a new note. The user confirms it in the UI; nothing is saved by this call.",
            json!({
                "type": "object",
                "properties": {
                    "title": { "type": "string", "description": "Note title" },
                    "content": { "type": "string", "description": "Note body" }
                },
                "required": ["title"]
            }),
        )
    }

    async fn call(&self, _ctx: &ToolContext, args: &Value) -> Result<ToolOutput, ToolError> {
        args::req_str(args, "title")?;
        Ok(ToolOutput::Data(json!({
            "success": true,
            "message": "Use the UI to finalize note creation.",
            "note": echo(args),
        })))
    }
}

struct CreateTask;

#[async_trait::async_trait]
impl ToolHandler for CreateTask {
    fn definition(&self) -> ToolDefinition {
        def(
            "createTask",
            "Prepare a new task. The user confirms it in the UI; nothing is saved by this call.",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Task name" },
                    "description": { "type": "string", "description": "Details" },
                    "priority": { "type": "string", "description": "low, medium or high" },
                    "dueDate": { "type": "string", "description": "Due date (YYYY-MM-DD)" },
                    "projectId": { "type": "string", "description": "Project to file it under" }
                },
                "required": ["name"]
            }),
        )
    }

    async fn call(&self, _ctx: &ToolContext, args: &Value) -> Result<ToolOutput, ToolError> {
        args::req_str(args, "name")?;
        let mut task = echo(args);
        task.insert("status".into(), json!("task"));
        Ok(ToolOutput::Data(json!({
            "success": true,
            "message": "Use the UI to finalize task creation.",
            "task": task,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dp_data::FixtureStore;

    fn ctx() -> ToolContext {
        ToolContext {
            data: Arc::new(FixtureStore::default()),
            now: Utc::now(),
            notes_search_pool: 50,
        }
    }

    #[tokio::test]
    async fn create_task_echoes_with_status() {
        let out = CreateTask.call(&ctx(), &json!({"name": "Ship release"})).await.unwrap();
        assert_eq!(
            out,
            ToolOutput::Data(json!({
                "success": true,
                "message": "Use the UI to finalize task creation.",
                "task": {"name": "Ship release", "status": "task"}
            }))
        );
    }

    #[tokio::test]
    async fn create_task_echoes_every_argument_and_forces_status() {
        let out = CreateTask
            .call(
                &ctx(),
                &json!({"name": "Ship", "tags": ["x"], "status": "done", "owner": null}),
            )
            .await
            .unwrap();
        assert_eq!(
            out.to_value()["task"],
            json!({"name": "Ship", "tags": ["x"], "status": "task"})
        );
    }

    #[tokio::test]
    async fn create_note_requires_title() {
        let err = CreateNote.call(&ctx(), &json!({"content": "x"})).await.unwrap_err();
        assert_eq!(err.to_string(), "title is required");
    }

    #[tokio::test]
    async fn create_note_echoes_arguments() {
        let out = CreateNote
            .call(&ctx(), &json!({"title": "Ideas", "content": "more"}))
            .await
            .unwrap();
        assert_eq!(out.to_value()["note"], json!({"title": "Ideas", "content": "more"}));
        assert_eq!(out.to_value()["success"], true);
    }

    #[tokio::test]
    async fn create_note_keeps_extra_arguments() {
        let out = CreateNote
            .call(&ctx(), &json!({"title": "Ideas", "pinned": true}))
            .await
            .unwrap();
        assert_eq!(out.to_value()["note"], json!({"title": "Ideas", "pinned": true}));
    }
}
