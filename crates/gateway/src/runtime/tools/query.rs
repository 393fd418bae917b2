//! Read-only query tools. The fetch helpers here are shared with the
//! display tools so both families filter identically.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use dp_domain::records::{contains_ci, CalendarEvent, Client, Note, Project, Task, TaskQuery};
use dp_domain::tool::ToolDefinition;

use super::args::{self, DayEdge};
use super::{ToolContext, ToolError, ToolHandler, ToolRegistry};
use crate::runtime::widget::ToolOutput;

pub(super) fn register(reg: &mut ToolRegistry) {
    reg.register(Arc::new(SearchNotes));
    reg.register(Arc::new(ListTasks));
    reg.register(Arc::new(GetNote));
    reg.register(Arc::new(GetTask));
    reg.register(Arc::new(ListProjects));
    reg.register(Arc::new(GetProject));
    reg.register(Arc::new(ListEvents));
    reg.register(Arc::new(SearchClients));
    reg.register(Arc::new(GetStats));
}

// ── shared fetch helpers ─────────────────────────────────────────────

pub(super) fn to_json<T: Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(|e| ToolError::Data(e.into()))
}

/// Notes from the search pool whose title or content contains `query`.
/// Without a query the most recent notes are returned.
pub(super) async fn find_notes(
    ctx: &ToolContext,
    query: Option<&str>,
    limit: usize,
) -> Result<Vec<Note>, ToolError> {
    let notes = ctx.data.get_notes(ctx.notes_search_pool).await?;
    Ok(notes
        .into_iter()
        .filter(|n| query.map_or(true, |q| contains_ci(&n.title, q) || contains_ci(&n.content, q)))
        .take(limit)
        .collect())
}

/// `TaskQuery` built from `query`, `priority`, `status` and `projectId`.
pub(super) fn task_query(args: &Value, limit: usize) -> TaskQuery {
    TaskQuery {
        query: args::opt_str(args, "query").map(String::from),
        priority: args::opt_str(args, "priority").map(String::from),
        status: args::opt_str(args, "status").map(String::from),
        project_id: args::opt_id(args, "projectId"),
        limit: Some(limit),
    }
}

pub(super) async fn find_tasks(ctx: &ToolContext, query: &TaskQuery) -> Result<Vec<Task>, ToolError> {
    let mut tasks = ctx.data.get_tasks(query).await?;
    if let Some(limit) = query.limit {
        tasks.truncate(limit);
    }
    Ok(tasks)
}

pub(super) async fn find_projects(
    ctx: &ToolContext,
    status: Option<&str>,
    limit: usize,
) -> Result<Vec<Project>, ToolError> {
    let projects = ctx.data.get_projects().await?;
    Ok(projects
        .into_iter()
        .filter(|p| {
            status.map_or(true, |s| {
                p.status.as_deref().is_some_and(|ps| ps.eq_ignore_ascii_case(s))
            })
        })
        .take(limit)
        .collect())
}

/// Events whose `start` lies in the inclusive window, earliest first.
pub(super) async fn find_events(
    ctx: &ToolContext,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    limit: usize,
) -> Result<Vec<CalendarEvent>, ToolError> {
    let mut events: Vec<CalendarEvent> = ctx
        .data
        .get_events()
        .await?
        .into_iter()
        .filter(|e| from.map_or(true, |f| e.start >= f) && to.map_or(true, |t| e.start <= t))
        .collect();
    events.sort_by_key(|e| e.start);
    events.truncate(limit);
    Ok(events)
}

fn client_matches(client: &Client, q: &str) -> bool {
    contains_ci(&client.name, q)
        || client.email.as_deref().is_some_and(|e| contains_ci(e, q))
        || client.company.as_deref().is_some_and(|c| contains_ci(c, q))
}

pub(super) fn limit_schema(default: usize, max: usize) -> Value {
    json!({
        "type": "integer",
        "description": format!("Maximum results (default {default}, max {max})")
    })
}

pub(super) fn task_filter_schema(default: usize, max: usize) -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": { "type": "string", "description": "Text to match in name or description" },
            "priority": { "type": "string", "description": "Priority, e.g. low, medium, high" },
            "status": { "type": "string", "description": "Status, e.g. task, in_progress, done" },
            "projectId": { "type": "string", "description": "Only tasks in this project" },
            "limit": limit_schema(default, max)
        }
    })
}

pub(super) fn status_limit_schema(default: usize, max: usize) -> Value {
    json!({
        "type": "object",
        "properties": {
            "status": { "type": "string", "description": "Only projects with this status" },
            "limit": limit_schema(default, max)
        }
    })
}

pub(super) fn id_schema(what: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": { "type": "string", "description": format!("{what} id") }
        },
        "required": ["id"]
    })
}

pub(super) fn query_limit_schema(what: &str, default: usize, max: usize, required: bool) -> Value {
    let mut schema = json!({
        "type": "object",
        "properties": {
            "query": { "type": "string", "description": format!("Text to match in {what}") },
            "limit": limit_schema(default, max)
        }
    });
    if required {
        schema["required"] = json!(["query"]);
    }
    schema
}

pub(super) fn empty_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

pub(super) fn def(name: &str, description: &str, parameters: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.into(),
        description: description.into(),
        parameters,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Handlers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct SearchNotes;

#[async_trait::async_trait]
impl ToolHandler for SearchNotes {
    fn definition(&self) -> ToolDefinition {
        def(
            "searchNotes",
            "Search the user's notes by title or content.",
            query_limit_schema("note titles and content", 5, 10, true),
        )
    }

    async fn call(&self, ctx: &ToolContext, args: &Value) -> Result<ToolOutput, ToolError> {
        let query = args::req_str(args, "query")?;
        let notes = find_notes(ctx, Some(query), args::limit(args, 5, 10)).await?;
        Ok(ToolOutput::Data(to_json(&notes)?))
    }
}

struct ListTasks;

#[async_trait::async_trait]
impl ToolHandler for ListTasks {
    fn definition(&self) -> ToolDefinition {
        def(
            "listTasks",
            "List tasks, optionally filtered by text, priority, status or project.",
            task_filter_schema(10, 20),
        )
    }

    async fn call(&self, ctx: &ToolContext, args: &Value) -> Result<ToolOutput, ToolError> {
        let query = task_query(args, args::limit(args, 10, 20));
        let tasks = find_tasks(ctx, &query).await?;
        Ok(ToolOutput::Data(to_json(&tasks)?))
    }
}

struct GetNote;

#[async_trait::async_trait]
impl ToolHandler for GetNote {
    fn definition(&self) -> ToolDefinition {
        def("getNote", "Fetch one note by id.", id_schema("Note"))
    }

    async fn call(&self, ctx: &ToolContext, args: &Value) -> Result<ToolOutput, ToolError> {
        let id = args::req_id(args, "id")?;
        let note = ctx
            .data
            .get_notes(ctx.notes_search_pool)
            .await?
            .into_iter()
            .find(|n| n.id == id)
            .ok_or(ToolError::NotFound("Note"))?;
        Ok(ToolOutput::Data(to_json(&note)?))
    }
}

struct GetTask;

#[async_trait::async_trait]
impl ToolHandler for GetTask {
    fn definition(&self) -> ToolDefinition {
        def("getTask", "Fetch one task by id.", id_schema("Task"))
    }

    async fn call(&self, ctx: &ToolContext, args: &Value) -> Result<ToolOutput, ToolError> {
        let id = args::req_id(args, "id")?;
        let task = ctx
            .data
            .get_tasks(&TaskQuery::default())
            .await?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or(ToolError::NotFound("Task"))?;
        Ok(ToolOutput::Data(to_json(&task)?))
    }
}

struct ListProjects;

#[async_trait::async_trait]
impl ToolHandler for ListProjects {
    fn definition(&self) -> ToolDefinition {
        def(
            "listProjects",
            "List projects, optionally filtered by status.",
            status_limit_schema(10, 20),
        )
    }

    async fn call(&self, ctx: &ToolContext, args: &Value) -> Result<ToolOutput, ToolError> {
        let projects =
            find_projects(ctx, args::opt_str(args, "status"), args::limit(args, 10, 20)).await?;
        Ok(ToolOutput::Data(to_json(&projects)?))
    }
}

struct GetProject;

#[async_trait::async_trait]
impl ToolHandler for GetProject {
    fn definition(&self) -> ToolDefinition {
        def("getProject", "Fetch one project by id.", id_schema("Project"))
    }

    async fn call(&self, ctx: &ToolContext, args: &Value) -> Result<ToolOutput, ToolError> {
        let id = args::req_id(args, "id")?;
        let project = ctx
            .data
            .get_projects()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or(ToolError::NotFound("Project"))?;
        Ok(ToolOutput::Data(to_json(&project)?))
    }
}

struct ListEvents;

#[async_trait::async_trait]
impl ToolHandler for ListEvents {
    fn definition(&self) -> ToolDefinition {
        def(
            "listEvents",
            "List calendar events starting within an optional date range, earliest first.",
            json!({
                "type": "object",
                "properties": {
                    "startDate": { "type": "string", "description": "Range start (YYYY-MM-DD or RFC 3339), inclusive" },
                    "endDate": { "type": "string", "description": "Range end (YYYY-MM-DD or RFC 3339), inclusive" },
                    "limit": limit_schema(10, 50)
                }
            }),
        )
    }

    async fn call(&self, ctx: &ToolContext, args: &Value) -> Result<ToolOutput, ToolError> {
        let from = args::opt_date(args, "startDate", DayEdge::Start)?;
        let to = args::opt_date(args, "endDate", DayEdge::End)?;
        let events = find_events(ctx, from, to, args::limit(args, 10, 50)).await?;
        Ok(ToolOutput::Data(to_json(&events)?))
    }
}

struct SearchClients;

#[async_trait::async_trait]
impl ToolHandler for SearchClients {
    fn definition(&self) -> ToolDefinition {
        def(
            "searchClients",
            "Search clients by name, email or company.",
            query_limit_schema("client name, email or company", 5, 10, true),
        )
    }

    async fn call(&self, ctx: &ToolContext, args: &Value) -> Result<ToolOutput, ToolError> {
        let query = args::req_str(args, "query")?;
        let limit = args::limit(args, 5, 10);
        let clients: Vec<Client> = ctx
            .data
            .get_clients()
            .await?
            .into_iter()
            .filter(|c| client_matches(c, query))
            .take(limit)
            .collect();
        Ok(ToolOutput::Data(to_json(&clients)?))
    }
}

struct GetStats;

#[async_trait::async_trait]
impl ToolHandler for GetStats {
    fn definition(&self) -> ToolDefinition {
        def(
            "getStats",
            "Get dashboard statistics: counts of tasks, notes, projects and events.",
            empty_schema(),
        )
    }

    async fn call(&self, ctx: &ToolContext, _args: &Value) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::Data(ctx.data.get_dashboard_snapshot().await?))
    }
}
