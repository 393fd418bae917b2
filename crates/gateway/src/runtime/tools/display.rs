//! Display tools: the same fetches as the query tools, returned as widgets
//! the UI renders as cards.

use std::sync::Arc;

use serde_json::Value;

use dp_domain::tool::ToolDefinition;

use super::args;
use super::query::{
    def, empty_schema, find_events, find_notes, find_projects, find_tasks, query_limit_schema,
    status_limit_schema, task_filter_schema, task_query, to_json,
};
use super::{ToolContext, ToolError, ToolHandler, ToolRegistry};
use crate::runtime::widget::{ToolOutput, WidgetKind};

const DEFAULT_LIMIT: usize = 5;
const MAX_LIMIT: usize = 10;

pub(super) fn register(reg: &mut ToolRegistry) {
    reg.register(Arc::new(DisplayTasks));
    reg.register(Arc::new(DisplayNotes));
    reg.register(Arc::new(DisplayEvents));
    reg.register(Arc::new(DisplayProjects));
    reg.register(Arc::new(DisplayStats));
}

fn widget(kind: WidgetKind, data: Value) -> ToolOutput {
    ToolOutput::Widget { kind, data }
}

struct DisplayTasks;

#[async_trait::async_trait]
impl ToolHandler for DisplayTasks {
    fn definition(&self) -> ToolDefinition {
        def(
            "displayTasks",
            "Show tasks to the user as cards. Use when the user asks to see or list tasks.",
            task_filter_schema(DEFAULT_LIMIT, MAX_LIMIT),
        )
    }

    async fn call(&self, ctx: &ToolContext, args: &Value) -> Result<ToolOutput, ToolError> {
        let query = task_query(args, args::limit(args, DEFAULT_LIMIT, MAX_LIMIT));
        let tasks = find_tasks(ctx, &query).await?;
        Ok(widget(WidgetKind::Task, to_json(&tasks)?))
    }
}

struct DisplayNotes;

#[async_trait::async_trait]
impl ToolHandler for DisplayNotes {
    fn definition(&self) -> ToolDefinition {
        def(
            "displayNotes",
            "Show notes to the user as cards, optionally matching a search text.",
            query_limit_schema("note titles and content", DEFAULT_LIMIT, MAX_LIMIT, false),
        )
    }

    async fn call(&self, ctx: &ToolContext, args: &Value) -> Result<ToolOutput, ToolError> {
        let limit = args::limit(args, DEFAULT_LIMIT, MAX_LIMIT);
        let notes = find_notes(ctx, args::opt_str(args, "query"), limit).await?;
        Ok(widget(WidgetKind::Note, to_json(&notes)?))
    }
}

struct DisplayEvents;

#[async_trait::async_trait]
impl ToolHandler for DisplayEvents {
    fn definition(&self) -> ToolDefinition {
        def(
            "displayEvents",
            "Show upcoming calendar events to the user as cards, soonest first.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "limit": super::query::limit_schema(DEFAULT_LIMIT, MAX_LIMIT)
                }
            }),
        )
    }

    async fn call(&self, ctx: &ToolContext, args: &Value) -> Result<ToolOutput, ToolError> {
        let limit = args::limit(args, DEFAULT_LIMIT, MAX_LIMIT);
        let events = find_events(ctx, Some(ctx.now), None, limit).await?;
        Ok(widget(WidgetKind::Event, to_json(&events)?))
    }
}

struct DisplayProjects;

#[async_trait::async_trait]
impl ToolHandler for DisplayProjects {
    fn definition(&self) -> ToolDefinition {
        def(
            "displayProjects",
            "Show projects to the user as cards, optionally filtered by status.",
            status_limit_schema(DEFAULT_LIMIT, MAX_LIMIT),
        )
    }

    async fn call(&self, ctx: &ToolContext, args: &Value) -> Result<ToolOutput, ToolError> {
        let limit = args::limit(args, DEFAULT_LIMIT, MAX_LIMIT);
        let projects = find_projects(ctx, args::opt_str(args, "status"), limit).await?;
        Ok(widget(WidgetKind::Project, to_json(&projects)?))
    }
}

struct DisplayStats;

#[async_trait::async_trait]
impl ToolHandler for DisplayStats {
    fn definition(&self) -> ToolDefinition {
        def(
            "displayStats",
            "Show dashboard statistics to the user as a card.",
            empty_schema(),
        )
    }

    async fn call(&self, ctx: &ToolContext, _args: &Value) -> Result<ToolOutput, ToolError> {
        let snapshot = ctx.data.get_dashboard_snapshot().await?;
        Ok(widget(WidgetKind::Stats, snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use dp_data::FixtureStore;
    use dp_domain::records::{CalendarEvent, Task};
    use serde_json::{json, Map};

    fn task(id: usize) -> Task {
        Task {
            id: id.to_string(),
            name: format!("Task {id}"),
            description: None,
            priority: None,
            status: Some("task".into()),
            project_id: None,
            due_date: None,
            extra: Map::new(),
        }
    }

    fn ctx(store: FixtureStore) -> ToolContext {
        ToolContext {
            data: Arc::new(store),
            now: Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap(),
            notes_search_pool: 50,
        }
    }

    #[tokio::test]
    async fn display_tasks_defaults_to_five() {
        let store = FixtureStore::default().with_tasks((1..=8).map(task).collect());
        let out = DisplayTasks.call(&ctx(store), &json!({})).await.unwrap();
        match out {
            ToolOutput::Widget { kind, data } => {
                assert_eq!(kind, WidgetKind::Task);
                assert_eq!(data.as_array().unwrap().len(), 5);
            }
            other => panic!("expected widget, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn display_tasks_caps_at_ten() {
        let store = FixtureStore::default().with_tasks((1..=15).map(task).collect());
        let out = DisplayTasks.call(&ctx(store), &json!({"limit": 50})).await.unwrap();
        assert_eq!(out.to_value()["data"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn display_events_only_upcoming_sorted() {
        let c = ctx(FixtureStore::default());
        let now = c.now;
        let ev = |id: &str, offset: i64| CalendarEvent {
            id: id.into(),
            title: id.into(),
            start: now + Duration::hours(offset),
            end: None,
            extra: Map::new(),
        };
        let store = FixtureStore::default().with_events(vec![
            ev("later", 48),
            ev("past", -1),
            ev("soon", 2),
            ev("now", 0),
        ]);
        let c = ToolContext { data: Arc::new(store), ..c };

        let out = DisplayEvents.call(&c, &json!({})).await.unwrap();
        let value = out.to_value();
        assert_eq!(value["widget"], "event");
        let ids: Vec<_> = value["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["now", "soon", "later"]);
    }

    #[tokio::test]
    async fn display_stats_wraps_snapshot() {
        let store = FixtureStore::default().with_dashboard(json!({"notes": 2}));
        let out = DisplayStats.call(&ctx(store), &json!({})).await.unwrap();
        assert_eq!(out.to_value(), json!({"widget": "stats", "data": {"notes": 2}}));
    }
}
