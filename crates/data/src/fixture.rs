//! In-memory [`DataProvider`] backed by a JSON document.
//!
//! Used for demos, offline development, and tests. The document shape is
//! one array per collection plus an optional `dashboard` object:
//!
//! ```json
//! { "notes": [], "tasks": [], "projects": [], "events": [], "clients": [],
//!   "dashboard": { "...": "..." } }
//! ```
//!
//! When `dashboard` is absent a snapshot is computed from the collections.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use dp_domain::error::{Error, Result};
use dp_domain::records::{CalendarEvent, Client, Note, Project, Task, TaskQuery};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::provider::DataProvider;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureStore {
    #[serde(default)]
    notes: Vec<Note>,
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    events: Vec<CalendarEvent>,
    #[serde(default)]
    clients: Vec<Client>,
    #[serde(default)]
    dashboard: Option<Value>,
}

impl FixtureStore {
    /// Load a fixture document from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Data(format!("failed to read fixture {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
            .map_err(|e| Error::Data(format!("invalid fixture {}: {e}", path.display())))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn with_notes(mut self, notes: Vec<Note>) -> Self {
        self.notes = notes;
        self
    }

    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn with_projects(mut self, projects: Vec<Project>) -> Self {
        self.projects = projects;
        self
    }

    pub fn with_events(mut self, events: Vec<CalendarEvent>) -> Self {
        self.events = events;
        self
    }

    pub fn with_clients(mut self, clients: Vec<Client>) -> Self {
        self.clients = clients;
        self
    }

    pub fn with_dashboard(mut self, dashboard: Value) -> Self {
        self.dashboard = Some(dashboard);
        self
    }

    /// Counts per collection plus a task status breakdown.
    fn computed_snapshot(&self) -> Value {
        let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
        for task in &self.tasks {
            let status = task.status.clone().unwrap_or_else(|| "unknown".into());
            *by_status.entry(status).or_default() += 1;
        }
        json!({
            "notes": { "total": self.notes.len() },
            "tasks": { "total": self.tasks.len(), "byStatus": by_status },
            "projects": { "total": self.projects.len() },
            "events": { "total": self.events.len() },
            "clients": { "total": self.clients.len() },
        })
    }
}

#[async_trait]
impl DataProvider for FixtureStore {
    async fn get_dashboard_snapshot(&self) -> Result<Value> {
        Ok(self
            .dashboard
            .clone()
            .unwrap_or_else(|| self.computed_snapshot()))
    }

    async fn get_notes(&self, limit: usize) -> Result<Vec<Note>> {
        Ok(self.notes.iter().take(limit).cloned().collect())
    }

    async fn get_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>> {
        let matching = self.tasks.iter().filter(|t| query.matches(t)).cloned();
        Ok(match query.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }

    async fn get_projects(&self) -> Result<Vec<Project>> {
        Ok(self.projects.clone())
    }

    async fn get_events(&self) -> Result<Vec<CalendarEvent>> {
        Ok(self.events.clone())
    }

    async fn get_clients(&self) -> Result<Vec<Client>> {
        Ok(self.clients.clone())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "notes": [
            {"id": 1, "title": "Standup", "content": "Discuss release"},
            {"id": 2, "title": "Groceries", "content": "milk"}
        ],
        "tasks": [
            {"id": "t1", "name": "Ship release", "status": "in-progress", "priority": "high", "projectId": 7},
            {"id": "t2", "name": "Write docs", "status": "todo", "priority": "low"},
            {"id": "t3", "name": "Release notes", "status": "todo", "priority": "HIGH"}
        ]
    }"#;

    #[tokio::test]
    async fn numeric_ids_become_strings() {
        let store = FixtureStore::from_json(DOC).unwrap();
        let notes = store.get_notes(10).await.unwrap();
        assert_eq!(notes[0].id, "1");
        let tasks = store.get_tasks(&TaskQuery::default()).await.unwrap();
        assert_eq!(tasks[0].project_id.as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn notes_respect_limit() {
        let store = FixtureStore::from_json(DOC).unwrap();
        assert_eq!(store.get_notes(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn task_query_filters_and_limits() {
        let store = FixtureStore::from_json(DOC).unwrap();
        let q = TaskQuery {
            query: Some("release".into()),
            priority: Some("high".into()),
            ..Default::default()
        };
        let tasks = store.get_tasks(&q).await.unwrap();
        let ids: Vec<_> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t3"]);

        let q = TaskQuery {
            limit: Some(1),
            ..q
        };
        assert_eq!(store.get_tasks(&q).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn computed_snapshot_counts_collections() {
        let store = FixtureStore::from_json(DOC).unwrap();
        let snap = store.get_dashboard_snapshot().await.unwrap();
        assert_eq!(snap["notes"]["total"], 2);
        assert_eq!(snap["tasks"]["total"], 3);
        assert_eq!(snap["tasks"]["byStatus"]["todo"], 2);
        assert_eq!(snap["events"]["total"], 0);
    }

    #[tokio::test]
    async fn explicit_dashboard_wins() {
        let store = FixtureStore::default().with_dashboard(json!({"revenue": 42}));
        let snap = store.get_dashboard_snapshot().await.unwrap();
        assert_eq!(snap, json!({"revenue": 42}));
    }

    #[tokio::test]
    async fn all_day_events_load_alongside_timed_ones() {
        let store = FixtureStore::from_json(
            r#"{"events": [
                {"id": "e1", "title": "Review", "start": "2026-03-05T10:00:00Z"},
                {"id": "e2", "title": "Offsite", "start": "2026-03-06"}
            ]}"#,
        )
        .unwrap();
        let events = store.get_events().await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].start.to_rfc3339(), "2026-03-06T00:00:00+00:00");
    }

    #[test]
    fn missing_file_is_a_data_error() {
        let err = FixtureStore::from_path(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, Error::Data(_)));
    }
}
