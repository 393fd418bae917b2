//! The `DataProvider` trait defines the interface to the host
//! application's productivity data (REST backend, JSON fixture, test
//! doubles).

use async_trait::async_trait;
use dp_domain::error::Result;
use dp_domain::records::{CalendarEvent, Client, Note, Project, Task, TaskQuery};

/// Read access to notes, tasks, projects, calendar events, clients, and
/// the aggregated dashboard snapshot.
///
/// Every method is read-only. The assistant never writes through this
/// trait; creation requests are echoed back for the UI to finalize.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Aggregated counts and summaries for the dashboard (GET /api/dashboard).
    async fn get_dashboard_snapshot(&self) -> Result<serde_json::Value>;

    /// Most recent notes, at most `limit` (GET /api/notes).
    async fn get_notes(&self, limit: usize) -> Result<Vec<Note>>;

    /// Tasks matching `query` (GET /api/tasks).
    async fn get_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>>;

    /// All projects (GET /api/projects).
    async fn get_projects(&self) -> Result<Vec<Project>>;

    /// All calendar events (GET /api/events).
    async fn get_events(&self) -> Result<Vec<CalendarEvent>>;

    /// All clients (GET /api/clients).
    async fn get_clients(&self) -> Result<Vec<Client>>;
}
