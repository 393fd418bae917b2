//! Productivity records owned by the host application's data layer.
//!
//! Only the fields the assistant filters or sorts on are typed; everything
//! else round-trips through `extra` so the records stay opaque to us.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_id_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(deserialize_with = "start_timestamp")]
    pub start: DateTime<Utc>,
    #[serde(
        default,
        deserialize_with = "opt_end_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub end: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Server-side filter accepted by the task accessor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl TaskQuery {
    /// Whether `task` passes every populated filter. `limit` is not applied.
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(q) = self.query.as_deref() {
            let in_desc = task
                .description
                .as_deref()
                .is_some_and(|d| contains_ci(d, q));
            if !contains_ci(&task.name, q) && !in_desc {
                return false;
            }
        }
        if let Some(p) = self.priority.as_deref() {
            if !task.priority.as_deref().is_some_and(|tp| tp.eq_ignore_ascii_case(p)) {
                return false;
            }
        }
        if let Some(s) = self.status.as_deref() {
            if !task.status.as_deref().is_some_and(|ts| ts.eq_ignore_ascii_case(s)) {
                return false;
            }
        }
        if let Some(pid) = self.project_id.as_deref() {
            if task.project_id.as_deref() != Some(pid) {
                return false;
            }
        }
        true
    }
}

/// Case-insensitive substring test.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// ── id helpers: backends hand out both numeric and string ids ──────

fn id_string<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    let v = Value::deserialize(de)?;
    value_to_id(&v).ok_or_else(|| serde::de::Error::custom("id must be a string or number"))
}

fn opt_id_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    let v = Option::<Value>::deserialize(de)?;
    Ok(v.as_ref().and_then(value_to_id))
}

/// Normalize a JSON id (string or number) to its string form.
pub fn value_to_id(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ── timestamps: all-day events arrive as bare dates ─────────────────

/// Which end of a day a date-only value stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayEdge {
    Start,
    End,
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date. Date-only values
/// are widened to the start or end of that day (UTC).
pub fn parse_timestamp(raw: &str, edge: DayEdge) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let time = match edge {
        DayEdge::Start => NaiveTime::from_hms_opt(0, 0, 0)?,
        DayEdge::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999)?,
    };
    Utc.from_local_datetime(&day.and_time(time)).single()
}

fn start_timestamp<'de, D: Deserializer<'de>>(de: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(de)?;
    parse_timestamp(&raw, DayEdge::Start).ok_or_else(|| {
        serde::de::Error::custom(format!("expected RFC 3339 or YYYY-MM-DD, got {raw:?}"))
    })
}

fn opt_end_timestamp<'de, D: Deserializer<'de>>(
    de: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(de)? else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_timestamp(&raw, DayEdge::End).map(Some).ok_or_else(|| {
        serde::de::Error::custom(format!("expected RFC 3339 or YYYY-MM-DD, got {raw:?}"))
    })
}
