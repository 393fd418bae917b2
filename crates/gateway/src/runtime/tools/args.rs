//! Argument extraction shared by the tool handlers.
//!
//! Models send loosely typed arguments: numbers as strings, ids as either,
//! dates with or without a time. These helpers normalize all of that.

use chrono::{DateTime, Utc};
use serde_json::Value;

pub(crate) use dp_domain::records::DayEdge;
use dp_domain::records::{parse_timestamp, value_to_id};

use super::ToolError;

/// `limit` clamped to `[1, max]`. Absent, zero, negative or non-numeric
/// values fall back to `default`.
pub(crate) fn limit(args: &Value, default: usize, max: usize) -> usize {
    let raw = match args.get("limit") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(n) if n >= 1.0 => (n as usize).min(max),
        _ => default,
    }
}

/// A non-blank string argument.
pub(crate) fn opt_str<'a>(args: &'a Value, name: &str) -> Option<&'a str> {
    args.get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub(crate) fn req_str<'a>(args: &'a Value, name: &'static str) -> Result<&'a str, ToolError> {
    opt_str(args, name).ok_or(ToolError::MissingArgument(name))
}

/// An id given as a string or a number.
pub(crate) fn opt_id(args: &Value, name: &str) -> Option<String> {
    args.get(name)
        .and_then(value_to_id)
        .filter(|s| !s.trim().is_empty())
}

pub(crate) fn req_id(args: &Value, name: &'static str) -> Result<String, ToolError> {
    opt_id(args, name).ok_or(ToolError::MissingArgument(name))
}

/// An RFC 3339 timestamp or a `YYYY-MM-DD` date. Date-only values are
/// widened to the start or end of that day (UTC).
pub(crate) fn opt_date(
    args: &Value,
    name: &'static str,
    edge: DayEdge,
) -> Result<Option<DateTime<Utc>>, ToolError> {
    let Some(raw) = opt_str(args, name) else {
        return Ok(None);
    };
    parse_timestamp(raw, edge)
        .map(Some)
        .ok_or_else(|| ToolError::InvalidArgument {
            name,
            reason: format!("expected RFC 3339 or YYYY-MM-DD, got {raw:?}"),
        })
}
