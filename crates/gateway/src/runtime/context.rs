//! Opening transcript for one assistant request.

use chrono::{DateTime, Utc};
use serde_json::Value;

use dp_domain::tool::Message;

/// The assistant's priming reply placed between system prompt and user
/// message.
pub const PRIMING_ACK: &str =
    "Understood. I have the dashboard context and will use the tools for anything else.";

const RULES: &str = "\
Rules:
- Never guess record contents. Call a tool whenever the answer depends on notes, tasks, projects, events or clients.
- When the user asks to show, list or see records, call the matching display tool (displayTasks, displayNotes, displayEvents, displayProjects, displayStats).
- A display tool result is wrapped in __WIDGET__ markers. Copy that whole span, markers included, into your answer exactly as received. Do not reformat, summarize or re-serialize it.
- createNote and createTask only prepare a draft. Never say a note or task was created or saved; tell the user to confirm it in the UI.
- Keep answers short and concrete.";

/// System prompt: role, today's date, the dashboard snapshot, and rules.
pub fn build_system_prompt(snapshot: &Value, now: DateTime<Utc>) -> String {
    let snapshot_json =
        serde_json::to_string_pretty(snapshot).unwrap_or_else(|_| snapshot.to_string());
    format!(
        "You are DeskPilot, the assistant built into the user's productivity workspace \
         (tasks, notes, projects, calendar, clients).\n\
         Today is {date} ({weekday}). Current time: {time} UTC.\n\n\
         Dashboard snapshot:\n{snapshot_json}\n\n{RULES}",
        date = now.format("%Y-%m-%d"),
        weekday = now.format("%A"),
        time = now.format("%H:%M"),
    )
}

/// System prompt, priming acknowledgement, user message.
pub fn initial_transcript(system_prompt: String, user_message: &str) -> Vec<Message> {
    vec![
        Message::system(system_prompt),
        Message::assistant(PRIMING_ACK),
        Message::user(user_message),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use dp_domain::tool::Role;
    use serde_json::json;

    #[test]
    fn prompt_carries_date_and_snapshot() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();
        let prompt = build_system_prompt(&json!({"tasks": {"total": 12}}), now);
        assert!(prompt.contains("Today is 2026-03-02 (Monday)"));
        assert!(prompt.contains("\"total\": 12"));
        assert!(prompt.contains("__WIDGET__"));
        assert!(prompt.contains("Never say a note or task was created"));
    }

    #[test]
    fn transcript_order() {
        let t = initial_transcript("sys".into(), "hello");
        let roles: Vec<Role> = t.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::Assistant, Role::User]);
        assert_eq!(t[2].content.text(), Some("hello"));
    }
}
