use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Assistant loop bounds
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Maximum model round-trips per request. Reaching it while the model
    /// still asks for tools fails the request.
    #[serde(default = "d_max_turns")]
    pub max_turns: usize,
    /// Overall deadline for one assistant request, all turns included.
    #[serde(default = "d_60000")]
    pub request_timeout_ms: u64,
    /// How many notes `searchNotes` pulls before filtering.
    #[serde(default = "d_50")]
    pub notes_search_pool: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            max_turns: d_max_turns(),
            request_timeout_ms: 60_000,
            notes_search_pool: 50,
        }
    }
}

fn d_max_turns() -> usize {
    5
}
fn d_60000() -> u64 {
    60_000
}
fn d_50() -> usize {
    50
}
