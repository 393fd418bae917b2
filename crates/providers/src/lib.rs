pub mod openai_compat;
pub mod sse;
pub mod traits;
pub mod util;

// Re-exports for convenience.
pub use openai_compat::{OpenAiCompatProvider, OpenAiStreamParser};
pub use traits::{ChatRequest, LlmProvider};
