//! Chat-completion client abstraction.
//!
//! The retrieval pipeline only needs one operation from a language model:
//! send a system and user prompt, get text back. Putting that behind a trait
//! keeps re-ranking and explanation logic testable with canned responses.

mod openai;

pub use openai::OpenAiChat;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for chat-completion models.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion from a system prompt and user prompt.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}
