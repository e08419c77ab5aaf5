//! Configuration module for Sikt.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{
    ExplainPrompts, IntentPrompts, Prompts, RerankPrompts, ScenePrompts, StudyPrompts,
    SuggestPrompts,
};
pub use settings::{
    EmbeddingSettings, GeneralSettings, IndexSettings, LlmSettings, ProcessingSettings,
    PromptSettings, SearchSettings, ServerSettings, Settings,
};
