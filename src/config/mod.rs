//! Configuration module for callcoach.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AgentPrompt, LabelingPrompts, Prompts};
pub use settings::{
    AgentBackend, AgentSettings, GeneralSettings, KnowledgeSettings, PromptSettings,
    ScoringSettings, ServerSettings, Settings, TranscriptionProvider, TranscriptionSettings,
};
