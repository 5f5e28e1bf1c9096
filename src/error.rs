//! Error types for callcoach.

use crate::agents::AgentKind;
use thiserror::Error;

/// Library-level error type for callcoach operations.
#[derive(Error, Debug)]
pub enum CoachError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Agent {agent} failed: {reason}")]
    AgentFailure { agent: AgentKind, reason: String },

    #[error("Analysis unavailable: {0}")]
    PipelineFailure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),
}

impl CoachError {
    /// Pipeline stage this error belongs to, for user-facing error reports.
    pub fn stage(&self) -> &'static str {
        match self {
            CoachError::InvalidInput(_) => "input",
            CoachError::Transcription(_) => "transcription",
            CoachError::AgentFailure { .. } => "agents",
            CoachError::PipelineFailure(_) => "pipeline",
            CoachError::Config(_) | CoachError::TomlParse(_) => "config",
            CoachError::OpenAI(_) | CoachError::Http(_) => "upstream",
            CoachError::Io(_) | CoachError::Json(_) => "internal",
        }
    }

    /// Whether the error aborts the whole analysis (as opposed to degrading one agent).
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CoachError::AgentFailure { .. })
    }
}

/// Result type alias for callcoach operations.
pub type Result<T> = std::result::Result<T, CoachError>;
