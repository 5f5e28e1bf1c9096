//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway.

use crate::config::{AgentBackend, Settings, TranscriptionProvider};
use crate::error::{CoachError, Result};
use crate::openai::is_api_key_configured;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Analyzing a recording needs the transcription provider and the agents.
    AnalyzeRecording,
    /// Analyzing a text transcript needs only the agents.
    AnalyzeText,
    /// The server accepts both recordings and transcripts.
    Serve,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    let needs_transcription = matches!(operation, Operation::AnalyzeRecording | Operation::Serve);

    if needs_transcription && settings.transcription.provider == TranscriptionProvider::Whisper {
        check_api_key("transcription provider 'whisper'")?;
    }
    if settings.agents.backend == AgentBackend::Llm {
        check_api_key("agent backend 'llm'")?;
    }
    if let Some(path) = settings.playbook_path() {
        if !path.exists() {
            return Err(CoachError::Config(format!(
                "Playbook file not found: {}",
                path.display()
            )));
        }
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key(needed_by: &str) -> Result<()> {
    if is_api_key_configured() {
        return Ok(());
    }
    Err(CoachError::Config(format!(
        "OPENAI_API_KEY not set (required by {}). Set it with: export OPENAI_API_KEY='sk-...'",
        needed_by
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic_text_analysis_has_no_requirements() {
        assert!(check(Operation::AnalyzeText, &Settings::default()).is_ok());
    }

    #[test]
    fn test_demo_provider_needs_no_key() {
        let mut settings = Settings::default();
        settings.transcription.provider = TranscriptionProvider::Demo;
        assert!(check(Operation::Serve, &settings).is_ok());
    }

    #[test]
    fn test_missing_playbook_reported() {
        let mut settings = Settings::default();
        settings.knowledge.playbook_path = Some("/nonexistent/playbook.md".to_string());
        let err = check(Operation::AnalyzeText, &settings).unwrap_err();
        assert!(err.to_string().contains("Playbook file not found"));
    }
}
