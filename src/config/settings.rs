//! Configuration settings for callcoach.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub transcription: TranscriptionSettings,
    pub agents: AgentSettings,
    pub scoring: ScoringSettings,
    pub knowledge: KnowledgeSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level used when no -v flag is given (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Transcription provider for audio uploads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionProvider {
    /// OpenAI Whisper (default).
    #[default]
    Whisper,
    /// Fixed demonstration transcript, no API calls.
    Demo,
}

impl std::str::FromStr for TranscriptionProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "whisper" | "openai" => Ok(TranscriptionProvider::Whisper),
            "demo" => Ok(TranscriptionProvider::Demo),
            _ => Err(format!("Unknown transcription provider: {}", s)),
        }
    }
}

impl std::fmt::Display for TranscriptionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptionProvider::Whisper => write!(f, "whisper"),
            TranscriptionProvider::Demo => write!(f, "demo"),
        }
    }
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Transcription provider (whisper, demo).
    pub provider: TranscriptionProvider,
    /// Whisper model to use.
    pub model: String,
    /// Language hint passed to the transcription API (empty = auto-detect).
    pub language: String,
    /// Run an LLM pass that tags lines with Customer:/Rep: speakers.
    pub label_speakers: bool,
    /// Model used for speaker labeling.
    pub label_model: String,
    /// Request timeout for transcription calls, in seconds.
    pub timeout_seconds: u64,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            provider: TranscriptionProvider::Whisper,
            model: "whisper-1".to_string(),
            language: String::new(),
            label_speakers: true,
            label_model: "gpt-4o-mini".to_string(),
            timeout_seconds: 300,
        }
    }
}

/// Agent implementation backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AgentBackend {
    /// Deterministic rule-based agents (default).
    #[default]
    Heuristic,
    /// Chat model prompted for structured JSON output.
    Llm,
}

impl std::str::FromStr for AgentBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "heuristic" | "rules" => Ok(AgentBackend::Heuristic),
            "llm" | "openai" => Ok(AgentBackend::Llm),
            _ => Err(format!("Unknown agent backend: {}", s)),
        }
    }
}

impl std::fmt::Display for AgentBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentBackend::Heuristic => write!(f, "heuristic"),
            AgentBackend::Llm => write!(f, "llm"),
        }
    }
}

/// Analysis agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Backend used by all three agents.
    pub backend: AgentBackend,
    /// Chat model for the llm backend.
    pub model: String,
    /// Sampling seed for the llm backend.
    pub seed: i64,
    /// Per-agent timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            backend: AgentBackend::Heuristic,
            model: "gpt-4o-mini".to_string(),
            seed: 7,
            timeout_seconds: 30,
        }
    }
}

/// Weights for the executive summary's overall score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringSettings {
    /// Weight of the transcript analyzer's engagement score.
    pub analyzer_weight: f64,
    /// Weight of the sales coach's closing score.
    pub closing_weight: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            analyzer_weight: 0.4,
            closing_weight: 0.6,
        }
    }
}

/// Knowledge context (sales playbook) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct KnowledgeSettings {
    /// Inline knowledge text.
    pub text: Option<String>,
    /// Path to a playbook file; takes precedence over `text`.
    pub playbook_path: Option<String>,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins. A single "*" allows any origin.
    pub cors_origins: Vec<String>,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            settings.validate()?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::CoachError;

        let ScoringSettings {
            analyzer_weight,
            closing_weight,
        } = self.scoring;
        if !(analyzer_weight >= 0.0 && closing_weight >= 0.0) || analyzer_weight + closing_weight <= 0.0 {
            return Err(CoachError::Config(format!(
                "scoring weights must be non-negative with a positive sum (got {} and {})",
                analyzer_weight, closing_weight
            )));
        }
        if self.agents.timeout_seconds == 0 {
            return Err(CoachError::Config(
                "agents.timeout_seconds must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::CoachError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("callcoach")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded playbook path, if configured.
    pub fn playbook_path(&self) -> Option<PathBuf> {
        self.knowledge
            .playbook_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(Self::expand_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [agents]
            timeout_seconds = 5

            [server]
            port = 9000
            "#,
        )
        .unwrap();

        assert_eq!(settings.agents.timeout_seconds, 5);
        assert_eq!(settings.agents.backend, AgentBackend::Heuristic);
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.cors_origins.len(), 2);
        assert_eq!(settings.scoring, ScoringSettings::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.transcription.provider = TranscriptionProvider::Demo;
        settings.knowledge.text = Some("Always confirm budget owner.".to_string());
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.transcription.provider, TranscriptionProvider::Demo);
        assert_eq!(loaded.knowledge.text.as_deref(), Some("Always confirm budget owner."));
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let mut settings = Settings::default();
        settings.scoring.analyzer_weight = 0.0;
        settings.scoring.closing_weight = 0.0;
        assert!(settings.validate().is_err());

        settings.scoring.closing_weight = -1.0;
        settings.scoring.analyzer_weight = 2.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("openai".parse::<TranscriptionProvider>().unwrap(), TranscriptionProvider::Whisper);
        assert_eq!("DEMO".parse::<TranscriptionProvider>().unwrap(), TranscriptionProvider::Demo);
        assert!("vosk".parse::<TranscriptionProvider>().is_err());
        assert_eq!("llm".parse::<AgentBackend>().unwrap(), AgentBackend::Llm);
    }
}
