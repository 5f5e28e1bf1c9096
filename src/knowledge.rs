//! Knowledge context: background material (a sales playbook) for the coaching
//! and objection agents.

use crate::agents::lexicon::Normalized;
use crate::config::Settings;
use crate::error::{CoachError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Longest playbook excerpt quoted in a recommendation, in characters.
const MAX_GUIDANCE_CHARS: usize = 160;

/// Read-only background text supplied once per analysis run. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnowledgeContext(String);

impl KnowledgeContext {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the knowledge configured in settings: playbook file first, then
    /// inline text, otherwise empty.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        if let Some(path) = settings.playbook_path() {
            return Self::load(&path);
        }
        Ok(Self::new(settings.knowledge.text.clone().unwrap_or_default()))
    }

    /// Read a playbook file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CoachError::Config(format!("Failed to read playbook {}: {}", path.display(), e))
        })?;
        Ok(Self::new(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether there is no usable knowledge.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Distinct key terms of the playbook, sorted.
    pub(crate) fn key_terms(&self) -> Vec<String> {
        Normalized::new(&self.0).key_terms()
    }

    /// First playbook line that mentions any of `terms`, shortened for quoting.
    pub fn guidance_for(&self, terms: &[&str]) -> Option<String> {
        self.0
            .lines()
            .map(|line| line.trim().trim_start_matches(['-', '*', '#']).trim())
            .filter(|line| !line.is_empty())
            .find(|line| Normalized::new(line).mentions_any(terms))
            .map(shorten)
    }
}

fn shorten(line: &str) -> String {
    if line.chars().count() <= MAX_GUIDANCE_CHARS {
        return line.to_string();
    }
    let cut: String = line.chars().take(MAX_GUIDANCE_CHARS).collect();
    format!("{}...", cut.trim_end())
}
