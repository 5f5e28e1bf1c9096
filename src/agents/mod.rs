//! Analysis agents.
//!
//! Three independent agents each turn a transcript (and, for two of them, a
//! knowledge context) into one structured result:
//!
//! - [`TranscriptAnalyzerAgent`]: topics, customer needs, engagement score
//! - [`SalesCoachAgent`]: strengths, improvements, closing score
//! - [`ObjectionExpertAgent`]: objections and prioritized next actions
//!
//! The default implementations are rule based and deterministic. [`LlmAgent`]
//! provides the same contracts backed by a chat model.

mod analyzer;
mod coach;
pub(crate) mod lexicon;
mod llm;
mod objection;
mod results;

pub use analyzer::TranscriptAnalyzerAgent;
pub use coach::SalesCoachAgent;
pub use llm::LlmAgent;
pub use objection::{ObjectionExpertAgent, ObjectionKind};
pub use results::{
    AgentOutput, AgentResult, CoachingFeedback, ObjectionAnalysis, TranscriptAnalysis,
    NEUTRAL_SCORE,
};

use crate::error::Result;
use crate::knowledge::KnowledgeContext;
use crate::transcription::Transcript;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identifies one of the three analysis agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    TranscriptAnalyzer,
    SalesCoach,
    ObjectionExpert,
}

impl AgentKind {
    pub const ALL: [AgentKind; 3] = [
        AgentKind::TranscriptAnalyzer,
        AgentKind::SalesCoach,
        AgentKind::ObjectionExpert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::TranscriptAnalyzer => "transcript_analyzer",
            AgentKind::SalesCoach => "sales_coach",
            AgentKind::ObjectionExpert => "objection_expert",
        }
    }

    /// Human-readable name.
    pub fn title(&self) -> &'static str {
        match self {
            AgentKind::TranscriptAnalyzer => "Transcript Analyzer",
            AgentKind::SalesCoach => "Sales Coach",
            AgentKind::ObjectionExpert => "Objection Expert",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for analysis agents.
///
/// Agents receive only read-only inputs and share no state with each other, so
/// the orchestrator may run them in any order or concurrently.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Which result variant this agent produces.
    fn kind(&self) -> AgentKind;

    /// Analyze a transcript. Agents that do not use the knowledge context ignore it.
    async fn run(&self, transcript: &Transcript, knowledge: &KnowledgeContext) -> Result<AgentResult>;
}
