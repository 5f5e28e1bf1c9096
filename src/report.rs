//! The analysis report returned for every successful run.

use crate::aggregate::ExecutiveSummary;
use crate::agents::{
    AgentOutput, AgentResult, CoachingFeedback, ObjectionAnalysis, TranscriptAnalysis,
};
use crate::error::Result;
use crate::transcription::Transcript;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caller-supplied metadata about the analyzed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    pub size_bytes: u64,
}

impl FileMetadata {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
        }
    }
}

/// Whether an agent's result in the report is its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Ok,
    /// The agent failed or timed out and its neutral default was substituted.
    Degraded,
}

/// One agent's slot in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEntry<T> {
    pub status: AgentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub result: T,
}

impl<T: AgentOutput> AgentEntry<T> {
    pub fn ok(result: T) -> Self {
        Self {
            status: AgentStatus::Ok,
            error: None,
            result,
        }
    }

    /// Entry holding the neutral default result.
    pub fn degraded(error: impl Into<String>) -> Self {
        Self {
            status: AgentStatus::Degraded,
            error: Some(error.into()),
            result: T::default(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.status == AgentStatus::Degraded
    }

    /// The agent's own result, if it produced one.
    pub fn completed(&self) -> Option<&T> {
        match self.status {
            AgentStatus::Ok => Some(&self.result),
            AgentStatus::Degraded => None,
        }
    }

    /// Turn an agent invocation outcome into a report entry.
    pub(crate) fn settle(outcome: Result<AgentResult>) -> Self {
        match outcome {
            Ok(result) => {
                let produced = result.kind();
                match T::from_result(result) {
                    Some(value) => Self::ok(value),
                    None => Self::degraded(format!(
                        "{} produced a {} result",
                        T::KIND,
                        produced
                    )),
                }
            }
            Err(e) => Self::degraded(e.to_string()),
        }
    }
}

/// Per-agent results, keyed by agent name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentsReport {
    pub transcript_analyzer: AgentEntry<TranscriptAnalysis>,
    pub sales_coach: AgentEntry<CoachingFeedback>,
    pub objection_expert: AgentEntry<ObjectionAnalysis>,
}

/// Complete result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Completion time of the run.
    pub timestamp: DateTime<Utc>,
    pub filename: String,
    /// Size of the analyzed file in bytes.
    pub filesize: u64,
    pub transcript: Transcript,
    pub agents: AgentsReport,
    pub executive_summary: ExecutiveSummary,
}

impl AnalysisReport {
    /// Whether any agent result in this report is a substituted default.
    pub fn is_degraded(&self) -> bool {
        !self.executive_summary.degraded_agents.is_empty()
    }
}
