//! Pipeline orchestrator for callcoach.
//!
//! Runs the three analysis agents concurrently on one transcript, recovers
//! individual agent failures as degraded entries, and aggregates the results
//! into an [`AnalysisReport`].

use crate::aggregate::Aggregator;
use crate::agents::{
    Agent, AgentKind, AgentResult, LlmAgent, ObjectionExpertAgent, SalesCoachAgent,
    TranscriptAnalyzerAgent,
};
use crate::config::{AgentBackend, Prompts, ScoringSettings, Settings};
use crate::error::{CoachError, Result};
use crate::knowledge::KnowledgeContext;
use crate::openai::create_client_with_timeout;
use crate::report::{AgentEntry, AgentsReport, AnalysisReport, FileMetadata};
use crate::transcription::{Transcript, TranscriptSource};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Default per-agent timeout.
const DEFAULT_AGENT_TIMEOUT: Duration = Duration::from_secs(30);

/// The agents used for a run, with their timeout and scoring weights.
///
/// Built per call from settings; cloning shares the agent instances.
#[derive(Clone)]
pub struct AgentSet {
    backend: AgentBackend,
    analyzer: Arc<dyn Agent>,
    coach: Arc<dyn Agent>,
    objection: Arc<dyn Agent>,
    timeout: Duration,
    scoring: ScoringSettings,
}

impl AgentSet {
    /// Rule-based agents with default timeout and weights.
    pub fn heuristic() -> Self {
        Self {
            backend: AgentBackend::Heuristic,
            analyzer: Arc::new(TranscriptAnalyzerAgent),
            coach: Arc::new(SalesCoachAgent),
            objection: Arc::new(ObjectionExpertAgent),
            timeout: DEFAULT_AGENT_TIMEOUT,
            scoring: ScoringSettings::default(),
        }
    }

    /// Build the agent set described by the settings.
    pub fn from_settings(settings: &Settings, prompts: &Prompts) -> Result<Self> {
        let timeout = Duration::from_secs(settings.agents.timeout_seconds);

        let set = match settings.agents.backend {
            AgentBackend::Heuristic => Self::heuristic(),
            AgentBackend::Llm => {
                info!("Using {} for analysis agents", settings.agents.model);
                let client = create_client_with_timeout(timeout)?;
                let agent = |kind: AgentKind| -> Arc<dyn Agent> {
                    Arc::new(LlmAgent::new(
                        kind,
                        client.clone(),
                        &settings.agents.model,
                        settings.agents.seed,
                        prompts.clone(),
                    ))
                };
                Self {
                    backend: AgentBackend::Llm,
                    analyzer: agent(AgentKind::TranscriptAnalyzer),
                    coach: agent(AgentKind::SalesCoach),
                    objection: agent(AgentKind::ObjectionExpert),
                    timeout: DEFAULT_AGENT_TIMEOUT,
                    scoring: ScoringSettings::default(),
                }
            }
        };

        Ok(set.with_timeout(timeout).with_scoring(settings.scoring))
    }

    pub fn with_analyzer(mut self, agent: Arc<dyn Agent>) -> Self {
        self.analyzer = agent;
        self
    }

    pub fn with_coach(mut self, agent: Arc<dyn Agent>) -> Self {
        self.coach = agent;
        self
    }

    pub fn with_objection(mut self, agent: Arc<dyn Agent>) -> Self {
        self.objection = agent;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringSettings) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn backend(&self) -> AgentBackend {
        self.backend
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Runs analyses with a fixed agent set.
#[derive(Clone)]
pub struct Orchestrator {
    agents: AgentSet,
}

impl Orchestrator {
    pub fn new(agents: AgentSet) -> Self {
        Self { agents }
    }

    /// Create an orchestrator from settings.
    pub fn from_settings(settings: &Settings, prompts: &Prompts) -> Result<Self> {
        Ok(Self::new(AgentSet::from_settings(settings, prompts)?))
    }

    pub fn agents(&self) -> &AgentSet {
        &self.agents
    }

    /// Analyze transcript text.
    ///
    /// Empty or whitespace-only text fails with `InvalidInput` before any agent
    /// runs.
    pub async fn run(
        &self,
        transcript: &str,
        knowledge: &KnowledgeContext,
        file: FileMetadata,
    ) -> Result<AnalysisReport> {
        let transcript = Transcript::new(transcript)?;
        self.run_transcript(transcript, knowledge, file).await
    }

    /// Analyze an already validated transcript.
    #[instrument(skip_all, fields(run_id = %Uuid::new_v4(), file = %file.name))]
    pub async fn run_transcript(
        &self,
        transcript: Transcript,
        knowledge: &KnowledgeContext,
        file: FileMetadata,
    ) -> Result<AnalysisReport> {
        info!(
            "Running analysis ({} utterances, knowledge: {})",
            transcript.utterances().len(),
            if knowledge.is_empty() { "none" } else { "provided" }
        );

        let (analysis, feedback, objections) = futures::join!(
            self.invoke(self.agents.analyzer.as_ref(), &transcript, knowledge),
            self.invoke(self.agents.coach.as_ref(), &transcript, knowledge),
            self.invoke(self.agents.objection.as_ref(), &transcript, knowledge),
        );

        let agents = AgentsReport {
            transcript_analyzer: AgentEntry::settle(analysis),
            sales_coach: AgentEntry::settle(feedback),
            objection_expert: AgentEntry::settle(objections),
        };

        let failures: Vec<String> = [
            (AgentKind::TranscriptAnalyzer, &agents.transcript_analyzer.error),
            (AgentKind::SalesCoach, &agents.sales_coach.error),
            (AgentKind::ObjectionExpert, &agents.objection_expert.error),
        ]
        .into_iter()
        .filter_map(|(kind, error)| error.as_ref().map(|e| format!("{}: {}", kind, e)))
        .collect();

        for failure in &failures {
            warn!("Agent degraded, using neutral default ({})", failure);
        }
        if failures.len() == AgentKind::ALL.len() {
            return Err(CoachError::PipelineFailure(format!(
                "all agents failed ({})",
                failures.join("; ")
            )));
        }

        let executive_summary = Aggregator::new(self.agents.scoring).aggregate(
            agents.transcript_analyzer.completed(),
            agents.sales_coach.completed(),
            agents.objection_expert.completed(),
        );
        info!("Overall score {}", executive_summary.overall_score);

        Ok(AnalysisReport {
            timestamp: Utc::now(),
            filename: file.name,
            filesize: file.size_bytes,
            transcript,
            agents,
            executive_summary,
        })
    }

    /// Transcribe a recording, then analyze it.
    ///
    /// Transcription failures are fatal and stop the run before any agent starts.
    #[instrument(skip(self, source, bytes, knowledge), fields(source = source.name(), size = bytes.len()))]
    pub async fn analyze_recording(
        &self,
        source: &dyn TranscriptSource,
        bytes: &[u8],
        filename: &str,
        knowledge: &KnowledgeContext,
    ) -> Result<AnalysisReport> {
        let transcript = source.transcribe(bytes, filename).await?;
        info!("Transcribed {} ({} chars)", filename, transcript.as_str().len());

        let file = FileMetadata::new(filename, bytes.len() as u64);
        self.run_transcript(transcript, knowledge, file).await
    }

    /// Run one agent under the timeout and check its result.
    async fn invoke(
        &self,
        agent: &dyn Agent,
        transcript: &Transcript,
        knowledge: &KnowledgeContext,
    ) -> Result<AgentResult> {
        let kind = agent.kind();
        let failure = |reason: String| CoachError::AgentFailure { agent: kind, reason };

        let result = tokio::time::timeout(self.agents.timeout, agent.run(transcript, knowledge))
            .await
            .map_err(|_| failure(format!("timed out after {:?}", self.agents.timeout)))?
            .map_err(|e| match e {
                CoachError::AgentFailure { .. } => e,
                other => failure(other.to_string()),
            })?;

        if result.kind() != kind {
            return Err(failure(format!("returned a {} result", result.kind())));
        }

        let result = result.normalized();
        result.validate()?;
        Ok(result)
    }
}
