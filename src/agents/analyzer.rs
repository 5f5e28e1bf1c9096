//! Transcript analyzer: topics, customer needs, engagement.

use super::lexicon::{self, Normalized, NEEDS, TOPICS};
use super::{Agent, AgentKind, AgentResult, TranscriptAnalysis};
use crate::error::Result;
use crate::knowledge::KnowledgeContext;
use crate::transcription::Transcript;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Turn count at which the conversation counts as fully interactive.
const FULL_TURNS: usize = 6;
/// Customer questions at which curiosity counts as fully engaged.
const FULL_QUESTIONS: usize = 3;
/// Topic count at which the discussion counts as fully broad.
const FULL_TOPICS: usize = 4;

/// Rule-based transcript analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranscriptAnalyzerAgent;

impl TranscriptAnalyzerAgent {
    /// Extract topics, customer needs and an engagement score.
    #[instrument(skip_all)]
    pub fn analyze(&self, transcript: &Transcript) -> TranscriptAnalysis {
        let topics = lexicon::matching_labels(&Normalized::new(transcript.as_str()), TOPICS);

        let customer = transcript.customer_utterances();
        let customer_needs = lexicon::matching_labels(&Normalized::from_utterances(&customer), NEEDS);

        let score = engagement_score(transcript, topics.len());
        debug!(
            "{} topics, {} needs, engagement {}",
            topics.len(),
            customer_needs.len(),
            score
        );

        TranscriptAnalysis {
            topics,
            customer_needs,
            score,
        }
    }
}

#[async_trait]
impl Agent for TranscriptAnalyzerAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::TranscriptAnalyzer
    }

    async fn run(&self, transcript: &Transcript, _knowledge: &KnowledgeContext) -> Result<AgentResult> {
        Ok(AgentResult::TranscriptAnalyzer(self.analyze(transcript)))
    }
}

/// Engagement on a 0-10 scale.
///
/// A 2.0 floor, plus up to 3.0 for balanced speaking time, 2.0 for customer
/// questions, 1.5 for back-and-forth turns and 1.5 for topic breadth.
/// Untagged transcripts get no credit for balance or turns.
fn engagement_score(transcript: &Transcript, topic_count: usize) -> f64 {
    let (balance, turns) = if transcript.is_speaker_tagged() {
        let customer_words: usize = transcript.customer_utterances().iter().map(|u| u.word_count()).sum();
        let rep_words: usize = transcript.rep_utterances().iter().map(|u| u.word_count()).sum();
        let total = customer_words + rep_words;
        let balance = if total == 0 {
            0.0
        } else {
            let share = customer_words as f64 / total as f64;
            1.0 - (share - 0.5).abs() * 2.0
        };
        (balance, transcript.utterances().len())
    } else {
        (0.0, 0)
    };

    let questions = transcript
        .customer_utterances()
        .iter()
        .filter(|u| u.is_question())
        .count();

    let raw = 2.0
        + 3.0 * balance
        + 2.0 * ratio(questions, FULL_QUESTIONS)
        + 1.5 * ratio(turns, FULL_TURNS)
        + 1.5 * ratio(topic_count, FULL_TOPICS);

    lexicon::score(raw)
}

fn ratio(value: usize, full: usize) -> f64 {
    value.min(full) as f64 / full as f64
}
