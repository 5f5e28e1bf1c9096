//! Sales coach: strengths, improvement areas and a closing score.

use super::lexicon::{self, Normalized};
use super::objection::ObjectionKind;
use super::{Agent, AgentKind, AgentResult, CoachingFeedback};
use crate::error::Result;
use crate::knowledge::KnowledgeContext;
use crate::transcription::{Transcript, Utterance};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, instrument};

/// Money amounts, percentages, multipliers and time spans.
static QUANTIFIED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        \$\s?\d
        | \d+(\.\d+)?\s?(%|x\b|percent|k\b|days?\b|weeks?\b|months?\b|hours?\b)
        ",
    )
    .expect("Invalid regex")
});

const RAPPORT: &[&str] = &[
    "understand", "appreciate", "great question", "good question", "makes sense", "i hear you",
    "thank you", "thanks for", "absolutely", "of course",
];

const FOLLOW_UP: &[&str] = &[
    "i ll send", "i will send", "send you", "follow up", "schedule", "next step", "next steps",
    "set up a call", "calendar", "tomorrow", "next week",
];

const CLOSING_ASK: &[&str] = &[
    "sign", "move forward", "get started", "kick off", "purchase order", "ready to", "shall we",
    "does that work", "can we book", "start a trial", "pilot",
];

const POSITIVE_SIGNALS: &[&str] = &[
    "sounds good", "great", "interested", "love", "perfect", "let s do", "makes sense",
    "excited", "that works",
];

/// Rep questions needed to count as doing discovery.
const MIN_DISCOVERY_QUESTIONS: usize = 2;
/// Largest share of words the rep may speak in a balanced call.
const MAX_REP_SHARE: f64 = 0.7;
/// Playbook terms quoted in the alignment strength.
const MAX_QUOTED_TERMS: usize = 3;

const FALLBACK_STRENGTH: &str = "Completed the call and kept the customer in conversation";
const FALLBACK_IMPROVEMENT: &str = "Keep reinforcing this approach on upcoming calls";

/// One coaching criterion and how it reads when met or missed.
struct Check {
    passed: bool,
    strength: String,
    improvement: &'static str,
}

impl Check {
    fn new(passed: bool, strength: &str, improvement: &'static str) -> Self {
        Self {
            passed,
            strength: strength.to_string(),
            improvement,
        }
    }
}

/// Signals the coach reads from a transcript.
struct CallSignals {
    rep: Normalized,
    customer: Normalized,
    quantified: bool,
    rep_questions: usize,
    rep_share: Option<f64>,
    objections: Vec<ObjectionKind>,
}

impl CallSignals {
    fn read(transcript: &Transcript) -> Self {
        let rep_utterances = transcript.rep_utterances();
        let customer_utterances = transcript.customer_utterances();

        let rep_share = transcript.is_speaker_tagged().then(|| {
            let rep_words = word_total(&rep_utterances);
            let total = rep_words + word_total(&customer_utterances);
            if total == 0 {
                0.0
            } else {
                rep_words as f64 / total as f64
            }
        });

        let customer = Normalized::from_utterances(&customer_utterances);
        Self {
            rep: Normalized::from_utterances(&rep_utterances),
            objections: ObjectionKind::detect(&customer),
            customer,
            quantified: rep_utterances.iter().any(|u| QUANTIFIED.is_match(&u.text)),
            rep_questions: rep_utterances.iter().filter(|u| u.is_question()).count(),
            rep_share,
        }
    }

    fn objections_addressed(&self) -> bool {
        self.objections
            .iter()
            .all(|k| self.rep.mentions_any(k.responses()))
    }
}

/// Rule-based sales coach.
#[derive(Debug, Clone, Copy, Default)]
pub struct SalesCoachAgent;

impl SalesCoachAgent {
    /// Review the rep's performance.
    ///
    /// Every criterion lands in exactly one of the two lists, so strengths and
    /// improvements never overlap. Without knowledge the playbook criterion is
    /// skipped and the rest run on the transcript alone.
    #[instrument(skip_all)]
    pub fn coach(&self, transcript: &Transcript, knowledge: &KnowledgeContext) -> CoachingFeedback {
        let signals = CallSignals::read(transcript);
        let checks = checks(&signals, knowledge);

        let mut what_went_well: Vec<String> = Vec::new();
        let mut improvements: Vec<String> = Vec::new();
        for check in checks {
            if check.passed {
                what_went_well.push(check.strength);
            } else {
                improvements.push(check.improvement.to_string());
            }
        }
        if what_went_well.is_empty() {
            what_went_well.push(FALLBACK_STRENGTH.to_string());
        }
        if improvements.is_empty() {
            improvements.push(FALLBACK_IMPROVEMENT.to_string());
        }

        let closing_score = closing_score(&signals);
        debug!(
            "{} strengths, {} improvements, closing {}",
            what_went_well.len(),
            improvements.len(),
            closing_score
        );

        CoachingFeedback {
            what_went_well,
            improvements,
            closing_score,
        }
    }
}

#[async_trait]
impl Agent for SalesCoachAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::SalesCoach
    }

    async fn run(&self, transcript: &Transcript, knowledge: &KnowledgeContext) -> Result<AgentResult> {
        Ok(AgentResult::SalesCoach(self.coach(transcript, knowledge)))
    }
}

fn checks(signals: &CallSignals, knowledge: &KnowledgeContext) -> Vec<Check> {
    let mut checks = vec![
        Check::new(
            signals.rep.mentions_any(RAPPORT),
            "Built rapport by acknowledging the customer's concerns",
            "Acknowledge the customer's concerns before responding",
        ),
        Check::new(
            signals.quantified,
            "Quantified value with concrete figures",
            "Quantify ROI with specific numbers",
        ),
        Check::new(
            signals.rep_questions >= MIN_DISCOVERY_QUESTIONS,
            "Asked discovery questions to understand needs",
            "Ask more discovery questions to uncover needs",
        ),
        Check::new(
            signals.rep.mentions_any(FOLLOW_UP),
            "Committed to a concrete follow-up",
            "Propose specific next steps with a date",
        ),
        Check::new(
            signals.rep.mentions_any(CLOSING_ASK),
            "Asked for a commitment to move the deal forward",
            "Make an explicit ask to move the deal forward",
        ),
    ];

    if let Some(share) = signals.rep_share {
        checks.push(Check::new(
            share <= MAX_REP_SHARE,
            "Kept the conversation balanced and let the customer speak",
            "Let the customer speak more; the rep dominated the conversation",
        ));
    }

    if !signals.objections.is_empty() {
        checks.push(Check::new(
            signals.objections_addressed(),
            "Addressed the customer's objections directly",
            "Respond to each objection the customer raised",
        ));
    }

    if !knowledge.is_empty() {
        let applied: Vec<String> = knowledge
            .key_terms()
            .into_iter()
            .filter(|term| signals.rep.mentions(term))
            .take(MAX_QUOTED_TERMS)
            .collect();
        checks.push(Check::new(
            !applied.is_empty(),
            &format!("Applied playbook guidance ({})", applied.join(", ")),
            "Work the playbook's key points into the conversation",
        ));
    }

    checks
}

/// Closing score on a 0-10 scale.
///
/// Follow-up commitment 3.0, explicit closing ask 2.5, quantified value 2.0,
/// objection handling 1.5 (half credit when no objection came up) and positive
/// customer signals 1.0.
fn closing_score(signals: &CallSignals) -> f64 {
    let mut score = 0.0;
    if signals.rep.mentions_any(FOLLOW_UP) {
        score += 3.0;
    }
    if signals.rep.mentions_any(CLOSING_ASK) {
        score += 2.5;
    }
    if signals.quantified {
        score += 2.0;
    }
    if signals.objections.is_empty() {
        score += 0.75;
    } else if signals.objections_addressed() {
        score += 1.5;
    }
    if signals.customer.mentions_any(POSITIVE_SIGNALS) {
        score += 1.0;
    }
    lexicon::score(score)
}

fn word_total(utterances: &[&Utterance]) -> usize {
    utterances.iter().map(|u| u.word_count()).sum()
}
