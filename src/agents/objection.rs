//! Objection expert: detects customer objections and recommends next actions.

use super::lexicon::Normalized;
use super::{Agent, AgentKind, AgentResult, ObjectionAnalysis};
use crate::error::Result;
use crate::knowledge::KnowledgeContext;
use crate::transcription::Transcript;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Action recommended at the end of every plan.
const FOLLOW_UP_ACTION: &str = "Follow up within 48 hours";
/// Action recommended when the customer raised no objections.
const CONFIRM_ACTION: &str = "Confirm next steps and the decision timeline";

/// Objection categories, declared in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectionKind {
    Budget,
    Authority,
    Trust,
    Timing,
    Competition,
    Need,
}

impl ObjectionKind {
    pub const ALL: [ObjectionKind; 6] = [
        ObjectionKind::Budget,
        ObjectionKind::Authority,
        ObjectionKind::Trust,
        ObjectionKind::Timing,
        ObjectionKind::Competition,
        ObjectionKind::Need,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ObjectionKind::Budget => "budget",
            ObjectionKind::Authority => "authority",
            ObjectionKind::Trust => "trust",
            ObjectionKind::Timing => "timing",
            ObjectionKind::Competition => "competition",
            ObjectionKind::Need => "need",
        }
    }

    /// Parse a category label, accepting a few common synonyms.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        let kind = match label.as_str() {
            "budget" | "price" | "pricing" | "cost" => ObjectionKind::Budget,
            "authority" | "decision maker" | "approval" => ObjectionKind::Authority,
            "trust" | "proof" | "credibility" => ObjectionKind::Trust,
            "timing" | "time" | "urgency" => ObjectionKind::Timing,
            "competition" | "competitor" => ObjectionKind::Competition,
            "need" | "no need" | "status quo" => ObjectionKind::Need,
            _ => {
                return ObjectionKind::ALL
                    .into_iter()
                    .find(|k| label.contains(k.label()))
            }
        };
        Some(kind)
    }

    /// Customer phrases that raise this objection.
    pub(crate) fn triggers(&self) -> &'static [&'static str] {
        match self {
            ObjectionKind::Budget => &[
                "budget", "tight", "expensive", "afford", "too much", "pricey", "cheaper",
                "price range", "no money",
            ],
            ObjectionKind::Authority => &[
                "my boss", "my manager", "decision maker", "approval", "approve", "sign off",
                "check with", "the board", "procurement", "run it by",
            ],
            ObjectionKind::Trust => &[
                "actual numbers", "proof", "prove", "skeptical", "not convinced", "guarantee",
                "case study", "references", "too good to be true",
            ],
            ObjectionKind::Timing => &[
                "not now", "next quarter", "next year", "later", "bad time", "right time",
                "too busy", "revisit", "circle back",
            ],
            ObjectionKind::Competition => &[
                "competitor", "another vendor", "other vendor", "already using",
                "currently using", "cheaper option", "alternative",
            ],
            ObjectionKind::Need => &[
                "don t need", "do not need", "not a priority", "happy with", "no need",
                "works fine",
            ],
        }
    }

    /// Rep phrases that count as addressing this objection.
    pub(crate) fn responses(&self) -> &'static [&'static str] {
        match self {
            ObjectionKind::Budget => &[
                "roi", "value", "savings", "payback", "investment", "cost", "costs", "$",
                "discount", "payment plan",
            ],
            ObjectionKind::Authority => &[
                "decision", "stakeholder", "stakeholders", "team", "demo", "include", "loop in",
            ],
            ObjectionKind::Trust => &[
                "calculator", "case study", "numbers", "data", "reference", "trial", "proof",
                "results",
            ],
            ObjectionKind::Timing => &["timeline", "when", "quarter", "schedule", "start"],
            ObjectionKind::Competition => &[
                "compare", "comparison", "difference", "unlike", "advantage",
            ],
            ObjectionKind::Need => &["pain", "challenge", "problem", "impact", "cost of"],
        }
    }

    /// Built-in recommendation for this objection.
    pub fn action(&self) -> &'static str {
        match self {
            ObjectionKind::Budget => "Send the ROI calculator with a payback estimate for their budget cycle",
            ObjectionKind::Authority => "Schedule a demo with the decision-maker",
            ObjectionKind::Trust => "Share a customer case study with measured results",
            ObjectionKind::Timing => "Agree on a follow-up date aligned with their planning cycle",
            ObjectionKind::Competition => "Send a side-by-side comparison against the alternatives they named",
            ObjectionKind::Need => "Run a discovery session to confirm the business pain",
        }
    }

    /// How an open objection reads in the executive summary.
    pub fn missed_opportunity(&self) -> &'static str {
        match self {
            ObjectionKind::Budget => "Budget constraints raised by the customer",
            ObjectionKind::Authority => "Decision-maker not involved in the conversation",
            ObjectionKind::Trust => "Customer asked for proof of results",
            ObjectionKind::Timing => "Purchase timing pushed out by the customer",
            ObjectionKind::Competition => "Competing alternatives under consideration",
            ObjectionKind::Need => "Customer not yet convinced of the need",
        }
    }

    /// Objections raised in the given customer text, in priority order.
    pub(crate) fn detect(customer_text: &Normalized) -> Vec<ObjectionKind> {
        ObjectionKind::ALL
            .into_iter()
            .filter(|k| customer_text.mentions_any(k.triggers()))
            .collect()
    }
}

impl std::fmt::Display for ObjectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Rule-based objection expert.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectionExpertAgent;

impl ObjectionExpertAgent {
    /// Detect objections in customer lines and plan next actions.
    ///
    /// Playbook lines from `knowledge` that mention an objection are recommended
    /// ahead of the built-in action for it. An empty knowledge context only
    /// removes those playbook entries. Without speaker tags no line belongs to
    /// the customer, so no objections are reported.
    #[instrument(skip_all)]
    pub fn detect_objections(
        &self,
        transcript: &Transcript,
        knowledge: &KnowledgeContext,
    ) -> ObjectionAnalysis {
        let objections = if transcript.is_speaker_tagged() {
            let customer = Normalized::from_utterances(&transcript.customer_utterances());
            ObjectionKind::detect(&customer)
        } else {
            Vec::new()
        };

        let mut next_actions: Vec<String> = Vec::new();
        for kind in &objections {
            let mut terms = vec![kind.label()];
            terms.extend_from_slice(kind.triggers());
            if let Some(guidance) = knowledge.guidance_for(&terms) {
                push_unique(
                    &mut next_actions,
                    format!("Apply playbook guidance on {}: {}", kind, guidance),
                );
            }
            push_unique(&mut next_actions, kind.action().to_string());
        }
        if objections.is_empty() {
            push_unique(&mut next_actions, CONFIRM_ACTION.to_string());
        }
        push_unique(&mut next_actions, FOLLOW_UP_ACTION.to_string());

        debug!("{} objections, {} actions", objections.len(), next_actions.len());

        ObjectionAnalysis {
            objections_detected: objections.iter().map(|k| k.label().to_string()).collect(),
            next_actions,
        }
    }
}

#[async_trait]
impl Agent for ObjectionExpertAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::ObjectionExpert
    }

    async fn run(&self, transcript: &Transcript, knowledge: &KnowledgeContext) -> Result<AgentResult> {
        Ok(AgentResult::ObjectionExpert(
            self.detect_objections(transcript, knowledge),
        ))
    }
}

fn push_unique(actions: &mut Vec<String>, action: String) {
    if !actions.contains(&action) {
        actions.push(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_objection_scenario() {
        let transcript = Transcript::new(
            "Customer: budget is tight. Rep: solution costs $5K with 3x ROI in 6 months.",
        )
        .unwrap();
        let analysis = ObjectionExpertAgent
            .detect_objections(&transcript, &KnowledgeContext::new("sales knowledge"));

        assert!(analysis.objections_detected.contains(&"budget".to_string()));
        assert_eq!(
            analysis.next_actions,
            vec![
                ObjectionKind::Budget.action().to_string(),
                FOLLOW_UP_ACTION.to_string(),
            ]
        );
    }

    #[test]
    fn test_objections_in_priority_order() {
        let transcript = Transcript::new(
            "Customer: I need to check with my boss, and honestly it's too expensive.\n\
             Rep: Understood.",
        )
        .unwrap();
        let analysis = ObjectionExpertAgent.detect_objections(&transcript, &KnowledgeContext::empty());

        assert_eq!(analysis.objections_detected, vec!["budget", "authority"]);
        assert_eq!(analysis.next_actions[0], ObjectionKind::Budget.action());
        assert_eq!(analysis.next_actions[1], ObjectionKind::Authority.action());
        assert_eq!(analysis.next_actions.last().unwrap(), FOLLOW_UP_ACTION);
    }

    #[test]
    fn test_rep_lines_do_not_raise_objections() {
        let transcript = Transcript::new(
            "Customer: Tell me more.\nRep: Many teams worry the budget is tight at first.",
        )
        .unwrap();
        let analysis = ObjectionExpertAgent.detect_objections(&transcript, &KnowledgeContext::empty());

        assert!(analysis.objections_detected.is_empty());
        assert_eq!(analysis.next_actions, vec![CONFIRM_ACTION, FOLLOW_UP_ACTION]);
    }

    #[test]
    fn test_role_words_in_speech_keep_attribution() {
        let transcript = Transcript::new(
            "Customer: I already spoke to your support agent: honestly the budget is tight.\n\
             Rep: Understood.",
        )
        .unwrap();
        let analysis = ObjectionExpertAgent.detect_objections(&transcript, &KnowledgeContext::empty());
        assert_eq!(analysis.objections_detected, vec!["budget"]);

        let transcript = Transcript::new(
            "Customer: Tell me more.\n\
             Rep: Our newest client: Acme, said it was too expensive until they saw the ROI.",
        )
        .unwrap();
        let analysis = ObjectionExpertAgent.detect_objections(&transcript, &KnowledgeContext::empty());
        assert!(analysis.objections_detected.is_empty());
    }

    #[test]
    fn test_untagged_transcript_raises_no_objections() {
        let transcript = Transcript::new(
            "We are a cheaper option than any competitor and the price is locked for a year.",
        )
        .unwrap();
        let analysis = ObjectionExpertAgent.detect_objections(&transcript, &KnowledgeContext::empty());

        assert!(analysis.objections_detected.is_empty());
        assert_eq!(analysis.next_actions, vec![CONFIRM_ACTION, FOLLOW_UP_ACTION]);
    }

    #[test]
    fn test_playbook_guidance_comes_first() {
        let transcript = Transcript::new("Customer: The budget is tight.").unwrap();
        let knowledge = KnowledgeContext::new(
            "Intro calls: keep them short.\nBudget pushback: offer quarterly billing.",
        );
        let analysis = ObjectionExpertAgent.detect_objections(&transcript, &knowledge);

        assert_eq!(
            analysis.next_actions[0],
            "Apply playbook guidance on budget: Budget pushback: offer quarterly billing."
        );
        assert_eq!(analysis.next_actions[1], ObjectionKind::Budget.action());
    }

    #[test]
    fn test_from_label() {
        assert_eq!(ObjectionKind::from_label("Budget"), Some(ObjectionKind::Budget));
        assert_eq!(ObjectionKind::from_label("pricing"), Some(ObjectionKind::Budget));
        assert_eq!(
            ObjectionKind::from_label("Budget constraints"),
            Some(ObjectionKind::Budget)
        );
        assert_eq!(ObjectionKind::from_label("weather"), None);
    }
}
