//! Structured results produced by the analysis agents.

use super::AgentKind;
use crate::error::{CoachError, Result};
use serde::{Deserialize, Serialize};

/// Score reported for an agent whose analysis is unavailable.
pub const NEUTRAL_SCORE: f64 = 5.0;

/// Output of the transcript analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptAnalysis {
    pub topics: Vec<String>,
    pub customer_needs: Vec<String>,
    /// Engagement score, 0-10.
    pub score: f64,
}

impl Default for TranscriptAnalysis {
    fn default() -> Self {
        Self {
            topics: Vec::new(),
            customer_needs: Vec::new(),
            score: NEUTRAL_SCORE,
        }
    }
}

/// Output of the sales coach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingFeedback {
    pub what_went_well: Vec<String>,
    pub improvements: Vec<String>,
    /// How well the call advanced toward a close, 0-10.
    pub closing_score: f64,
}

impl Default for CoachingFeedback {
    fn default() -> Self {
        Self {
            what_went_well: Vec::new(),
            improvements: Vec::new(),
            closing_score: NEUTRAL_SCORE,
        }
    }
}

/// Output of the objection expert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectionAnalysis {
    pub objections_detected: Vec<String>,
    /// Recommended actions, highest priority first.
    pub next_actions: Vec<String>,
}

/// A result tagged with the agent kind that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "agent", rename_all = "snake_case")]
pub enum AgentResult {
    TranscriptAnalyzer(TranscriptAnalysis),
    SalesCoach(CoachingFeedback),
    ObjectionExpert(ObjectionAnalysis),
}

impl AgentResult {
    pub fn kind(&self) -> AgentKind {
        match self {
            AgentResult::TranscriptAnalyzer(_) => AgentKind::TranscriptAnalyzer,
            AgentResult::SalesCoach(_) => AgentKind::SalesCoach,
            AgentResult::ObjectionExpert(_) => AgentKind::ObjectionExpert,
        }
    }

    /// Trim entries and drop blanks and duplicates, keeping first occurrences.
    pub fn normalized(self) -> Self {
        match self {
            AgentResult::TranscriptAnalyzer(a) => AgentResult::TranscriptAnalyzer(TranscriptAnalysis {
                topics: clean_list(a.topics),
                customer_needs: clean_list(a.customer_needs),
                score: a.score,
            }),
            AgentResult::SalesCoach(c) => AgentResult::SalesCoach(CoachingFeedback {
                what_went_well: clean_list(c.what_went_well),
                improvements: clean_list(c.improvements),
                closing_score: c.closing_score,
            }),
            AgentResult::ObjectionExpert(o) => AgentResult::ObjectionExpert(ObjectionAnalysis {
                objections_detected: clean_list(o.objections_detected),
                next_actions: clean_list(o.next_actions),
            }),
        }
    }

    /// Check the result against its agent's field contract.
    pub fn validate(&self) -> Result<()> {
        let kind = self.kind();
        let fail = |reason: String| CoachError::AgentFailure { agent: kind, reason };

        match self {
            AgentResult::TranscriptAnalyzer(a) => {
                check_score("score", a.score).map_err(fail)?;
                check_entries("topics", &a.topics).map_err(fail)?;
                check_entries("customer_needs", &a.customer_needs).map_err(fail)?;
            }
            AgentResult::SalesCoach(c) => {
                check_score("closing_score", c.closing_score).map_err(fail)?;
                check_entries("what_went_well", &c.what_went_well).map_err(fail)?;
                check_entries("improvements", &c.improvements).map_err(fail)?;
                check_non_empty("what_went_well", &c.what_went_well).map_err(fail)?;
                check_non_empty("improvements", &c.improvements).map_err(fail)?;
                if let Some(shared) = c
                    .what_went_well
                    .iter()
                    .find(|w| c.improvements.iter().any(|i| i.eq_ignore_ascii_case(w)))
                {
                    return Err(fail(format!(
                        "'{}' is listed as both a strength and an improvement",
                        shared
                    )));
                }
            }
            AgentResult::ObjectionExpert(o) => {
                check_entries("objections_detected", &o.objections_detected).map_err(fail)?;
                check_entries("next_actions", &o.next_actions).map_err(fail)?;
                check_non_empty("next_actions", &o.next_actions).map_err(fail)?;
            }
        }
        Ok(())
    }
}

/// Typed access to one variant of [`AgentResult`].
pub trait AgentOutput: Default + Sized {
    const KIND: AgentKind;

    fn from_result(result: AgentResult) -> Option<Self>;
}

impl AgentOutput for TranscriptAnalysis {
    const KIND: AgentKind = AgentKind::TranscriptAnalyzer;

    fn from_result(result: AgentResult) -> Option<Self> {
        match result {
            AgentResult::TranscriptAnalyzer(a) => Some(a),
            _ => None,
        }
    }
}

impl AgentOutput for CoachingFeedback {
    const KIND: AgentKind = AgentKind::SalesCoach;

    fn from_result(result: AgentResult) -> Option<Self> {
        match result {
            AgentResult::SalesCoach(c) => Some(c),
            _ => None,
        }
    }
}

impl AgentOutput for ObjectionAnalysis {
    const KIND: AgentKind = AgentKind::ObjectionExpert;

    fn from_result(result: AgentResult) -> Option<Self> {
        match result {
            AgentResult::ObjectionExpert(o) => Some(o),
            _ => None,
        }
    }
}

fn check_score(field: &str, value: f64) -> std::result::Result<(), String> {
    if value.is_finite() && (0.0..=10.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{} must be within [0, 10], got {}", field, value))
    }
}

fn check_entries(field: &str, entries: &[String]) -> std::result::Result<(), String> {
    if entries.iter().any(|e| e.trim().is_empty()) {
        return Err(format!("{} contains a blank entry", field));
    }
    Ok(())
}

fn check_non_empty(field: &str, entries: &[String]) -> std::result::Result<(), String> {
    if entries.is_empty() {
        return Err(format!("{} must not be empty", field));
    }
    Ok(())
}

fn clean_list(entries: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(entries.len());
    for entry in entries {
        let entry = entry.trim();
        if !entry.is_empty() && !cleaned.iter().any(|c| c.eq_ignore_ascii_case(entry)) {
            cleaned.push(entry.to_string());
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_out_of_range_rejected() {
        let result = AgentResult::TranscriptAnalyzer(TranscriptAnalysis {
            score: 11.0,
            ..Default::default()
        });
        let err = result.validate().unwrap_err();
        assert!(matches!(
            err,
            CoachError::AgentFailure { agent: AgentKind::TranscriptAnalyzer, .. }
        ));

        let nan = AgentResult::SalesCoach(CoachingFeedback {
            closing_score: f64::NAN,
            ..Default::default()
        });
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_empty_required_lists_rejected() {
        let coach = AgentResult::SalesCoach(CoachingFeedback {
            what_went_well: vec!["Clear pricing".into()],
            improvements: Vec::new(),
            closing_score: 6.0,
        });
        assert!(coach.validate().is_err());
        assert!(AgentResult::ObjectionExpert(ObjectionAnalysis::default())
            .validate()
            .is_err());
    }

    #[test]
    fn test_overlapping_coach_lists_rejected() {
        let result = AgentResult::SalesCoach(CoachingFeedback {
            what_went_well: vec!["Good rapport".into()],
            improvements: vec!["good rapport".into()],
            closing_score: 5.0,
        });
        assert!(result.validate().is_err());
    }

    #[test]
    fn test_normalized_cleans_lists() {
        let result = AgentResult::ObjectionExpert(ObjectionAnalysis {
            objections_detected: vec![" budget ".into(), "Budget".into(), "".into()],
            next_actions: vec!["Call back".into()],
        })
        .normalized();

        assert_eq!(
            result,
            AgentResult::ObjectionExpert(ObjectionAnalysis {
                objections_detected: vec!["budget".into()],
                next_actions: vec!["Call back".into()],
            })
        );
        assert!(result.validate().is_ok());
    }

    #[test]
    fn test_tagged_serialization() {
        let result = AgentResult::ObjectionExpert(ObjectionAnalysis::default());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["agent"], "objection_expert");
        assert!(json["next_actions"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_typed_extraction() {
        let result = AgentResult::SalesCoach(CoachingFeedback::default());
        assert!(TranscriptAnalysis::from_result(result.clone()).is_none());
        assert_eq!(
            CoachingFeedback::from_result(result).unwrap().closing_score,
            NEUTRAL_SCORE
        );
    }
}
