//! Combines the three agent results into an executive summary.

use crate::agents::{
    AgentKind, CoachingFeedback, ObjectionAnalysis, ObjectionKind, TranscriptAnalysis,
};
use crate::config::ScoringSettings;
use serde::{Deserialize, Serialize};

/// Coach-facing summary of one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    /// Weighted blend of engagement and closing scores, 0-10.
    pub overall_score: f64,
    pub what_went_well: Vec<String>,
    pub improvements: Vec<String>,
    /// One line per objection the customer raised.
    pub missed_opportunities: Vec<String>,
    /// Next actions, highest priority first.
    pub recommended_actions: Vec<String>,
    /// Agents whose contribution is a substituted default.
    #[serde(default)]
    pub degraded_agents: Vec<AgentKind>,
}

/// Pure aggregation over agent results.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    weights: ScoringSettings,
}

impl Aggregator {
    pub fn new(weights: ScoringSettings) -> Self {
        Self { weights }
    }

    /// Build the executive summary.
    ///
    /// A missing result stands for an agent that failed; its neutral default
    /// is used in its place and the agent is listed in `degraded_agents`.
    pub fn aggregate(
        &self,
        analysis: Option<&TranscriptAnalysis>,
        feedback: Option<&CoachingFeedback>,
        objections: Option<&ObjectionAnalysis>,
    ) -> ExecutiveSummary {
        let mut degraded_agents = Vec::new();
        if analysis.is_none() {
            degraded_agents.push(AgentKind::TranscriptAnalyzer);
        }
        if feedback.is_none() {
            degraded_agents.push(AgentKind::SalesCoach);
        }
        if objections.is_none() {
            degraded_agents.push(AgentKind::ObjectionExpert);
        }

        let analysis = analysis.cloned().unwrap_or_default();
        let feedback = feedback.cloned().unwrap_or_default();
        let objections = objections.cloned().unwrap_or_default();

        ExecutiveSummary {
            overall_score: self.overall_score(analysis.score, feedback.closing_score),
            what_went_well: feedback.what_went_well,
            improvements: feedback.improvements,
            missed_opportunities: missed_opportunities(&objections.objections_detected),
            recommended_actions: objections.next_actions,
            degraded_agents,
        }
    }

    /// Weighted mean of the two scores, rounded to one decimal.
    pub fn overall_score(&self, engagement: f64, closing: f64) -> f64 {
        let total = self.weights.analyzer_weight + self.weights.closing_weight;
        let (a, c) = if total > 0.0 {
            (
                self.weights.analyzer_weight / total,
                self.weights.closing_weight / total,
            )
        } else {
            let defaults = ScoringSettings::default();
            (defaults.analyzer_weight, defaults.closing_weight)
        };

        let blended = a * engagement + c * closing;
        ((blended * 10.0).round() / 10.0).clamp(0.0, 10.0)
    }
}

/// Aggregate with the default 0.4 / 0.6 weighting.
pub fn aggregate(
    analysis: Option<&TranscriptAnalysis>,
    feedback: Option<&CoachingFeedback>,
    objections: Option<&ObjectionAnalysis>,
) -> ExecutiveSummary {
    Aggregator::default().aggregate(analysis, feedback, objections)
}

fn missed_opportunities(labels: &[String]) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for label in labels {
        let line = match ObjectionKind::from_label(label) {
            Some(kind) => kind.missed_opportunity().to_string(),
            None => format!("Unresolved {} objection", label.trim()),
        };
        if !lines.contains(&line) {
            lines.push(line);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(score: f64) -> TranscriptAnalysis {
        TranscriptAnalysis {
            topics: vec!["pricing".into()],
            customer_needs: vec!["proof of value".into()],
            score,
        }
    }

    fn feedback(closing_score: f64) -> CoachingFeedback {
        CoachingFeedback {
            what_went_well: vec!["Quantified value".into()],
            improvements: vec!["Ask more questions".into()],
            closing_score,
        }
    }

    fn objections() -> ObjectionAnalysis {
        ObjectionAnalysis {
            objections_detected: vec!["budget".into(), "procurement delays".into()],
            next_actions: vec!["Send ROI calculator".into(), "Follow up".into()],
        }
    }

    #[test]
    fn test_overall_score_weighting() {
        let summary = aggregate(Some(&analysis(8.0)), Some(&feedback(6.0)), Some(&objections()));

        assert_eq!(summary.overall_score, 6.8);
        assert_eq!(summary.what_went_well, vec!["Quantified value"]);
        assert_eq!(summary.improvements, vec!["Ask more questions"]);
        assert_eq!(
            summary.recommended_actions,
            vec!["Send ROI calculator", "Follow up"]
        );
        assert!(summary.degraded_agents.is_empty());
    }

    #[test]
    fn test_missed_opportunities_per_objection() {
        let summary = aggregate(Some(&analysis(5.0)), Some(&feedback(5.0)), Some(&objections()));

        assert_eq!(
            summary.missed_opportunities,
            vec![
                ObjectionKind::Budget.missed_opportunity().to_string(),
                "Unresolved procurement delays objection".to_string(),
            ]
        );
    }

    #[test]
    fn test_aggregation_is_pure() {
        let (a, f, o) = (analysis(7.3), feedback(4.1), objections());
        let first = aggregate(Some(&a), Some(&f), Some(&o));
        let second = aggregate(Some(&a), Some(&f), Some(&o));
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_results_use_neutral_defaults() {
        let summary = aggregate(None, None, None);

        assert_eq!(summary.overall_score, 5.0);
        assert!(summary.what_went_well.is_empty());
        assert!(summary.missed_opportunities.is_empty());
        assert_eq!(summary.degraded_agents, AgentKind::ALL.to_vec());
    }

    #[test]
    fn test_custom_weights_are_normalized() {
        let aggregator = Aggregator::new(ScoringSettings {
            analyzer_weight: 1.0,
            closing_weight: 1.0,
        });
        assert_eq!(aggregator.overall_score(8.0, 4.0), 6.0);
    }
}
