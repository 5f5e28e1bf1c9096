//! Keyword tables and text matching shared by the rule-based agents.

use crate::transcription::Utterance;

/// Discussion topics, in reporting order.
pub(crate) const TOPICS: &[(&str, &[&str])] = &[
    (
        "pricing",
        &[
            "price", "pricing", "cost", "costs", "quote", "discount", "$", "fee", "fees",
            "annually", "per month", "per year", "subscription",
        ],
    ),
    ("budget", &["budget", "budgets", "afford", "tight", "spend", "expensive"]),
    ("ROI", &["roi", "return on investment", "payback", "savings"]),
    (
        "timeline",
        &["timeline", "quarter", "deadline", "this month", "next month", "next year", "by when"],
    ),
    (
        "implementation",
        &["implementation", "implement", "onboarding", "rollout", "deploy", "setup", "set up"],
    ),
    (
        "integration",
        &["integration", "integrate", "api", "crm", "salesforce", "hubspot"],
    ),
    ("security", &["security", "secure", "compliance", "gdpr", "soc 2", "privacy"]),
    ("support", &["support", "training", "customer success", "help desk"]),
    (
        "competition",
        &["competitor", "competitors", "another vendor", "other vendor", "currently using"],
    ),
    ("contract", &["contract", "agreement", "terms", "renewal", "legal"]),
    (
        "features",
        &["feature", "features", "functionality", "capability", "capabilities"],
    ),
];

/// Customer needs, keyed by the phrases that reveal them.
pub(crate) const NEEDS: &[(&str, &[&str])] = &[
    (
        "cost-effective solution",
        &["budget", "tight", "afford", "expensive", "cheaper", "cost", "price", "save money"],
    ),
    (
        "proof of value",
        &["show", "numbers", "proof", "prove", "roi", "case study", "evidence", "results"],
    ),
    (
        "fast implementation",
        &["quickly", "asap", "soon", "fast", "right away", "deadline", "urgent"],
    ),
    (
        "integration with existing tools",
        &["integrate", "integration", "crm", "existing tools", "api", "works with"],
    ),
    (
        "security and compliance",
        &["security", "compliance", "gdpr", "privacy", "soc 2"],
    ),
    ("reliable support", &["support", "training", "onboarding"]),
    ("room to scale", &["scale", "grow", "growth", "more users", "team size"]),
];

/// Words ignored when extracting key terms from free text.
const STOPWORDS: &[&str] = &[
    "about", "after", "again", "always", "their", "there", "these", "those", "which", "while",
    "would", "could", "should", "where", "other", "every", "never", "being", "before", "because",
    "into", "with", "from", "your", "they", "them", "then", "than", "what", "when", "will",
];

/// Lowercased text with punctuation flattened to single spaces, padded so
/// whole-word lookups are a substring test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Normalized(String);

impl Normalized {
    pub fn new(text: &str) -> Self {
        Self(format!(" {} ", normalize(text)))
    }

    pub fn from_utterances(utterances: &[&Utterance]) -> Self {
        let joined = utterances
            .iter()
            .map(|u| u.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self::new(&joined)
    }

    /// Whether `term` occurs as a whole word or phrase.
    pub fn mentions(&self, term: &str) -> bool {
        let term = normalize(term);
        !term.is_empty() && self.0.contains(&format!(" {} ", term))
    }

    pub fn mentions_any(&self, terms: &[&str]) -> bool {
        terms.iter().any(|t| self.mentions(t))
    }

    /// Distinct content words of five or more letters, sorted.
    pub fn key_terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = self
            .0
            .split_whitespace()
            .filter(|w| w.len() >= 5 && w.chars().all(|c| c.is_alphabetic()))
            .filter(|w| !STOPWORDS.contains(w))
            .map(str::to_string)
            .collect();
        terms.sort();
        terms.dedup();
        terms
    }
}

fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if c == '$' || c == '%' {
            out.push(' ');
            out.push(c);
            out.push(' ');
        } else {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Labels of every table entry whose terms are mentioned, in table order.
pub(crate) fn matching_labels(text: &Normalized, table: &[(&str, &[&str])]) -> Vec<String> {
    table
        .iter()
        .filter(|(_, terms)| text.mentions_any(terms))
        .map(|(label, _)| label.to_string())
        .collect()
}

/// Round to one decimal and clamp into the 0-10 score range.
pub(crate) fn score(value: f64) -> f64 {
    ((value * 10.0).round() / 10.0).clamp(0.0, 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_word_matching() {
        let text = Normalized::new("We're happy. The ROI is 3x; costs $5K/year!");
        assert!(text.mentions("roi"));
        assert!(text.mentions("ROI"));
        assert!(text.mentions("$"));
        assert!(text.mentions("we re happy"));
        assert!(!text.mentions("cost"));
        assert!(text.mentions("costs"));
        assert!(!text.mentions(""));
    }

    #[test]
    fn test_matching_labels_in_table_order() {
        let text = Normalized::new("The budget is tight and pricing matters");
        assert_eq!(matching_labels(&text, TOPICS), vec!["pricing", "budget"]);
    }

    #[test]
    fn test_key_terms() {
        let text = Normalized::new("Always anchor pricing to ROI. Anchor pricing early, 2024.");
        assert_eq!(text.key_terms(), vec!["anchor", "early", "pricing"]);
    }

    #[test]
    fn test_score_rounding_and_clamp() {
        assert_eq!(score(7.44), 7.4);
        assert_eq!(score(12.0), 10.0);
        assert_eq!(score(-1.0), 0.0);
    }
}
