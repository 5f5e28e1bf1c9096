//! Transcript data model.

use crate::error::{CoachError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Candidate speaker tag: a capitalized word or two followed by a colon, at the
/// start of a line or after sentence-ending punctuation.
static SPEAKER_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:^[ \t]*|[.!?][ \t]+)([A-Z][A-Za-z]*(?:[ \t][A-Z][A-Za-z]*)?)[ \t]*:")
        .expect("Invalid regex")
});

/// Who said an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Customer,
    Rep,
    /// Text outside any speaker tag.
    Unknown,
}

impl Speaker {
    /// Speaker for a recognized role name, `None` for any other word.
    fn from_tag(tag: &str) -> Option<Self> {
        let role: String = tag.split_whitespace().collect::<String>().to_lowercase();
        match role.as_str() {
            "customer" | "prospect" | "client" | "buyer" => Some(Speaker::Customer),
            "rep" | "salesrep" | "sales" | "salesperson" | "seller" | "agent" => Some(Speaker::Rep),
            _ => None,
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Speaker::Customer => write!(f, "Customer"),
            Speaker::Rep => write!(f, "Rep"),
            Speaker::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One speaker turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker: Speaker,
    pub text: String,
}

impl Utterance {
    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Whether the utterance contains a question.
    pub fn is_question(&self) -> bool {
        self.text.contains('?')
    }
}

/// Text record of a sales call.
///
/// Always holds non-blank text. Speaker tags are a convention: the raw text is
/// kept verbatim and the utterance view is derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Transcript {
    text: String,
    utterances: Vec<Utterance>,
}

impl Transcript {
    /// Create a transcript, rejecting empty or whitespace-only text.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CoachError::InvalidInput(
                "transcript is empty".to_string(),
            ));
        }
        let utterances = split_utterances(&text);
        Ok(Self { text, utterances })
    }

    /// The raw transcript text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn utterances(&self) -> &[Utterance] {
        &self.utterances
    }

    /// Whether at least one speaker tag was recognized.
    pub fn is_speaker_tagged(&self) -> bool {
        self.utterances.iter().any(|u| u.speaker != Speaker::Unknown)
    }

    /// Utterances attributed to the customer.
    ///
    /// Untagged transcripts have no attribution, so every utterance counts.
    pub fn customer_utterances(&self) -> Vec<&Utterance> {
        self.utterances_by(Speaker::Customer)
    }

    /// Utterances attributed to the rep (everything, for untagged transcripts).
    pub fn rep_utterances(&self) -> Vec<&Utterance> {
        self.utterances_by(Speaker::Rep)
    }

    fn utterances_by(&self, speaker: Speaker) -> Vec<&Utterance> {
        if !self.is_speaker_tagged() {
            return self.utterances.iter().collect();
        }
        self.utterances
            .iter()
            .filter(|u| u.speaker == speaker)
            .collect()
    }
}

impl TryFrom<String> for Transcript {
    type Error = CoachError;

    fn try_from(text: String) -> Result<Self> {
        Self::new(text)
    }
}

impl From<Transcript> for String {
    fn from(transcript: Transcript) -> Self {
        transcript.text
    }
}

impl std::fmt::Display for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Split text into utterances at every speaker tag.
fn split_utterances(text: &str) -> Vec<Utterance> {
    let mut utterances = Vec::new();
    let mut current = Speaker::Unknown;
    let mut cursor = 0;

    for caps in SPEAKER_TAG.captures_iter(text) {
        let (Some(tag), Some(role)) = (caps.get(0), caps.get(1)) else { continue };
        let Some(speaker) = Speaker::from_tag(role.as_str()) else { continue };
        // Punctuation before the role name stays with the previous turn.
        push_utterance(&mut utterances, current, &text[cursor..role.start()]);
        current = speaker;
        cursor = tag.end();
    }
    push_utterance(&mut utterances, current, &text[cursor..]);

    utterances
}

fn push_utterance(utterances: &mut Vec<Utterance>, speaker: Speaker, text: &str) {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if !text.is_empty() {
        utterances.push(Utterance { speaker, text });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_transcript_rejected() {
        assert!(matches!(Transcript::new(""), Err(CoachError::InvalidInput(_))));
        assert!(matches!(Transcript::new("  \n\t "), Err(CoachError::InvalidInput(_))));
    }

    #[test]
    fn test_mid_line_tags_split() {
        let transcript = Transcript::new(
            "Customer: Can you show actual numbers? Rep: Absolutely, I'll send it.",
        )
        .unwrap();

        let utterances = transcript.utterances();
        assert_eq!(utterances.len(), 2);
        assert_eq!(utterances[0].speaker, Speaker::Customer);
        assert_eq!(utterances[0].text, "Can you show actual numbers?");
        assert!(utterances[0].is_question());
        assert_eq!(utterances[1].speaker, Speaker::Rep);
        assert_eq!(utterances[1].text, "Absolutely, I'll send it.");
    }

    #[test]
    fn test_aliases_and_preamble() {
        let transcript = Transcript::new(
            "Call recorded Monday.\nProspect: hello\nSales Rep: hi there\nBuyer: ok",
        )
        .unwrap();

        let speakers: Vec<Speaker> = transcript.utterances().iter().map(|u| u.speaker).collect();
        assert_eq!(
            speakers,
            vec![Speaker::Unknown, Speaker::Customer, Speaker::Rep, Speaker::Customer]
        );
        assert_eq!(transcript.customer_utterances().len(), 2);
        assert_eq!(transcript.rep_utterances().len(), 1);
    }

    #[test]
    fn test_role_words_inside_speech_are_not_tags() {
        let transcript = Transcript::new(
            "Customer: I already spoke to your support agent: honestly the budget is tight.\n\
             Rep: Understood. Our newest client: Acme, saw results fast.",
        )
        .unwrap();

        let utterances = transcript.utterances();
        assert_eq!(utterances.len(), 2);
        assert_eq!(utterances[0].speaker, Speaker::Customer);
        assert_eq!(
            utterances[0].text,
            "I already spoke to your support agent: honestly the budget is tight."
        );
        assert_eq!(utterances[1].speaker, Speaker::Rep);
        assert_eq!(
            utterances[1].text,
            "Understood. Our newest client: Acme, saw results fast."
        );
    }

    #[test]
    fn test_unknown_capitalized_labels_are_not_tags() {
        let transcript =
            Transcript::new("Rep: Quick agenda. Pricing: we'll cover it last. Customer: Fine.").unwrap();

        let utterances = transcript.utterances();
        assert_eq!(utterances.len(), 2);
        assert_eq!(utterances[0].text, "Quick agenda. Pricing: we'll cover it last.");
        assert_eq!(utterances[1].speaker, Speaker::Customer);
    }

    #[test]
    fn test_untagged_transcript_attributes_everything() {
        let transcript = Transcript::new("we talked about the weather").unwrap();
        assert!(!transcript.is_speaker_tagged());
        assert_eq!(transcript.customer_utterances().len(), 1);
        assert_eq!(transcript.rep_utterances().len(), 1);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let transcript = Transcript::new("Rep: hello").unwrap();
        let json = serde_json::to_string(&transcript).unwrap();
        assert_eq!(json, "\"Rep: hello\"");

        let back: Transcript = serde_json::from_str(&json).unwrap();
        assert_eq!(back, transcript);
        assert!(serde_json::from_str::<Transcript>("\"   \"").is_err());
    }
}
