//! Sources that need no speech-to-text service.

use super::{transcript_from_output, Transcript, TranscriptSource};
use crate::error::{CoachError, Result};
use async_trait::async_trait;

/// Sample call returned by [`DemoSource`] for every upload.
pub const DEMO_TRANSCRIPT: &str = "Customer: Hi, we're interested in your solution but budget is tight this quarter.
Rep: I completely understand. Our solution costs $5K annually with 3x ROI in 6 months for most customers.
Customer: Can you show actual numbers? Rep: Absolutely, I'll send our ROI calculator right now.";

/// Decodes uploaded text transcripts.
pub struct TextSource;

#[async_trait]
impl TranscriptSource for TextSource {
    fn name(&self) -> &'static str {
        "text"
    }

    async fn transcribe(&self, bytes: &[u8], filename: &str) -> Result<Transcript> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            CoachError::Transcription(format!("'{}' is not valid UTF-8 text: {}", filename, e))
        })?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        // Blank uploads are invalid input.
        Transcript::new(text)
    }
}

/// Ignores the upload and returns [`DEMO_TRANSCRIPT`].
pub struct DemoSource;

#[async_trait]
impl TranscriptSource for DemoSource {
    fn name(&self) -> &'static str {
        "demo"
    }

    async fn transcribe(&self, _bytes: &[u8], filename: &str) -> Result<Transcript> {
        tracing::info!("Demo transcription for {}", filename);
        transcript_from_output(DEMO_TRANSCRIPT.to_string(), filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_text_source_strips_bom() {
        let bytes = "\u{feff}Rep: hello".as_bytes();
        let transcript = TextSource.transcribe(bytes, "a.txt").await.unwrap();
        assert_eq!(transcript.as_str(), "Rep: hello");
    }

    #[tokio::test]
    async fn test_text_source_rejects_binary() {
        let err = TextSource.transcribe(&[0xff, 0xfe, 0x00], "a.txt").await.unwrap_err();
        assert!(matches!(err, CoachError::Transcription(_)));
    }

    #[tokio::test]
    async fn test_blank_text_is_invalid_input() {
        let err = TextSource.transcribe(b" \n\t", "a.txt").await.unwrap_err();
        assert!(matches!(err, CoachError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_demo_transcript_is_tagged() {
        let transcript = DemoSource.transcribe(&[], "call.wav").await.unwrap();
        assert!(transcript.is_speaker_tagged());
        assert_eq!(transcript.customer_utterances().len(), 2);
    }
}
