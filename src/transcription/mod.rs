//! Transcription boundary for callcoach.
//!
//! Turns uploaded bytes into a [`Transcript`]. Speech-to-text itself is done by a
//! remote service; this module only adapts its output.
//!
//! # Sources
//!
//! - **Whisper**: OpenAI audio transcription, optionally followed by an LLM pass
//!   that tags each turn with `Customer:` / `Rep:`.
//! - **Text**: uploaded `.txt` / `.md` transcripts, decoded as UTF-8.
//! - **Demo**: a fixed sample call, for running without an API key.

mod labeling;
mod models;
mod text;
mod whisper;

pub use labeling::SpeakerLabeler;
pub use models::{Speaker, Transcript, Utterance};
pub use text::{DemoSource, TextSource, DEMO_TRANSCRIPT};
pub use whisper::WhisperSource;

use crate::config::{Prompts, Settings, TranscriptionProvider};
use crate::error::{CoachError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Supported audio file extensions.
const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "flac", "aac", "ogg", "opus", "m4a", "wma", "aiff", "webm", "mp4", "mpeg", "mpga",
];

/// Extensions treated as ready-made text transcripts.
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "text"];

/// Trait for services that turn an uploaded recording into a transcript.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Transcribe raw bytes. `filename` is a hint for the container format.
    async fn transcribe(&self, bytes: &[u8], filename: &str) -> Result<Transcript>;
}

/// Kind of upload, judged by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Audio,
    Text,
    /// Unrecognized extension; handed to the audio provider.
    Unknown,
}

impl UploadKind {
    pub fn from_filename(filename: &str) -> Self {
        let ext = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        match ext.as_deref() {
            Some(ext) if TEXT_EXTENSIONS.contains(&ext) => UploadKind::Text,
            Some(ext) if AUDIO_EXTENSIONS.contains(&ext) => UploadKind::Audio,
            _ => UploadKind::Unknown,
        }
    }
}

/// Routes uploads to the text source or the configured audio provider.
pub struct SourceRouter {
    text: TextSource,
    audio: Arc<dyn TranscriptSource>,
}

impl SourceRouter {
    /// Create a router with a custom audio provider.
    pub fn new(audio: Arc<dyn TranscriptSource>) -> Self {
        Self {
            text: TextSource,
            audio,
        }
    }

    /// Build the router described by the settings.
    pub fn from_settings(settings: &Settings, prompts: &Prompts) -> Result<Self> {
        let audio: Arc<dyn TranscriptSource> = match settings.transcription.provider {
            TranscriptionProvider::Whisper => {
                Arc::new(WhisperSource::from_settings(&settings.transcription, prompts)?)
            }
            TranscriptionProvider::Demo => Arc::new(DemoSource),
        };
        Ok(Self::new(audio))
    }

    /// Name of the audio provider.
    pub fn audio_provider(&self) -> &'static str {
        self.audio.name()
    }
}

#[async_trait]
impl TranscriptSource for SourceRouter {
    fn name(&self) -> &'static str {
        "router"
    }

    async fn transcribe(&self, bytes: &[u8], filename: &str) -> Result<Transcript> {
        let kind = UploadKind::from_filename(filename);
        debug!("Routing {} as {:?}", filename, kind);
        match kind {
            UploadKind::Text => self.text.transcribe(bytes, filename).await,
            UploadKind::Audio | UploadKind::Unknown => self.audio.transcribe(bytes, filename).await,
        }
    }
}

/// Build a transcript from a source's output, reporting blank output as a
/// transcription failure rather than bad caller input.
pub(crate) fn transcript_from_output(text: String, filename: &str) -> Result<Transcript> {
    Transcript::new(text).map_err(|_| {
        CoachError::Transcription(format!("no speech recognized in '{}'", filename))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_kind() {
        assert_eq!(UploadKind::from_filename("call.WAV"), UploadKind::Audio);
        assert_eq!(UploadKind::from_filename("/tmp/call.m4a"), UploadKind::Audio);
        assert_eq!(UploadKind::from_filename("notes.txt"), UploadKind::Text);
        assert_eq!(UploadKind::from_filename("recording"), UploadKind::Unknown);
    }

    #[tokio::test]
    async fn test_router_sends_text_to_text_source() {
        let router = SourceRouter::new(Arc::new(DemoSource));

        let transcript = router
            .transcribe(b"Customer: hello\nRep: hi", "call.txt")
            .await
            .unwrap();
        assert_eq!(transcript.as_str(), "Customer: hello\nRep: hi");

        let demo = router.transcribe(b"RIFF....", "call.wav").await.unwrap();
        assert_eq!(demo.as_str(), DEMO_TRANSCRIPT);
        assert_eq!(router.audio_provider(), "demo");
    }

    #[test]
    fn test_blank_output_is_transcription_error() {
        let err = transcript_from_output("  ".to_string(), "call.wav").unwrap_err();
        assert!(matches!(err, CoachError::Transcription(_)));
    }
}
