//! OpenAI Whisper transcription source.

use super::{transcript_from_output, SpeakerLabeler, Transcript, TranscriptSource};
use crate::config::{Prompts, TranscriptionSettings};
use crate::error::{CoachError, Result};
use crate::openai::create_client_with_timeout;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Whisper-based transcript source.
pub struct WhisperSource {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    language: Option<String>,
    labeler: Option<SpeakerLabeler>,
}

impl WhisperSource {
    /// Create a Whisper source from transcription settings.
    pub fn from_settings(settings: &TranscriptionSettings, prompts: &Prompts) -> Result<Self> {
        let timeout = Duration::from_secs(settings.timeout_seconds);
        let client = create_client_with_timeout(timeout)?;

        let labeler = if settings.label_speakers {
            Some(SpeakerLabeler::new(
                client.clone(),
                &settings.label_model,
                &prompts.labeling.system,
            ))
        } else {
            None
        };

        Ok(Self {
            client,
            model: settings.model.clone(),
            language: Some(settings.language.clone()).filter(|l| !l.is_empty()),
            labeler,
        })
    }

    /// Send the audio to the transcription API and return the raw text.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    async fn transcribe_raw(&self, bytes: &[u8], filename: &str) -> Result<String> {
        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(AudioInput::from_vec_u8(filename.to_string(), bytes.to_vec()))
            .model(&self.model)
            .response_format(AudioResponseFormat::Json);

        if let Some(lang) = &self.language {
            request_builder.language(lang);
        }

        let request = request_builder
            .build()
            .map_err(|e| CoachError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| CoachError::Transcription(format!("Whisper API error: {}", e)))?;

        debug!("Whisper returned {} chars", response.text.len());
        Ok(response.text.trim().to_string())
    }
}

#[async_trait]
impl TranscriptSource for WhisperSource {
    fn name(&self) -> &'static str {
        "whisper"
    }

    async fn transcribe(&self, bytes: &[u8], filename: &str) -> Result<Transcript> {
        if bytes.is_empty() {
            return Err(CoachError::Transcription(format!(
                "'{}' is empty",
                filename
            )));
        }

        info!("Transcribing {} ({} bytes) with {}", filename, bytes.len(), self.model);
        let raw = self.transcribe_raw(bytes, filename).await?;
        let transcript = transcript_from_output(raw, filename)?;

        let Some(labeler) = &self.labeler else {
            return Ok(transcript);
        };
        if transcript.is_speaker_tagged() {
            return Ok(transcript);
        }

        match labeler.label(transcript.as_str()).await {
            Ok(labeled) if !labeled.trim().is_empty() => transcript_from_output(labeled, filename),
            Ok(_) => {
                warn!("Speaker labeling returned nothing, using untagged transcript");
                Ok(transcript)
            }
            Err(e) => {
                warn!("Speaker labeling failed, using untagged transcript: {}", e);
                Ok(transcript)
            }
        }
    }
}
