//! LLM pass that tags a raw transcript with speakers.

use crate::error::{CoachError, Result};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
};
use serde::Deserialize;
use tracing::debug;

/// Rewrites raw speech-to-text output as `Customer:` / `Rep:` dialogue.
pub struct SpeakerLabeler {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    system_prompt: String,
}

#[derive(Deserialize)]
struct LabeledLines {
    lines: Vec<String>,
}

impl SpeakerLabeler {
    pub fn new(
        client: async_openai::Client<async_openai::config::OpenAIConfig>,
        model: &str,
        system_prompt: &str,
    ) -> Self {
        Self {
            client,
            model: model.to_string(),
            system_prompt: system_prompt.to_string(),
        }
    }

    /// Label a raw transcript. Returns one turn per line.
    pub async fn label(&self, raw: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt.clone())
                .build()
                .map_err(|e| CoachError::Transcription(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(raw.to_string())
                .build()
                .map_err(|e| CoachError::Transcription(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.0)
            .response_format(ResponseFormat::JsonObject)
            .build()
            .map_err(|e| CoachError::Transcription(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| CoachError::OpenAI(format!("Speaker labeling error: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| CoachError::Transcription("Empty labeling response".to_string()))?;

        parse_labeled(content)
    }
}

fn parse_labeled(content: &str) -> Result<String> {
    let parsed: LabeledLines = serde_json::from_str(content)
        .map_err(|e| CoachError::Transcription(format!("Invalid labeling JSON: {}", e)))?;

    let lines: Vec<&str> = parsed
        .lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    if lines.is_empty() {
        return Err(CoachError::Transcription("Labeling returned no lines".to_string()));
    }

    debug!("Labeled {} turns", lines.len());
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labeled_lines() {
        let content = r#"{"lines": ["Customer: hello", "  ", "Rep: hi there "]}"#;
        assert_eq!(parse_labeled(content).unwrap(), "Customer: hello\nRep: hi there");
    }

    #[test]
    fn test_parse_labeled_rejects_empty() {
        assert!(parse_labeled(r#"{"lines": []}"#).is_err());
        assert!(parse_labeled("not json").is_err());
    }
}
