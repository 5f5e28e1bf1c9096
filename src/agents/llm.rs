//! Chat-model backend for the analysis agents.

use super::{
    Agent, AgentKind, AgentResult, CoachingFeedback, ObjectionAnalysis, TranscriptAnalysis,
};
use crate::config::{AgentPrompt, Prompts};
use crate::error::{CoachError, Result};
use crate::knowledge::KnowledgeContext;
use crate::transcription::Transcript;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Stand-in for an empty knowledge context in prompts.
const NO_KNOWLEDGE: &str = "(none provided)";

/// Runs one agent contract against a chat model.
///
/// Requests use temperature 0 and a fixed seed so repeated runs on the same
/// input stay as close to deterministic as the provider allows.
pub struct LlmAgent {
    kind: AgentKind,
    client: Client<OpenAIConfig>,
    model: String,
    seed: i64,
    prompts: Prompts,
}

impl LlmAgent {
    pub fn new(
        kind: AgentKind,
        client: Client<OpenAIConfig>,
        model: &str,
        seed: i64,
        prompts: Prompts,
    ) -> Self {
        Self {
            kind,
            client,
            model: model.to_string(),
            seed,
            prompts,
        }
    }

    fn prompt(&self) -> &AgentPrompt {
        match self.kind {
            AgentKind::TranscriptAnalyzer => &self.prompts.analyzer,
            AgentKind::SalesCoach => &self.prompts.coach,
            AgentKind::ObjectionExpert => &self.prompts.objection,
        }
    }

    fn failure(&self, reason: impl Into<String>) -> CoachError {
        CoachError::AgentFailure {
            agent: self.kind,
            reason: reason.into(),
        }
    }

    async fn complete(&self, user_prompt: String) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.render_with_custom(&self.prompt().system, &HashMap::new()))
                .build()
                .map_err(|e| self.failure(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| self.failure(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.0)
            .seed(self.seed)
            .response_format(ResponseFormat::JsonObject)
            .build()
            .map_err(|e| self.failure(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| self.failure(format!("API error: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| self.failure("empty response"))
    }
}

#[async_trait]
impl Agent for LlmAgent {
    fn kind(&self) -> AgentKind {
        self.kind
    }

    #[instrument(skip_all, fields(agent = %self.kind))]
    async fn run(&self, transcript: &Transcript, knowledge: &KnowledgeContext) -> Result<AgentResult> {
        let knowledge_text = if knowledge.is_empty() {
            NO_KNOWLEDGE
        } else {
            knowledge.as_str()
        };

        let mut vars = HashMap::new();
        vars.insert("transcript".to_string(), transcript.as_str().to_string());
        vars.insert("knowledge".to_string(), knowledge_text.to_string());
        let user_prompt = self.prompts.render_with_custom(&self.prompt().user, &vars);

        debug!("Requesting {} from {}", self.kind, self.model);
        let content = self.complete(user_prompt).await?;
        parse_response(self.kind, &content)
    }
}

/// Parse a model reply into the result variant for `kind`.
pub(crate) fn parse_response(kind: AgentKind, content: &str) -> Result<AgentResult> {
    let invalid = |e: serde_json::Error| CoachError::AgentFailure {
        agent: kind,
        reason: format!("invalid JSON: {}", e),
    };

    let result = match kind {
        AgentKind::TranscriptAnalyzer => {
            AgentResult::TranscriptAnalyzer(serde_json::from_str::<TranscriptAnalysis>(content).map_err(invalid)?)
        }
        AgentKind::SalesCoach => {
            AgentResult::SalesCoach(serde_json::from_str::<CoachingFeedback>(content).map_err(invalid)?)
        }
        AgentKind::ObjectionExpert => {
            AgentResult::ObjectionExpert(serde_json::from_str::<ObjectionAnalysis>(content).map_err(invalid)?)
        }
    };

    Ok(result.normalized())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyzer_reply() {
        let content = r#"{"topics": ["pricing", " ROI "], "customer_needs": ["proof of value"], "score": 7.5, "notes": "ignored"}"#;
        let result = parse_response(AgentKind::TranscriptAnalyzer, content).unwrap();

        assert_eq!(
            result,
            AgentResult::TranscriptAnalyzer(TranscriptAnalysis {
                topics: vec!["pricing".into(), "ROI".into()],
                customer_needs: vec!["proof of value".into()],
                score: 7.5,
            })
        );
    }

    #[test]
    fn test_parse_missing_field_is_agent_failure() {
        let err = parse_response(AgentKind::SalesCoach, r#"{"what_went_well": []}"#).unwrap_err();
        assert!(matches!(
            err,
            CoachError::AgentFailure { agent: AgentKind::SalesCoach, .. }
        ));
    }

    #[test]
    fn test_parse_objection_reply() {
        let content = r#"{"objections_detected": ["budget"], "next_actions": ["Send ROI calculator", "Send ROI calculator"]}"#;
        let result = parse_response(AgentKind::ObjectionExpert, content).unwrap();

        assert_eq!(result.kind(), AgentKind::ObjectionExpert);
        assert!(result.validate().is_ok());
        match result {
            AgentResult::ObjectionExpert(o) => assert_eq!(o.next_actions.len(), 1),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
