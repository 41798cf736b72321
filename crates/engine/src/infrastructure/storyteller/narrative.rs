//! Narrative generation over the chat model.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use storyteller_domain::value_objects::NEUTRAL;
use storyteller_domain::TranscriptMessage;

use super::json::parse_json_reply;
use crate::infrastructure::ports::{
    ChatMessage, CollaboratorError, LlmPort, LlmRequest, NarrativeGenerator, StoryBeat,
};

const COLLABORATOR: &str = "narrative";

/// Shape the model is asked to reply in; optional fields default.
#[derive(Debug, Deserialize)]
struct BeatReply {
    story_text: String,
    #[serde(default)]
    emotion: Option<String>,
    #[serde(default)]
    visual_keywords: Option<String>,
}

pub struct LlmNarrativeGenerator {
    llm: Arc<dyn LlmPort>,
    temperature: f32,
}

impl LlmNarrativeGenerator {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self {
            llm,
            temperature: 0.8,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }
}

#[async_trait]
impl NarrativeGenerator for LlmNarrativeGenerator {
    async fn generate(
        &self,
        transcript: Vec<TranscriptMessage>,
        instruction: String,
    ) -> Result<StoryBeat, CollaboratorError> {
        let mut messages: Vec<ChatMessage> = transcript.iter().map(ChatMessage::from).collect();
        messages.push(ChatMessage::user(instruction));

        let request = LlmRequest::new(messages)
            .with_temperature(self.temperature)
            .with_json_output();

        let response = self.llm.generate(request).await?;
        let reply: BeatReply = parse_json_reply(COLLABORATOR, &response.content)?;

        if reply.story_text.trim().is_empty() {
            return Err(CollaboratorError::malformed(COLLABORATOR, "empty story_text"));
        }

        Ok(StoryBeat {
            story_text: reply.story_text.trim().to_string(),
            emotion: reply
                .emotion
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| NEUTRAL.to_string()),
            visual_keywords: reply.visual_keywords.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{FinishReason, LlmError, LlmResponse, MessageRole, MockLlmPort};

    fn reply(content: &'static str) -> Result<LlmResponse, LlmError> {
        Ok(LlmResponse {
            content: content.to_string(),
            finish_reason: FinishReason::Stop,
            usage: None,
        })
    }

    #[tokio::test]
    async fn sends_transcript_then_instruction() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .withf(|request| {
                request.json_output
                    && request.messages.len() == 2
                    && request.messages[0].role == MessageRole::System
                    && request.messages[1].content == "Start a story about tea."
            })
            .returning(|_| {
                reply(r#"{"story_text": "Steam rose.", "emotion": "Peace", "visual_keywords": "soft light"}"#)
            });

        let generator = LlmNarrativeGenerator::new(Arc::new(llm));
        let beat = generator
            .generate(
                vec![TranscriptMessage::system("You are a storyteller")],
                "Start a story about tea.".to_string(),
            )
            .await
            .unwrap();

        assert_eq!(beat.story_text, "Steam rose.");
        assert_eq!(beat.emotion_label().as_str(), "peace");
        assert_eq!(beat.visual_keywords, "soft light");
    }

    #[tokio::test]
    async fn missing_emotion_defaults_to_neutral() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .returning(|_| reply("```json\n{\"story_text\": \"The gate creaked.\"}\n```"));

        let beat = LlmNarrativeGenerator::new(Arc::new(llm))
            .generate(vec![], "go".to_string())
            .await
            .unwrap();

        assert_eq!(beat.emotion, "neutral");
        assert!(beat.visual_keywords.is_empty());
    }

    #[tokio::test]
    async fn prose_reply_is_malformed() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .returning(|_| reply("Once upon a time, without any JSON."));

        let result = LlmNarrativeGenerator::new(Arc::new(llm))
            .generate(vec![], "go".to_string())
            .await;

        assert!(matches!(result, Err(CollaboratorError::Malformed { .. })));
    }

    #[tokio::test]
    async fn transport_errors_pass_through() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .returning(|_| Err(LlmError::RequestFailed("connection refused".into())));

        let result = LlmNarrativeGenerator::new(Arc::new(llm))
            .generate(vec![], "go".to_string())
            .await;

        assert!(matches!(result, Err(CollaboratorError::Llm(_))));
    }
}
