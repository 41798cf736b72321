//! Virtual cinematographer: story excerpt plus emotion to visual keywords.

use std::sync::Arc;

use async_trait::async_trait;

use super::json::strip_special_tokens;
use crate::infrastructure::ports::{
    ChatMessage, CollaboratorError, LlmPort, LlmRequest, PromptStylist,
};

const COLLABORATOR: &str = "cinematography";

const SYSTEM_PROMPT: &str = "You are an expert virtual cinematographer and art director. \
Translate a story segment and an emotion into a precise visual description for AI image \
generation. Focus only on camera angle, lighting, color palette, depth of field and \
composition. Do not describe the story action itself, only visual style keywords. Keep it \
comma-separated and under 40 words.";

pub struct LlmPromptStylist {
    llm: Arc<dyn LlmPort>,
}

impl LlmPromptStylist {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl PromptStylist for LlmPromptStylist {
    async fn enhance(&self, excerpt: &str, emotion: &str) -> Result<String, CollaboratorError> {
        let request = LlmRequest::new(vec![ChatMessage::user(format!(
            "Story: {excerpt}\nEmotion: {emotion}\n\nVisual Keywords:"
        ))])
        .with_system_prompt(SYSTEM_PROMPT)
        .with_temperature(0.7)
        .with_max_tokens(Some(120));

        let response = self.llm.generate(request).await?;
        let keywords = strip_special_tokens(&response.content)
            .trim_start_matches("Visual Keywords:")
            .trim()
            .to_string();

        if keywords.is_empty() {
            return Err(CollaboratorError::malformed(COLLABORATOR, "no keywords"));
        }
        Ok(keywords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{FinishReason, LlmResponse, MockLlmPort};

    #[tokio::test]
    async fn returns_keywords_without_label() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .withf(|request| request.messages[0].content.contains("Emotion: fear"))
            .returning(|_| {
                Ok(LlmResponse {
                    content: "Visual Keywords: low angle, cold blue rim light".to_string(),
                    finish_reason: FinishReason::Stop,
                    usage: None,
                })
            });

        let keywords = LlmPromptStylist::new(Arc::new(llm))
            .enhance("The shrine was silent.", "fear")
            .await
            .unwrap();

        assert_eq!(keywords, "low angle, cold blue rim light");
    }
}
