//! Cultural grounding recalled from the model's own knowledge.

use std::sync::Arc;

use async_trait::async_trait;

use super::json::strip_special_tokens;
use crate::infrastructure::ports::{
    ChatMessage, CollaboratorError, GroundingRetriever, LlmPort, LlmRequest,
};

const SYSTEM_PROMPT: &str = "You are an expert cultural anthropologist and mythologist with \
encyclopedic knowledge of world cultures, folklore and history. Provide a concise, factual and \
authentic knowledge block that a storyteller can use to ground their narrative.";

fn user_prompt(theme: &str) -> String {
    format!(
        "Topic: {theme}\n\n\
         Provide 9-10 key authentic cultural elements, including:\n\
         1. Specific terminology (greetings, clothing, weapons, tools)\n\
         2. Key festivals or rituals\n\
         3. Mythological figures or legends\n\
         4. Social hierarchy or values\n\n\
         Format: a concise list or paragraph. Strictly factual and authentic. No preamble."
    )
}

pub struct LlmGroundingRetriever {
    llm: Arc<dyn LlmPort>,
}

impl LlmGroundingRetriever {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl GroundingRetriever for LlmGroundingRetriever {
    async fn get_context(&self, theme: &str) -> Result<String, CollaboratorError> {
        let theme = theme.trim();
        if theme.is_empty() {
            return Ok(String::new());
        }

        tracing::info!(theme, "Recalling cultural context");
        let request = LlmRequest::new(vec![ChatMessage::user(user_prompt(theme))])
            .with_system_prompt(SYSTEM_PROMPT)
            .with_temperature(0.3);

        let response = self.llm.generate(request).await?;
        Ok(strip_special_tokens(&response.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{FinishReason, LlmResponse, MockLlmPort};

    #[tokio::test]
    async fn blank_theme_skips_the_model() {
        let llm = MockLlmPort::new();
        let retriever = LlmGroundingRetriever::new(Arc::new(llm));
        assert_eq!(retriever.get_context("  ").await.unwrap(), "");
    }

    #[tokio::test]
    async fn returns_trimmed_knowledge_block() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .withf(|request| request.messages[0].content.contains("Topic: Feudal Japan"))
            .times(1)
            .returning(|_| {
                Ok(LlmResponse {
                    content: "  1. Bushido\n2. Obon festival  ".to_string(),
                    finish_reason: FinishReason::Stop,
                    usage: None,
                })
            });

        let context = LlmGroundingRetriever::new(Arc::new(llm))
            .get_context("Feudal Japan")
            .await
            .unwrap();

        assert_eq!(context, "1. Bushido\n2. Obon festival");
    }
}
