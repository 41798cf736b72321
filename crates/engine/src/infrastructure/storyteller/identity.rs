//! Protagonist identity from a theme.

use std::sync::Arc;

use async_trait::async_trait;

use super::json::parse_json_reply;
use crate::infrastructure::ports::{
    ChatMessage, CollaboratorError, Identity, IdentityGenerator, LlmPort, LlmRequest,
};

const COLLABORATOR: &str = "identity";

fn prompt(theme: &str) -> String {
    format!(
        "Analyze the theme '{theme}'.\n\
         Generate a culturally authentic protagonist name and a formal culture label.\n\
         Example: 'samurai' -> name 'Kenji', culture_label 'Japanese History - Samurai Era'\n\
         Reply with a JSON object only: {{\"name\": \"...\", \"culture_label\": \"...\"}}"
    )
}

pub struct LlmIdentityGenerator {
    llm: Arc<dyn LlmPort>,
}

impl LlmIdentityGenerator {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl IdentityGenerator for LlmIdentityGenerator {
    async fn generate_identity(&self, theme: &str) -> Result<Identity, CollaboratorError> {
        let request = LlmRequest::new(vec![ChatMessage::user(prompt(theme))])
            .with_temperature(0.9)
            .with_json_output();

        let response = self.llm.generate(request).await?;
        let identity: Identity = parse_json_reply(COLLABORATOR, &response.content)?;

        let name = identity.name.trim();
        let culture_label = identity.culture_label.trim();
        if name.is_empty() || culture_label.is_empty() {
            return Err(CollaboratorError::malformed(
                COLLABORATOR,
                "name and culture_label must be non-empty",
            ));
        }

        Ok(Identity {
            name: name.to_string(),
            culture_label: culture_label.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{FinishReason, LlmResponse, MockLlmPort};

    fn llm_replying(content: &'static str) -> Arc<dyn LlmPort> {
        let mut llm = MockLlmPort::new();
        llm.expect_generate().returning(move |_| {
            Ok(LlmResponse {
                content: content.to_string(),
                finish_reason: FinishReason::Stop,
                usage: None,
            })
        });
        Arc::new(llm)
    }

    #[tokio::test]
    async fn parses_identity() {
        let generator = LlmIdentityGenerator::new(llm_replying(
            r#"{"name": " Kenji ", "culture_label": "Japanese History - Samurai Era"}"#,
        ));
        let identity = generator.generate_identity("samurai").await.unwrap();
        assert_eq!(identity.name, "Kenji");
        assert_eq!(identity.culture_label, "Japanese History - Samurai Era");
    }

    #[tokio::test]
    async fn blank_name_is_malformed() {
        let generator =
            LlmIdentityGenerator::new(llm_replying(r#"{"name": "", "culture_label": "X"}"#));
        assert!(generator.generate_identity("samurai").await.is_err());
    }
}
