//! Chat-completions client for OpenAI-compatible servers (Ollama, vLLM, LM Studio).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::infrastructure::ports::{
    FinishReason, LlmError, LlmPort, LlmRequest, LlmResponse, MessageRole, TokenUsage,
};

/// Default server base URL (a local Ollama).
pub const DEFAULT_LLM_BASE_URL: &str = "http://localhost:11434";

/// Default model name.
pub const DEFAULT_LLM_MODEL: &str = "llama3.2";

/// Default per-request timeout. Long story segments can be slow.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

#[derive(Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    base_url: String,
    model: String,
}

impl ChatCompletionsClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

impl Default for ChatCompletionsClient {
    fn default() -> Self {
        Self::new(
            DEFAULT_LLM_BASE_URL,
            DEFAULT_LLM_MODEL,
            Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
        )
    }
}

#[async_trait]
impl LlmPort for ChatCompletionsClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = ChatRequestBody::from_request(&self.model, &request);

        tracing::debug!(
            model = %self.model,
            messages = body.messages.len(),
            json_output = request.json_output,
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: ChatResponseBody = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        payload.into_llm_response()
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatRequestBody {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

impl ChatRequestBody {
    fn from_request(model: &str, request: &LlmRequest) -> Self {
        let system = request
            .system_prompt
            .as_ref()
            .map(|prompt| WireMessage::new("system", prompt));

        let messages = system
            .into_iter()
            .chain(request.messages.iter().map(|msg| {
                let role = match msg.role {
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                    MessageRole::System => "system",
                };
                WireMessage::new(role, &msg.content)
            }))
            .collect();

        Self {
            model: model.to_string(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_output.then(|| ResponseFormat {
                kind: "json_object".to_string(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

impl WireMessage {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponseBody {
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

impl ChatResponseBody {
    fn into_llm_response(self) -> Result<LlmResponse, LlmError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("No choices in LLM response".to_string()))?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("stop") | None => FinishReason::Stop,
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            Some(_) => FinishReason::Unknown,
        };

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            finish_reason,
            usage: self.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
        })
    }
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
