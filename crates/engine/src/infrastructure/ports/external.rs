//! External service port traits (LLM, image generation, speech, artifacts).

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use storyteller_domain::{MessageRole as TranscriptRole, TranscriptMessage};

use super::error::{LlmError, MediaError};

// =============================================================================
// LLM Types
// =============================================================================

/// LLM request/response types
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// The conversation history
    pub messages: Vec<ChatMessage>,
    /// System prompt / context
    pub system_prompt: Option<String>,
    /// Temperature for response generation (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Ask the server to constrain output to a JSON object
    pub json_output: bool,
}

impl LlmRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            system_prompt: None,
            temperature: None,
            max_tokens: None,
            json_output: false,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }
}

impl From<&TranscriptMessage> for ChatMessage {
    fn from(message: &TranscriptMessage) -> Self {
        let role = match message.role {
            TranscriptRole::System => MessageRole::System,
            TranscriptRole::User => MessageRole::User,
            TranscriptRole::Assistant => MessageRole::Assistant,
        };
        Self {
            role,
            content: message.content.clone(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// Response from the LLM
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// The generated text content
    pub content: String,
    /// Finish reason
    pub finish_reason: FinishReason,
    /// Token usage
    pub usage: Option<TokenUsage>,
}

/// Reason the generation finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    #[serde(other)]
    Unknown,
}

/// Token usage information
#[derive(Debug, Clone)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmPort: Send + Sync {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;
}

// =============================================================================
// Image Generation
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub prompt: String,
    pub negative_prompt: String,
    /// Forwarded to the sampler so one character keeps one face.
    pub seed: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct ImageResult {
    pub image_data: Vec<u8>,
    pub format: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageGenPort: Send + Sync {
    async fn generate(&self, request: ImageRequest) -> Result<ImageResult, MediaError>;
    async fn check_health(&self) -> Result<bool, MediaError>;
}

// =============================================================================
// Speech Synthesis
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: String,
}

#[derive(Debug, Clone)]
pub struct AudioResult {
    pub audio_data: Vec<u8>,
    pub format: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechPort: Send + Sync {
    async fn synthesize(&self, request: SpeechRequest) -> Result<AudioResult, MediaError>;
}

// =============================================================================
// Artifact Storage
// =============================================================================

/// What a stored media artifact is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Audio,
    Image,
}

impl ArtifactKind {
    pub fn file_prefix(&self) -> &'static str {
        match self {
            ArtifactKind::Audio => "audio",
            ArtifactKind::Image => "scene",
        }
    }
}

/// Persists rendered media and hands back a path the caller can serve.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn save(
        &self,
        kind: ArtifactKind,
        data: Vec<u8>,
        format: String,
    ) -> Result<PathBuf, MediaError>;
}
