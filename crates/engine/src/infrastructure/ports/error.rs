//! Error types for port operations.

#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    /// Transport failure: connection refused, timeout, reset.
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    /// The server answered with a non-success status.
    #[error("LLM returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Client errors are final except request timeout (408) and rate
    /// limiting (429).
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::RequestFailed(_) | LlmError::InvalidResponse(_) => true,
            LlmError::Status { status, .. } => {
                !(400..500).contains(status) || *status == 408 || *status == 429
            }
        }
    }
}

/// Failure of an LLM-backed story collaborator (generator, scorer, ...).
#[derive(Debug, Clone, thiserror::Error)]
pub enum CollaboratorError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// The service answered, but not in the agreed shape.
    #[error("Malformed reply from {collaborator}: {message}")]
    Malformed {
        collaborator: &'static str,
        message: String,
    },
}

impl CollaboratorError {
    pub fn malformed(collaborator: &'static str, message: impl ToString) -> Self {
        Self::Malformed {
            collaborator,
            message: message.to_string(),
        }
    }
}

/// Failure of speech synthesis, image generation or artifact storage.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
    #[error("Service unavailable")]
    Unavailable,
    #[error("Could not store artifact: {0}")]
    Storage(#[from] std::io::Error),
}
