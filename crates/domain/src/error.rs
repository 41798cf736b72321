//! Unified error types for the domain layer
//!
//! Domain operations are mostly total (clamping, windowing and blending never
//! fail), so this type only covers construction-time validation and phase
//! transitions that the orchestrator checks before mutating a session.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., blank theme)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Session phase does not allow the requested operation
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),
}

impl DomainError {
    /// Creates a validation error for rejected user input.
    ///
    /// # Example
    /// ```ignore
    /// if theme.trim().is_empty() {
    ///     return Err(DomainError::validation("Theme cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid state transition error
    pub fn invalid_state_transition(msg: impl Into<String>) -> Self {
        Self::InvalidStateTransition(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_prefixed() {
        let err = DomainError::validation("Theme cannot be empty");
        assert_eq!(err.to_string(), "Validation failed: Theme cannot be empty");
    }

    #[test]
    fn transition_error_matches_variant() {
        let err = DomainError::invalid_state_transition("session not started");
        assert!(matches!(err, DomainError::InvalidStateTransition(_)));
    }
}
