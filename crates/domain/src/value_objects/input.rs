//! Validated player input newtypes
//!
//! Both newtypes are valid by construction: trimmed and non-empty.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

// ============================================================================
// Theme
// ============================================================================

/// A validated story theme (non-empty, trimmed), e.g. "Japanese Folklore"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Theme(String);

impl Theme {
    /// Create a new validated theme.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the theme is empty after trimming.
    pub fn new(theme: impl Into<String>) -> Result<Self, DomainError> {
        let theme = theme.into();
        let trimmed = theme.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Theme cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Title-cased theme, used as the fallback culture label.
    pub fn title_case(&self) -> String {
        title_case(&self.0)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Theme {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Theme> for String {
    fn from(theme: Theme) -> String {
        theme.0
    }
}

// ============================================================================
// PlayerChoice
// ============================================================================

/// A validated player choice (non-empty, trimmed)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerChoice(String);

impl PlayerChoice {
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the choice is empty after trimming.
    pub fn new(choice: impl Into<String>) -> Result<Self, DomainError> {
        let choice = choice.into();
        let trimmed = choice.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Choice cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Uppercase the first letter of every word, lowercase the rest.
pub fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
