//! Narration language and its code-switching rule

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language used when the caller does not pick one.
pub const DEFAULT_LANGUAGE: &str = "English";

/// The language a play-through is narrated in.
///
/// Non-English narration is still mostly English, but greetings, cultural
/// terms and dialogue switch to the chosen language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NarrationLanguage(String);

impl NarrationLanguage {
    /// Blank input falls back to English.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            Self::default()
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn from_option(raw: Option<&str>) -> Self {
        raw.map(Self::new).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_english(&self) -> bool {
        self.0.eq_ignore_ascii_case(DEFAULT_LANGUAGE)
    }

    /// The language rule embedded in the system instruction.
    pub fn instruction(&self) -> String {
        if self.is_english() {
            return "Narrate in English.".to_string();
        }
        let language = &self.0;
        format!(
            "Narrate primarily in English, but follow these code-switching rules:\n\
             1. Use {language} for all opening greetings and significant cultural terms.\n\
             2. Quotes and dialogue must be in {language} (add an English translation in parentheses if long).\n\
             3. Let the tone reflect the linguistic nuance of {language}.\n\
             Example: 'Namaste! (Hello!) The wind howled...'"
        )
    }
}

impl Default for NarrationLanguage {
    fn default() -> Self {
        Self(DEFAULT_LANGUAGE.to_string())
    }
}

impl fmt::Display for NarrationLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NarrationLanguage {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<NarrationLanguage> for String {
    fn from(language: NarrationLanguage) -> String {
        language.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_defaults_to_english() {
        assert!(NarrationLanguage::new("  ").is_english());
        assert!(NarrationLanguage::from_option(None).is_english());
    }

    #[test]
    fn english_rule_is_plain() {
        assert_eq!(NarrationLanguage::new("english").instruction(), "Narrate in English.");
    }

    #[test]
    fn other_languages_get_code_switching_rule() {
        let rule = NarrationLanguage::new("Hindi").instruction();
        assert!(rule.contains("Use Hindi for all opening greetings"));
        assert!(rule.contains("dialogue must be in Hindi"));
    }
}
