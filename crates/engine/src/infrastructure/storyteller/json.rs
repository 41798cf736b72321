//! Pulling a JSON object out of a chatty model reply.
//!
//! Models asked for "JSON only" still wrap it in code fences, prefix it with
//! prose or leak chat-template tokens. This module finds the first complete
//! top-level object and deserializes it.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::de::DeserializeOwned;

use crate::infrastructure::ports::CollaboratorError;

static FENCED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)```").expect("valid regex"));

static SPECIAL_TOKENS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\|[^|>]+\|>|\[/?INST\]|<</?SYS>>").expect("valid regex"));

/// Remove chat-template tokens that leak into some model outputs.
pub fn strip_special_tokens(raw: &str) -> String {
    SPECIAL_TOKENS_RE.replace_all(raw, "").trim().to_string()
}

/// The first balanced `{...}` in `text`, honoring string literals.
fn first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Locate the JSON object in a reply: fenced blocks first, then bare text.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    FENCED_RE
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .find_map(|block| first_object(block.as_str()))
        .or_else(|| first_object(raw))
}

/// Deserialize the JSON object embedded in a model reply.
pub fn parse_json_reply<T: DeserializeOwned>(
    collaborator: &'static str,
    raw: &str,
) -> Result<T, CollaboratorError> {
    let cleaned = strip_special_tokens(raw);
    let json = extract_json_object(&cleaned)
        .ok_or_else(|| CollaboratorError::malformed(collaborator, "no JSON object in reply"))?;

    serde_json::from_str(json).map_err(|e| {
        tracing::warn!(collaborator, error = %e, "Failed to parse model reply as JSON");
        CollaboratorError::malformed(collaborator, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Probe {
        name: String,
    }

    #[test]
    fn bare_object_is_found() {
        assert_eq!(
            extract_json_object(r#"Sure! {"name": "Kenji"} Enjoy."#),
            Some(r#"{"name": "Kenji"}"#)
        );
    }

    #[test]
    fn fenced_object_is_preferred() {
        let reply = "Here you go:\n```json\n{\"name\": \"Asha\"}\n```\n{\"name\": \"other\"}";
        assert_eq!(extract_json_object(reply), Some("{\"name\": \"Asha\"}"));
    }

    #[test]
    fn braces_inside_strings_do_not_end_the_object() {
        let reply = r#"{"story_text": "He drew a {strange} sigil", "emotion": "fear"} trailing"#;
        assert_eq!(
            extract_json_object(reply),
            Some(r#"{"story_text": "He drew a {strange} sigil", "emotion": "fear"}"#)
        );
    }

    #[test]
    fn unbalanced_reply_has_no_object() {
        assert_eq!(extract_json_object(r#"{"name": "Kenji""#), None);
        assert_eq!(extract_json_object("no json here"), None);
    }

    #[test]
    fn special_tokens_are_stripped_before_parsing() {
        let probe: Probe =
            parse_json_reply("identity", r#"<|start|>{"name": "Mei"}<|end|>"#).unwrap();
        assert_eq!(probe.name, "Mei");
    }

    #[test]
    fn malformed_reply_names_the_collaborator() {
        let err = parse_json_reply::<Probe>("identity", "nothing useful").unwrap_err();
        assert!(err.to_string().contains("identity"));
    }
}
