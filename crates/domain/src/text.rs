//! Character-safe excerpts of narration.

/// The first `max_chars` characters of `text`.
pub fn head_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

/// The last `max_chars` characters of `text`.
pub fn tail_chars(text: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return "";
    }
    match text.char_indices().rev().nth(max_chars - 1) {
        Some((byte, _)) => &text[byte..],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_returned_whole() {
        assert_eq!(head_chars("abc", 10), "abc");
        assert_eq!(tail_chars("abc", 10), "abc");
    }

    #[test]
    fn cuts_on_character_boundaries() {
        let text = "नमस्ते world";
        assert_eq!(tail_chars(text, 5), "world");
        assert_eq!(head_chars("héllo", 2), "hé");
        assert_eq!(tail_chars("héllo", 4), "éllo");
    }

    #[test]
    fn zero_length_excerpts_are_empty() {
        assert_eq!(head_chars("abc", 0), "");
        assert_eq!(tail_chars("abc", 0), "");
    }
}
