//! Instruction text for the narrative generator.

use std::sync::LazyLock;

use regex_lite::Regex;
use storyteller_domain::{EmotionLabel, NarrationLanguage, PlayerChoice, Theme};

/// Narration that closes on this (any case) ends the play-through.
pub const TERMINAL_MARKER: &str = "THE END";

pub const NO_GROUNDING: &str = "No specific cultural documents found. Rely on general \
knowledge but remain respectful and authentic.";

static TERMINAL_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bthe\s+end\W*$").expect("valid regex"));

/// Whether the narration finishes with the marker, trailing punctuation
/// allowed. "the end" inside a sentence does not count.
pub fn ends_with_terminal_marker(text: &str) -> bool {
    TERMINAL_MARKER_RE.is_match(text)
}

fn grounding_block(context: Option<&str>) -> String {
    match context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(context) => format!(
            "You have access to the following trusted cultural knowledge:\n{context}\n\n\
             You must ground your story in this context. Use the specific symbols, names and \
             festivals it mentions and do not invent details that contradict it."
        ),
        None => NO_GROUNDING.to_string(),
    }
}

/// The system instruction that opens every transcript.
pub fn system_instruction(context: Option<&str>, language: &NarrationLanguage) -> String {
    format!(
        "You are a Smart Cultural Storyteller. Your goal is to preserve and retell cultural \
         narratives in an engaging, interactive choose-your-own-adventure style.\n\n\
         {grounding}\n\n\
         Language Rule: {language_rule}\n\n\
         Format:\n\
         - Keep responses concise (100-150 words).\n\
         - End with exactly 2 or 3 distinct choices, as a numbered list: 1. [Choice A] 2. [Choice B]\n\
         - If information is unknown, acknowledge it subtly or steer towards known elements.\n\
         - When the story reaches its natural conclusion, finish the narration with '{TERMINAL_MARKER}' instead of choices.\n\
         Output JSON only: a single object with keys 'story_text', 'emotion' (one word: joy, \
         sadness, anger, fear, peace, mystery or neutral) and 'visual_keywords' (comma-separated \
         camera angle, lighting and color palette).",
        grounding = grounding_block(context),
        language_rule = language.instruction(),
    )
}

pub fn opening_instruction(theme: &Theme) -> String {
    format!("Start a story about {theme}. Set the scene and offer numbered choices.")
}

/// The player's choice plus their mood as context for the next segment.
pub fn continue_instruction(choice: &PlayerChoice, ambient: &EmotionLabel) -> String {
    format!("{choice}\n[Player mood: {ambient}]")
}
