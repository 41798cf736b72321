//! Conversation transcript and the bounded history window
//!
//! The first message of every transcript is the system instruction that
//! grounds the story (persona, cultural context, language rule, output
//! format). Windowing keeps that instruction plus the most recent messages and
//! trades long-range memory for bounded generation cost.

use serde::{Deserialize, Serialize};

/// Messages kept verbatim when the window detects an inconsistent transcript.
pub const FALLBACK_TAIL: usize = 5;

/// Default transcript bound (system instruction included).
pub const DEFAULT_MAX_MESSAGES: usize = 10;

/// Role of a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A role-tagged transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: MessageRole,
    pub content: String,
}

impl TranscriptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

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
}

/// What the window did to a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOutcome {
    /// Already within bounds.
    Untouched,
    /// Trimmed to the system instruction plus the newest messages.
    Trimmed { dropped: usize },
    /// Transcript or window looked inconsistent; kept the head and the last
    /// `FALLBACK_TAIL` messages.
    Fallback { dropped: usize },
}

/// Bounded conversational context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
    max_messages: usize,
}

impl HistoryWindow {
    pub fn new(max_messages: usize) -> Self {
        Self { max_messages }
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Trim `transcript` in place.
    ///
    /// Keeps element 0 plus the most recent `max - 1` elements once the length
    /// exceeds `max`. Never drops element 0.
    pub fn apply(&self, transcript: &mut Vec<TranscriptMessage>) -> WindowOutcome {
        if transcript.is_empty() {
            return WindowOutcome::Untouched;
        }

        let consistent =
            self.max_messages >= 2 && transcript[0].role == MessageRole::System;
        if !consistent {
            return match keep_head_and_tail(transcript, FALLBACK_TAIL) {
                0 => WindowOutcome::Untouched,
                dropped => WindowOutcome::Fallback { dropped },
            };
        }

        if transcript.len() <= self.max_messages {
            return WindowOutcome::Untouched;
        }

        let dropped = keep_head_and_tail(transcript, self.max_messages - 1);
        WindowOutcome::Trimmed { dropped }
    }
}

/// Drop everything between the head and the last `tail` messages.
fn keep_head_and_tail(transcript: &mut Vec<TranscriptMessage>, tail: usize) -> usize {
    if transcript.len() <= tail + 1 {
        return 0;
    }
    let dropped = transcript.len() - 1 - tail;
    transcript.drain(1..1 + dropped);
    dropped
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(len: usize) -> Vec<TranscriptMessage> {
        let mut messages = vec![TranscriptMessage::system("instruction")];
        for i in 1..len {
            if i % 2 == 1 {
                messages.push(TranscriptMessage::user(format!("turn {}", i)));
            } else {
                messages.push(TranscriptMessage::assistant(format!("turn {}", i)));
            }
        }
        messages
    }

    #[test]
    fn fifteen_messages_window_ten() {
        let original = transcript(15);
        let mut windowed = original.clone();

        let outcome = HistoryWindow::new(10).apply(&mut windowed);

        assert_eq!(outcome, WindowOutcome::Trimmed { dropped: 5 });
        assert_eq!(windowed.len(), 10);
        assert_eq!(windowed[0], original[0]);
        assert_eq!(&windowed[1..], &original[6..15]);
    }

    #[test]
    fn short_transcript_untouched() {
        let original = transcript(10);
        let mut windowed = original.clone();
        assert_eq!(HistoryWindow::new(10).apply(&mut windowed), WindowOutcome::Untouched);
        assert_eq!(windowed, original);
    }

    #[test]
    fn empty_transcript_untouched() {
        let mut windowed = Vec::new();
        assert_eq!(HistoryWindow::new(10).apply(&mut windowed), WindowOutcome::Untouched);
        assert!(windowed.is_empty());
    }

    #[test]
    fn missing_system_head_falls_back_to_last_five() {
        let mut original = transcript(12);
        original[0] = TranscriptMessage::user("corrupted head");
        let mut windowed = original.clone();

        let outcome = HistoryWindow::new(10).apply(&mut windowed);

        assert_eq!(outcome, WindowOutcome::Fallback { dropped: 6 });
        assert_eq!(windowed.len(), 6);
        assert_eq!(windowed[0], original[0]);
        assert_eq!(&windowed[1..], &original[7..12]);
    }

    #[test]
    fn degenerate_window_falls_back() {
        let original = transcript(9);
        let mut windowed = original.clone();

        let outcome = HistoryWindow::new(1).apply(&mut windowed);

        assert!(matches!(outcome, WindowOutcome::Fallback { .. }));
        assert_eq!(windowed[0], original[0]);
        assert_eq!(&windowed[1..], &original[4..9]);
    }
}
