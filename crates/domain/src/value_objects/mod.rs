//! Value objects: immutable or self-validating pieces of session state.

pub mod emotion;
pub mod input;
pub mod language;
pub mod moral;
pub mod transcript;

pub use emotion::{blend, AmbientEmotion, EmotionLabel, DEFAULT_SAMPLE_INTERVAL_MS, NEUTRAL};
pub use input::{title_case, PlayerChoice, Theme};
pub use language::{NarrationLanguage, DEFAULT_LANGUAGE};
pub use moral::{
    derive_trait_signals, MoralAxis, MoralLedger, MoralScores, TraitSignal, MORAL_SCORE_MAX,
    MORAL_SCORE_MIN, TRAIT_THRESHOLD,
};
pub use transcript::{
    HistoryWindow, MessageRole, TranscriptMessage, WindowOutcome, DEFAULT_MAX_MESSAGES,
    FALLBACK_TAIL,
};
