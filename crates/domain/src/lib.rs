//! Storyteller domain.
//!
//! Pure types and invariants for an interactive, choice-driven story:
//! sessions, the protagonist, the moral ledger, emotion blending and the
//! bounded transcript. Nothing here performs I/O.

pub mod aggregates;
pub mod error;
pub mod ids;
pub mod text;
pub mod value_objects;

pub use aggregates::{is_placeholder_name, Character, Session, SessionPhase};
pub use error::DomainError;
pub use ids::{CharacterId, SessionId};
pub use text::{head_chars, tail_chars};
pub use value_objects::{
    blend, derive_trait_signals, title_case, AmbientEmotion, EmotionLabel, HistoryWindow,
    MessageRole, MoralAxis, MoralLedger, MoralScores, NarrationLanguage, PlayerChoice, Theme,
    TraitSignal, TranscriptMessage, WindowOutcome,
};
