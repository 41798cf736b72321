//! Story use cases.
//!
//! A play-through is a sequence of turns over one session:
//! 1. `start_turn` creates the protagonist, grounds the theme and narrates the opening
//! 2. `continue_turn` narrates the next segment while scoring the player's choice
//! 3. Each turn streams text, then audio, then the illustrated scene
//! 4. Narration ending in "THE END" closes the story with a moral reflection

use std::sync::Arc;

mod character_register;
mod media;
mod moral_review;
mod prompts;
mod turn;


pub use character_register::CharacterRegister;
pub use media::{fallback_keywords, IllustrationBrief, MediaPipeline, NEGATIVE_PROMPT};
pub use moral_review::{moral_summary, MoralReview, ReviewOutcome};
pub use prompts::{ends_with_terminal_marker, TERMINAL_MARKER};
pub use turn::{
    Degradation, MissingInput, TurnOrchestrator, TurnSnapshot, TurnStage, TurnStatus, TurnStream,
};

/// Container for story use cases.
pub struct StoryUseCases {
    pub turns: Arc<TurnOrchestrator>,
}

impl StoryUseCases {
    pub fn new(turns: Arc<TurnOrchestrator>) -> Self {
        Self { turns }
    }
}
