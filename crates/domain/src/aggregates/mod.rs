//! Aggregates: the consistency boundaries of a play-through.

pub mod character;
pub mod session;

pub use character::{
    is_placeholder_name, Character, DEFAULT_AGE, DEFAULT_VOICE_ID, PLACEHOLDER_NAME,
};
pub use session::{Session, SessionPhase};
