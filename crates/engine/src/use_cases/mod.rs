//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific domain area.
//! Use cases orchestrate collaborator ports to fulfill user stories.

pub mod emotion;
pub mod story;

// Re-export main types
pub use emotion::EmotionUseCases;
pub use story::StoryUseCases;
