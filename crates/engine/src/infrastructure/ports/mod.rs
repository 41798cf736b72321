//! Port traits for every collaborator the engine talks to.
//!
//! - `external`: LLM, image generation, speech synthesis, artifact storage
//! - `collaborators`: the story-level capabilities built on top of them
//! - `testing`: clock and randomness

mod collaborators;
mod error;
mod external;
mod testing;

pub use collaborators::{
    AlignmentScore, AlignmentScorer, EmotionEstimate, FaceFrame, GroundingRetriever, Identity,
    IdentityGenerator, NarrativeGenerator, PromptStylist, StoryBeat, VisionClassifier,
};
pub use error::{CollaboratorError, LlmError, MediaError};
pub use external::{
    ArtifactKind, ArtifactStore, AudioResult, ChatMessage, FinishReason, ImageGenPort,
    ImageRequest, ImageResult, LlmPort, LlmRequest, LlmResponse, MessageRole, SpeechPort,
    SpeechRequest, TokenUsage,
};
pub use testing::{ClockPort, RandomPort, VISUAL_SEED_MAX, VISUAL_SEED_MIN};

#[cfg(test)]
pub use collaborators::{
    MockAlignmentScorer, MockGroundingRetriever, MockIdentityGenerator, MockNarrativeGenerator,
    MockPromptStylist, MockVisionClassifier,
};
#[cfg(test)]
pub use external::{MockArtifactStore, MockImageGenPort, MockLlmPort, MockSpeechPort};
#[cfg(test)]
pub use testing::{MockClockPort, MockRandomPort};
