//! Story collaborator ports.
//!
//! Each generative capability the orchestrator needs sits behind one narrow
//! trait. Production adapters are LLM-backed (`infrastructure::storyteller`)
//! or heuristic (`infrastructure::vision`); tests inject mocks or fakes.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use storyteller_domain::{EmotionLabel, MoralAxis, MoralScores, TranscriptMessage};

use super::error::CollaboratorError;

// =============================================================================
// Narrative
// =============================================================================

/// One generated story segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryBeat {
    /// 100-150 words ending with numbered choices.
    pub story_text: String,
    /// Single-word emotion declared by the story.
    pub emotion: String,
    /// Comma-separated camera, lighting and palette keywords.
    pub visual_keywords: String,
}

impl StoryBeat {
    pub fn emotion_label(&self) -> EmotionLabel {
        EmotionLabel::new(&self.emotion)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// Continue `transcript` with `instruction` as the newest user message.
    async fn generate(
        &self,
        transcript: Vec<TranscriptMessage>,
        instruction: String,
    ) -> Result<StoryBeat, CollaboratorError>;
}

// =============================================================================
// Grounding
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroundingRetriever: Send + Sync {
    /// Cultural knowledge block for `theme`; may be empty.
    async fn get_context(&self, theme: &str) -> Result<String, CollaboratorError>;
}

// =============================================================================
// Identity
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub culture_label: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityGenerator: Send + Sync {
    async fn generate_identity(&self, theme: &str) -> Result<Identity, CollaboratorError>;
}

// =============================================================================
// Alignment
// =============================================================================

/// Score deltas for one choice, each roughly in `[-5, 5]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentScore {
    #[serde(default)]
    pub compassion: i32,
    #[serde(default)]
    pub courage: i32,
    #[serde(default)]
    pub greed: i32,
    #[serde(default)]
    pub reasoning: String,
}

impl AlignmentScore {
    /// Keyed deltas for `MoralLedger::apply_deltas`.
    pub fn deltas(&self) -> BTreeMap<String, i32> {
        MoralAxis::all()
            .iter()
            .map(|axis| {
                let delta = match axis {
                    MoralAxis::Compassion => self.compassion,
                    MoralAxis::Courage => self.courage,
                    MoralAxis::Greed => self.greed,
                };
                (axis.as_str().to_string(), delta)
            })
            .collect()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlignmentScorer: Send + Sync {
    /// Judge `choice` as a reaction to `prior_story_text`.
    async fn score(
        &self,
        choice: &str,
        prior_story_text: &str,
    ) -> Result<AlignmentScore, CollaboratorError>;

    /// Short closing reflection on the final scores.
    async fn reflect(&self, scores: MoralScores) -> Result<String, CollaboratorError>;
}

// =============================================================================
// Prompt styling
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PromptStylist: Send + Sync {
    /// Comma-separated visual keywords for a story excerpt and emotion.
    async fn enhance(&self, excerpt: &str, emotion: &str) -> Result<String, CollaboratorError>;
}

// =============================================================================
// Vision
// =============================================================================

/// One camera frame, reduced to facial blendshape scores (0.0 - 1.0).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceFrame {
    #[serde(default)]
    pub blendshapes: HashMap<String, f32>,
}

impl FaceFrame {
    pub fn score(&self, name: &str) -> f32 {
        self.blendshapes.get(name).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionEstimate {
    pub emotion: EmotionLabel,
    pub confidence: f32,
}

#[cfg_attr(test, mockall::automock)]
pub trait VisionClassifier: Send + Sync {
    /// `None` when no face could be read from the frame.
    fn classify(&self, frame: &FaceFrame) -> Option<EmotionEstimate>;
}
