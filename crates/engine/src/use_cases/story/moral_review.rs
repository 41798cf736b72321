//! Scoring choices into the moral ledger and the closing reflection.

use std::sync::Arc;

use storyteller_domain::{derive_trait_signals, MoralScores, Session, TraitSignal};

use crate::infrastructure::ports::{AlignmentScore, AlignmentScorer, CollaboratorError};

/// What one scored choice changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub scores: MoralScores,
    /// Traits earned this turn (already-held traits excluded).
    pub new_traits: Vec<TraitSignal>,
}

pub struct MoralReview {
    scorer: Arc<dyn AlignmentScorer>,
}

impl MoralReview {
    pub fn new(scorer: Arc<dyn AlignmentScorer>) -> Self {
        Self { scorer }
    }

    /// Score `choice` as a reaction to the narration the player just read.
    pub async fn score(
        &self,
        choice: &str,
        prior_story_text: &str,
    ) -> Result<AlignmentScore, CollaboratorError> {
        self.scorer.score(choice, prior_story_text).await
    }

    /// Closing reflection on the final scores.
    pub async fn reflect(&self, scores: MoralScores) -> Result<String, CollaboratorError> {
        self.scorer.reflect(scores).await
    }

    /// Fold a score into the session: clamp into the ledger, then ratchet
    /// any traits the new totals imply onto the character.
    pub fn apply(session: &mut Session, score: &AlignmentScore) -> ReviewOutcome {
        let scores = session.moral_ledger_mut().apply_deltas(&score.deltas());
        let signals = derive_trait_signals(&scores);

        let new_traits = session
            .character_mut()
            .map(|character| character.apply_trait_signals(&signals))
            .unwrap_or_default();

        ReviewOutcome { scores, new_traits }
    }
}

/// One-line status of the ledger plus earned traits.
pub fn moral_summary(session: &Session) -> String {
    let summary = session.moral_ledger().scores().summary();
    match session.character().map(|c| c.traits()) {
        Some(traits) if !traits.is_empty() => format!("{summary} | traits: {}", traits.join(", ")),
        _ => summary,
    }
}
