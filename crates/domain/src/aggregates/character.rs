//! Protagonist aggregate
//!
//! # Invariants
//!
//! - `traits` never contains duplicates and only grows (a ratchet, not a mood)
//! - `visual_seed` is fixed at construction; there is no setter
//! - `visual_description()` is a pure function of the current state, so repeated
//!   image requests for an unchanged character carry an identical description

use serde::{Deserialize, Serialize};

use crate::value_objects::TraitSignal;
use crate::CharacterId;

/// Age every protagonist starts with. Gameplay does not change it.
pub const DEFAULT_AGE: u32 = 20;

/// Voice preset handed to the speech synthesizer.
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

/// Name used when no identity could be generated.
pub const PLACEHOLDER_NAME: &str = "Protagonist";

/// Whether a supplied name should be replaced by a generated identity.
pub fn is_placeholder_name(name: &str) -> bool {
    let trimmed = name.trim();
    trimmed.is_empty() || trimmed.contains(PLACEHOLDER_NAME)
}

/// The protagonist of a play-through
///
/// # Example
///
/// ```
/// use storyteller_domain::aggregates::Character;
/// use storyteller_domain::TraitSignal;
///
/// let mut kenji = Character::new("Kenji", "Japanese History - Samurai Era", 48213);
/// assert_eq!(kenji.apply_trait_signals(&[TraitSignal::Brave]), [TraitSignal::Brave]);
/// assert!(kenji.apply_trait_signals(&[TraitSignal::Brave]).is_empty());
/// assert_eq!(kenji.traits(), ["Brave"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    id: CharacterId,
    name: String,
    culture_label: String,
    age: u32,
    traits: Vec<String>,
    visual_seed: u32,
    voice_id: String,
}

impl Character {
    /// Create a character with a fresh id and the given seed.
    pub fn new(name: impl Into<String>, culture_label: impl Into<String>, visual_seed: u32) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            culture_label: culture_label.into(),
            age: DEFAULT_AGE,
            traits: Vec::new(),
            visual_seed,
            voice_id: DEFAULT_VOICE_ID.to_string(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> CharacterId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn culture_label(&self) -> &str {
        &self.culture_label
    }

    #[inline]
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Earned traits in the order they were earned.
    #[inline]
    pub fn traits(&self) -> &[String] {
        &self.traits
    }

    #[inline]
    pub fn visual_seed(&self) -> u32 {
        self.visual_seed
    }

    #[inline]
    pub fn voice_id(&self) -> &str {
        &self.voice_id
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a trait unless already present. Returns `true` if it was new.
    pub fn add_trait(&mut self, trait_label: impl Into<String>) -> bool {
        let trait_label = trait_label.into();
        if self.traits.iter().any(|t| *t == trait_label) {
            return false;
        }
        self.traits.push(trait_label);
        true
    }

    /// Add every signal not yet earned. Returns the ones that were new.
    pub fn apply_trait_signals(&mut self, signals: &[TraitSignal]) -> Vec<TraitSignal> {
        signals
            .iter()
            .copied()
            .filter(|signal| self.add_trait(signal.as_str()))
            .collect()
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Stable description of the character for image prompts.
    pub fn visual_description(&self) -> String {
        let mut parts = vec![
            format!("character {}", self.name),
            format!("{} ethnicity", self.culture_label),
            format!("age {}", self.age),
            "wearing traditional attire".to_string(),
        ];
        if !self.traits.is_empty() {
            parts.push(self.traits.join(", "));
        }
        parts.push("consistent face".to_string());
        parts.push(format!("seed {}", self.visual_seed));
        parts.push("high detail".to_string());
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kenji() -> Character {
        Character::new("Kenji", "Japanese History - Samurai Era", 48213)
    }

    #[test]
    fn new_character_has_defaults() {
        let character = kenji();
        assert_eq!(character.age(), DEFAULT_AGE);
        assert!(character.traits().is_empty());
        assert_eq!(character.voice_id(), DEFAULT_VOICE_ID);
        assert_eq!(character.visual_seed(), 48213);
    }

    #[test]
    fn traits_are_deduplicated_and_ordered() {
        let mut character = kenji();
        assert!(character.add_trait("Kind"));
        assert!(character.add_trait("Brave"));
        assert!(!character.add_trait("Kind"));
        assert_eq!(character.traits(), ["Kind", "Brave"]);
    }

    #[test]
    fn signals_accumulate_as_ratchet() {
        let mut character = kenji();
        assert_eq!(
            character.apply_trait_signals(&[TraitSignal::Kind, TraitSignal::Brave]),
            [TraitSignal::Kind, TraitSignal::Brave]
        );
        // Later turns emitting a different signal never remove earlier ones.
        assert_eq!(
            character.apply_trait_signals(&[TraitSignal::Kind, TraitSignal::Ruthless]),
            [TraitSignal::Ruthless]
        );
        assert_eq!(character.traits(), ["Kind", "Brave", "Ruthless"]);
    }

    #[test]
    fn visual_description_is_stable() {
        let character = kenji();
        assert_eq!(character.visual_description(), character.visual_description());
        assert_eq!(
            character.visual_description(),
            "character Kenji, Japanese History - Samurai Era ethnicity, age 20, \
             wearing traditional attire, consistent face, seed 48213, high detail"
        );
    }

    #[test]
    fn visual_description_changes_with_traits_then_stabilizes() {
        let mut character = kenji();
        let before = character.visual_description();

        character.add_trait("Brave");
        let after = character.visual_description();

        assert_ne!(before, after);
        assert!(after.contains("wearing traditional attire, Brave, consistent face"));
        assert_eq!(after, character.visual_description());
    }

    #[test]
    fn placeholder_names_detected() {
        assert!(is_placeholder_name(""));
        assert!(is_placeholder_name("  "));
        assert!(is_placeholder_name("Protagonist"));
        assert!(is_placeholder_name("The Protagonist"));
        assert!(!is_placeholder_name("Kenji"));
    }
}
