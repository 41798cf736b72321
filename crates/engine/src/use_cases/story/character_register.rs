//! Protagonist creation.

use std::sync::Arc;

use storyteller_domain::aggregates::character::PLACEHOLDER_NAME;
use storyteller_domain::{is_placeholder_name, Character, Theme};

use crate::infrastructure::ports::{
    IdentityGenerator, RandomPort, VISUAL_SEED_MAX, VISUAL_SEED_MIN,
};

pub struct CharacterRegister {
    identity: Arc<dyn IdentityGenerator>,
    random: Arc<dyn RandomPort>,
}

impl CharacterRegister {
    pub fn new(identity: Arc<dyn IdentityGenerator>, random: Arc<dyn RandomPort>) -> Self {
        Self { identity, random }
    }

    /// Create the protagonist for a new play-through.
    ///
    /// A real `requested_name` is kept and the theme becomes the culture
    /// label. Otherwise the identity generator picks both; if it fails the
    /// character is a placeholder named after the theme's culture.
    pub async fn create(&self, theme: &Theme, requested_name: Option<&str>) -> Character {
        let seed = self.random.gen_range(VISUAL_SEED_MIN, VISUAL_SEED_MAX);

        if let Some(name) = requested_name.filter(|name| !is_placeholder_name(name)) {
            return Character::new(name.trim(), theme.title_case(), seed);
        }

        match self.identity.generate_identity(theme.as_str()).await {
            Ok(identity) => {
                tracing::info!(
                    name = %identity.name,
                    culture = %identity.culture_label,
                    "Generated protagonist identity"
                );
                Character::new(identity.name, identity.culture_label, seed)
            }
            Err(e) => {
                tracing::warn!(error = %e, theme = %theme, "Identity generation failed, using placeholder");
                Character::new(PLACEHOLDER_NAME, theme.title_case(), seed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{
        CollaboratorError, Identity, LlmError, MockIdentityGenerator, MockRandomPort,
    };

    fn seeded(seed: u32) -> Arc<dyn RandomPort> {
        let mut random = MockRandomPort::new();
        random
            .expect_gen_range()
            .withf(|min, max| *min == VISUAL_SEED_MIN && *max == VISUAL_SEED_MAX)
            .returning(move |_, _| seed);
        Arc::new(random)
    }

    fn theme() -> Theme {
        Theme::new("japanese folklore").unwrap()
    }

    #[tokio::test]
    async fn generated_identity_is_used() {
        let mut identity = MockIdentityGenerator::new();
        identity
            .expect_generate_identity()
            .withf(|theme| theme == "japanese folklore")
            .times(1)
            .returning(|_| {
                Ok(Identity {
                    name: "Kenji".to_string(),
                    culture_label: "Japanese Folklore - Edo".to_string(),
                })
            });

        let character = CharacterRegister::new(Arc::new(identity), seeded(48213))
            .create(&theme(), None)
            .await;

        assert_eq!(character.name(), "Kenji");
        assert_eq!(character.culture_label(), "Japanese Folklore - Edo");
        assert_eq!(character.visual_seed(), 48213);
    }

    #[tokio::test]
    async fn generator_failure_falls_back_to_placeholder() {
        let mut identity = MockIdentityGenerator::new();
        identity.expect_generate_identity().returning(|_| {
            Err(CollaboratorError::Llm(LlmError::RequestFailed(
                "timeout".to_string(),
            )))
        });

        let character = CharacterRegister::new(Arc::new(identity), seeded(10001))
            .create(&theme(), Some("Protagonist"))
            .await;

        assert_eq!(character.name(), "Protagonist");
        assert_eq!(character.culture_label(), "Japanese Folklore");
    }

    #[tokio::test]
    async fn real_name_skips_the_generator() {
        let identity = MockIdentityGenerator::new();

        let character = CharacterRegister::new(Arc::new(identity), seeded(20000))
            .create(&theme(), Some(" Aiko "))
            .await;

        assert_eq!(character.name(), "Aiko");
        assert_eq!(character.culture_label(), "Japanese Folklore");
    }

    #[tokio::test]
    async fn every_character_gets_a_fresh_id() {
        let mut identity = MockIdentityGenerator::new();
        identity.expect_generate_identity().returning(|_| {
            Ok(Identity {
                name: "Kenji".to_string(),
                culture_label: "Japanese".to_string(),
            })
        });
        let register = CharacterRegister::new(Arc::new(identity), seeded(30000));

        let first = register.create(&theme(), None).await;
        let second = register.create(&theme(), None).await;

        assert_ne!(first.id(), second.id());
    }
}
