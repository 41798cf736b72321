//! Speech and illustration for a finished story segment.
//!
//! Both stages are optional: every failure is logged and returned to the
//! orchestrator, which records it and carries on with the text.

use std::path::PathBuf;
use std::sync::Arc;

use storyteller_domain::{head_chars, EmotionLabel};

use crate::infrastructure::ports::{
    ArtifactKind, ArtifactStore, ImageGenPort, ImageRequest, MediaError, PromptStylist,
    SpeechPort, SpeechRequest,
};

/// Excerpt length handed to the prompt stylist.
pub const STYLIST_EXCERPT_CHARS: usize = 500;
/// Excerpt length embedded in the image prompt.
pub const SCENE_EXCERPT_CHARS: usize = 400;

pub const IMAGE_WIDTH: u32 = 1024;
pub const IMAGE_HEIGHT: u32 = 576;

const STYLE_PREAMBLE: &str = "masterpiece, ultra-detailed cinematic illustration, storybook \
fantasy art, authentic cultural aesthetics, rich textures, 8k resolution";
const STYLE_TAIL: &str =
    "digital painting, concept art, unreal engine quality, artstation trending";
pub const NEGATIVE_PROMPT: &str =
    "blurry, low resolution, distorted face, extra limbs, bad anatomy, watermark, text";

/// Keywords used when the stylist is unavailable.
pub fn fallback_keywords(emotion: &EmotionLabel) -> String {
    format!("cinematic shot, {emotion} lighting, 8k resolution")
}

/// Everything needed to illustrate one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct IllustrationBrief {
    pub story_text: String,
    /// Blended emotion directive for the scene.
    pub emotion: EmotionLabel,
    /// Keywords the narrative declared for itself.
    pub visual_keywords: String,
    pub character_description: String,
    pub seed: u32,
}

pub struct MediaPipeline {
    speech: Arc<dyn SpeechPort>,
    image_gen: Arc<dyn ImageGenPort>,
    stylist: Arc<dyn PromptStylist>,
    artifacts: Arc<dyn ArtifactStore>,
}

impl MediaPipeline {
    pub fn new(
        speech: Arc<dyn SpeechPort>,
        image_gen: Arc<dyn ImageGenPort>,
        stylist: Arc<dyn PromptStylist>,
        artifacts: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            speech,
            image_gen,
            stylist,
            artifacts,
        }
    }

    pub async fn narrate(&self, text: &str, voice_id: &str) -> Result<PathBuf, MediaError> {
        let audio = self
            .speech
            .synthesize(SpeechRequest {
                text: text.to_string(),
                voice: voice_id.to_string(),
            })
            .await?;

        self.artifacts
            .save(ArtifactKind::Audio, audio.audio_data, audio.format)
            .await
    }

    pub async fn illustrate(&self, brief: IllustrationBrief) -> Result<PathBuf, MediaError> {
        let request = ImageRequest {
            prompt: self.image_prompt(&brief).await,
            negative_prompt: NEGATIVE_PROMPT.to_string(),
            seed: brief.seed,
            width: IMAGE_WIDTH,
            height: IMAGE_HEIGHT,
        };

        let image = self.image_gen.generate(request).await?;
        self.artifacts
            .save(ArtifactKind::Image, image.image_data, image.format)
            .await
    }

    async fn image_prompt(&self, brief: &IllustrationBrief) -> String {
        let excerpt = head_chars(&brief.story_text, STYLIST_EXCERPT_CHARS);
        let keywords = match self.stylist.enhance(excerpt, brief.emotion.as_str()).await {
            Ok(keywords) => keywords,
            Err(e) => {
                tracing::warn!(error = %e, "Prompt stylist failed, using template keywords");
                fallback_keywords(&brief.emotion)
            }
        };

        compose_image_prompt(&keywords, brief)
    }
}

fn compose_image_prompt(keywords: &str, brief: &IllustrationBrief) -> String {
    let mut look = vec![STYLE_PREAMBLE, keywords.trim()];
    let declared = brief.visual_keywords.trim();
    if !declared.is_empty() {
        look.push(declared);
    }

    format!(
        "{look}.\nScene: {scene}\nCharacter focus: {character}\nStyle: {STYLE_TAIL}",
        look = look.join(", "),
        scene = head_chars(brief.story_text.trim(), SCENE_EXCERPT_CHARS),
        character = brief.character_description,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{
        AudioResult, CollaboratorError, ImageResult, LlmError, MockArtifactStore,
        MockImageGenPort, MockPromptStylist, MockSpeechPort,
    };

    fn brief() -> IllustrationBrief {
        IllustrationBrief {
            story_text: "k".repeat(600),
            emotion: EmotionLabel::new("fear"),
            visual_keywords: "torchlight".to_string(),
            character_description: "character Kenji, seed 48213".to_string(),
            seed: 48213,
        }
    }

    fn storing(kind: ArtifactKind, path: &'static str) -> MockArtifactStore {
        let mut artifacts = MockArtifactStore::new();
        artifacts
            .expect_save()
            .withf(move |k, data, _| *k == kind && !data.is_empty())
            .times(1)
            .returning(move |_, _, _| Ok(PathBuf::from(path)));
        artifacts
    }

    #[tokio::test]
    async fn narration_is_stored_as_audio() {
        let mut speech = MockSpeechPort::new();
        speech
            .expect_synthesize()
            .withf(|request| request.voice == "21m00Tcm4TlvDq8ikWAM")
            .returning(|_| {
                Ok(AudioResult {
                    audio_data: vec![1, 2, 3],
                    format: "mp3".to_string(),
                })
            });

        let pipeline = MediaPipeline::new(
            Arc::new(speech),
            Arc::new(MockImageGenPort::new()),
            Arc::new(MockPromptStylist::new()),
            Arc::new(storing(ArtifactKind::Audio, "media/audio_1.mp3")),
        );

        let path = pipeline
            .narrate("Once upon a time", "21m00Tcm4TlvDq8ikWAM")
            .await
            .unwrap();
        assert_eq!(path, PathBuf::from("media/audio_1.mp3"));
    }

    #[tokio::test]
    async fn illustration_uses_seed_excerpts_and_character() {
        let mut stylist = MockPromptStylist::new();
        stylist
            .expect_enhance()
            .withf(|excerpt, emotion| excerpt.chars().count() == STYLIST_EXCERPT_CHARS && emotion == "fear")
            .returning(|_, _| Ok("low angle, cold light".to_string()));

        let mut image_gen = MockImageGenPort::new();
        image_gen
            .expect_generate()
            .withf(|request| {
                request.seed == 48213
                    && request.negative_prompt == NEGATIVE_PROMPT
                    && request.prompt.contains("low angle, cold light, torchlight")
                    && request.prompt.contains(&format!("Scene: {}\n", "k".repeat(SCENE_EXCERPT_CHARS)))
                    && request.prompt.contains("Character focus: character Kenji, seed 48213")
            })
            .returning(|_| {
                Ok(ImageResult {
                    image_data: vec![0x89],
                    format: "png".to_string(),
                })
            });

        let pipeline = MediaPipeline::new(
            Arc::new(MockSpeechPort::new()),
            Arc::new(image_gen),
            Arc::new(stylist),
            Arc::new(storing(ArtifactKind::Image, "media/scene_1.png")),
        );

        assert_eq!(
            pipeline.illustrate(brief()).await.unwrap(),
            PathBuf::from("media/scene_1.png")
        );
    }

    #[tokio::test]
    async fn stylist_failure_uses_template_keywords() {
        let mut stylist = MockPromptStylist::new();
        stylist.expect_enhance().returning(|_, _| {
            Err(CollaboratorError::Llm(LlmError::RequestFailed("down".into())))
        });

        let mut image_gen = MockImageGenPort::new();
        image_gen
            .expect_generate()
            .withf(|request| request.prompt.contains("cinematic shot, fear lighting, 8k resolution"))
            .returning(|_| {
                Ok(ImageResult {
                    image_data: vec![0x89],
                    format: "png".to_string(),
                })
            });

        let pipeline = MediaPipeline::new(
            Arc::new(MockSpeechPort::new()),
            Arc::new(image_gen),
            Arc::new(stylist),
            Arc::new(storing(ArtifactKind::Image, "media/scene_2.png")),
        );

        assert!(pipeline.illustrate(brief()).await.is_ok());
    }

    #[tokio::test]
    async fn renderer_failure_stores_nothing() {
        let mut stylist = MockPromptStylist::new();
        stylist.expect_enhance().returning(|_, _| Ok("wide shot".to_string()));
        let mut image_gen = MockImageGenPort::new();
        image_gen
            .expect_generate()
            .returning(|_| Err(MediaError::Unavailable));
        let mut artifacts = MockArtifactStore::new();
        artifacts.expect_save().never();

        let pipeline = MediaPipeline::new(
            Arc::new(MockSpeechPort::new()),
            Arc::new(image_gen),
            Arc::new(stylist),
            Arc::new(artifacts),
        );

        assert!(matches!(
            pipeline.illustrate(brief()).await,
            Err(MediaError::Unavailable)
        ));
    }
}
