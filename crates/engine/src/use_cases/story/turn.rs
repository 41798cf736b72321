//! Turn orchestration.
//!
//! A turn is a lazy, finite stream of snapshots. Nothing runs until the first
//! poll; each poll drives the pipeline to the next stage:
//!
//! ```text
//! Narrate ──► [Text] ──► Voice ──► [Text+Audio] ──► Illustrate ──► [Text+Audio+Image] ──► end
//! ```
//!
//! Every snapshot carries the complete session as it stands after the text
//! stage, so callers can render or persist any element they receive. Dropping
//! the stream drops whatever collaborator call is in flight.

use std::path::PathBuf;
use std::sync::Arc;

use futures_util::future::join;
use futures_util::stream::{self, BoxStream, StreamExt};
use serde::Serialize;

use storyteller_domain::{
    blend, EmotionLabel, HistoryWindow, NarrationLanguage, PlayerChoice, Session, Theme,
    TranscriptMessage, WindowOutcome,
};

use super::character_register::CharacterRegister;
use super::media::{IllustrationBrief, MediaPipeline};
use super::moral_review::{moral_summary, MoralReview};
use super::prompts;
use crate::infrastructure::ports::{GroundingRetriever, NarrativeGenerator, StoryBeat};

pub type TurnStream = BoxStream<'static, TurnSnapshot>;

// =============================================================================
// Snapshot types
// =============================================================================

/// How far through the turn a snapshot is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStage {
    Text,
    Audio,
    Image,
}

/// Which input was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingInput {
    Theme,
    Choice,
}

impl MissingInput {
    pub fn prompt(&self) -> &'static str {
        match self {
            MissingInput::Theme => "Please enter a theme to start.",
            MissingInput::Choice => "Please make a choice to continue.",
        }
    }
}

/// A stage that fell back instead of completing normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Degradation {
    Grounding,
    Narration,
    Scoring,
    Reflection,
    Audio,
    Image,
}

impl Degradation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Degradation::Grounding => "grounding",
            Degradation::Narration => "narration",
            Degradation::Scoring => "scoring",
            Degradation::Reflection => "reflection",
            Degradation::Audio => "audio",
            Degradation::Image => "image",
        }
    }

    /// Silent degradations are recorded but do not mark the turn degraded.
    pub fn is_silent(&self) -> bool {
        matches!(self, Degradation::Grounding)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "missing", rename_all = "snake_case")]
pub enum TurnStatus {
    Ok,
    InputRequired(MissingInput),
    SessionExpired,
    Degraded,
}

impl TurnStatus {
    /// Rejected turns never touched the session.
    pub fn is_rejection(&self) -> bool {
        matches!(self, TurnStatus::InputRequired(_) | TurnStatus::SessionExpired)
    }
}

/// One element of a turn stream.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnSnapshot {
    pub stage: TurnStage,
    pub story_text: String,
    pub audio: Option<PathBuf>,
    pub image: Option<PathBuf>,
    pub session: Session,
    pub moral_summary: String,
    pub status: TurnStatus,
    pub degradations: Vec<Degradation>,
}

impl TurnSnapshot {
    fn rejected(session: Session, status: TurnStatus, message: &str) -> Self {
        Self {
            stage: TurnStage::Text,
            story_text: message.to_string(),
            audio: None,
            image: None,
            moral_summary: moral_summary(&session),
            session,
            status,
            degradations: Vec::new(),
        }
    }

    /// Human-readable status line.
    pub fn status_message(&self) -> String {
        match self.status {
            TurnStatus::InputRequired(missing) => missing.prompt().to_string(),
            TurnStatus::SessionExpired => {
                "Session expired. Please start a new story.".to_string()
            }
            TurnStatus::Degraded => {
                let stages: Vec<&str> = self
                    .degradations
                    .iter()
                    .filter(|d| !d.is_silent())
                    .map(Degradation::as_str)
                    .collect();
                format!("Completed with fallbacks: {}.", stages.join(", "))
            }
            TurnStatus::Ok => match self.stage {
                TurnStage::Text => "Story ready, narrating...".to_string(),
                TurnStage::Audio => "Narration ready, illustrating...".to_string(),
                TurnStage::Image => "Scene complete.".to_string(),
            },
        }
    }
}

pub const SESSION_EXPIRED_TEXT: &str = "This story session has expired. Please start a new story.";

// =============================================================================
// Pipeline state
// =============================================================================

/// A turn's text stage is done; media stages follow.
#[derive(Debug)]
struct Narrated {
    session: Session,
    story_text: String,
    visual_keywords: String,
    directive: EmotionLabel,
    audio: Option<PathBuf>,
    degradations: Vec<Degradation>,
}

impl Narrated {
    fn snapshot(&self, stage: TurnStage, image: Option<PathBuf>) -> TurnSnapshot {
        let degraded = self.degradations.iter().any(|d| !d.is_silent());
        TurnSnapshot {
            stage,
            story_text: self.story_text.clone(),
            audio: self.audio.clone(),
            image,
            session: self.session.clone(),
            moral_summary: moral_summary(&self.session),
            status: if degraded {
                TurnStatus::Degraded
            } else {
                TurnStatus::Ok
            },
            degradations: self.degradations.clone(),
        }
    }
}

enum Step {
    Start {
        theme: Theme,
        language: NarrationLanguage,
        session: Session,
    },
    Continue {
        choice: PlayerChoice,
        ambient: EmotionLabel,
        session: Session,
    },
    Voice(Box<Narrated>),
    Illustrate(Box<Narrated>),
    Done,
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Drives turns through narration, scoring and media.
#[derive(Clone)]
pub struct TurnOrchestrator {
    narrative: Arc<dyn NarrativeGenerator>,
    grounding: Arc<dyn GroundingRetriever>,
    characters: Arc<CharacterRegister>,
    moral: Arc<MoralReview>,
    media: Arc<MediaPipeline>,
    window: HistoryWindow,
}

impl TurnOrchestrator {
    pub fn new(
        narrative: Arc<dyn NarrativeGenerator>,
        grounding: Arc<dyn GroundingRetriever>,
        characters: Arc<CharacterRegister>,
        moral: Arc<MoralReview>,
        media: Arc<MediaPipeline>,
        window: HistoryWindow,
    ) -> Self {
        Self {
            narrative,
            grounding,
            characters,
            moral,
            media,
            window,
        }
    }

    /// Begin (or restart) a play-through on `session`.
    ///
    /// A blank theme yields one `InputRequired` snapshot carrying the
    /// session unchanged.
    pub fn start_turn(
        &self,
        theme: &str,
        language: Option<&str>,
        session: Session,
    ) -> TurnStream {
        let Ok(theme) = Theme::new(theme) else {
            let missing = MissingInput::Theme;
            return single(TurnSnapshot::rejected(
                session,
                TurnStatus::InputRequired(missing),
                missing.prompt(),
            ));
        };

        self.run(Step::Start {
            theme,
            language: NarrationLanguage::from_option(language),
            session,
        })
    }

    /// Advance an active (or ended) play-through with the player's choice.
    ///
    /// A blank choice yields one `InputRequired` snapshot; a session that
    /// was never started yields one `SessionExpired` snapshot. Either way
    /// the session comes back unchanged.
    pub fn continue_turn(
        &self,
        choice: &str,
        ambient: EmotionLabel,
        session: Session,
    ) -> TurnStream {
        let Ok(choice) = PlayerChoice::new(choice) else {
            let missing = MissingInput::Choice;
            return single(TurnSnapshot::rejected(
                session,
                TurnStatus::InputRequired(missing),
                missing.prompt(),
            ));
        };

        if let Err(e) = session.ensure_playable() {
            tracing::info!(session_id = %session.id(), error = %e, "Continuation on unstarted session");
            return single(TurnSnapshot::rejected(
                session,
                TurnStatus::SessionExpired,
                SESSION_EXPIRED_TEXT,
            ));
        }

        self.run(Step::Continue {
            choice,
            ambient,
            session,
        })
    }

    fn run(&self, first: Step) -> TurnStream {
        stream::unfold((self.clone(), first), |(orchestrator, step)| async move {
            let (snapshot, next) = orchestrator.advance(step).await?;
            Some((snapshot, (orchestrator, next)))
        })
        .boxed()
    }

    async fn advance(&self, step: Step) -> Option<(TurnSnapshot, Step)> {
        match step {
            Step::Start {
                theme,
                language,
                session,
            } => {
                let narrated = self.open(theme, language, session).await;
                Some((narrated.snapshot(TurnStage::Text, None), Step::Voice(Box::new(narrated))))
            }
            Step::Continue {
                choice,
                ambient,
                session,
            } => {
                let narrated = self.proceed(choice, ambient, session).await;
                Some((narrated.snapshot(TurnStage::Text, None), Step::Voice(Box::new(narrated))))
            }
            Step::Voice(mut narrated) => {
                self.voice(&mut narrated).await;
                Some((
                    narrated.snapshot(TurnStage::Audio, None),
                    Step::Illustrate(narrated),
                ))
            }
            Step::Illustrate(mut narrated) => {
                let image = self.illustrate(&mut narrated).await;
                Some((narrated.snapshot(TurnStage::Image, image), Step::Done))
            }
            Step::Done => None,
        }
    }

    // =========================================================================
    // Text stage
    // =========================================================================

    async fn open(
        &self,
        theme: Theme,
        language: NarrationLanguage,
        mut session: Session,
    ) -> Narrated {
        let mut degradations = Vec::new();
        let character = self.characters.create(&theme, None).await;

        let context = match self.grounding.get_context(theme.as_str()).await {
            Ok(context) => Some(context),
            Err(e) => {
                tracing::warn!(session_id = %session.id(), error = %e, "Grounding unavailable");
                degradations.push(Degradation::Grounding);
                None
            }
        };

        let system = prompts::system_instruction(context.as_deref(), &language);
        let opening = prompts::opening_instruction(&theme);
        let mut transcript = vec![TranscriptMessage::system(system)];

        let generated = self
            .narrative
            .generate(transcript.clone(), opening.clone())
            .await;
        transcript.push(TranscriptMessage::user(opening));
        let beat = match generated {
            Ok(beat) => {
                transcript.push(assistant_message(&beat));
                beat
            }
            Err(e) => {
                tracing::warn!(session_id = %session.id(), error = %e, "Story start failed, using fallback");
                degradations.push(Degradation::Narration);
                opening_fallback(&theme)
            }
        };

        session.begin(character, language, transcript);
        session.set_last_story_text(beat.story_text.clone());

        tracing::info!(
            session_id = %session.id(),
            theme = %theme,
            version = session.version(),
            "Story started"
        );

        let directive = blend(&beat.emotion_label(), session.ambient().label());
        Narrated {
            session,
            story_text: beat.story_text,
            visual_keywords: beat.visual_keywords,
            directive,
            audio: None,
            degradations,
        }
    }

    async fn proceed(
        &self,
        choice: PlayerChoice,
        ambient: EmotionLabel,
        mut session: Session,
    ) -> Narrated {
        let mut degradations = Vec::new();

        match session.window_transcript(&self.window) {
            WindowOutcome::Fallback { dropped } => tracing::warn!(
                session_id = %session.id(),
                dropped,
                "Transcript does not start with a system instruction, kept head and recent tail"
            ),
            WindowOutcome::Trimmed { dropped } => {
                tracing::debug!(session_id = %session.id(), dropped, "Trimmed transcript")
            }
            WindowOutcome::Untouched => {}
        }

        let instruction = prompts::continue_instruction(&choice, &ambient);
        let prior = session.last_story_text().to_string();

        let (generated, scored) = join(
            self.narrative
                .generate(session.transcript().to_vec(), instruction.clone()),
            self.moral.score(choice.as_str(), &prior),
        )
        .await;

        session.push_message(TranscriptMessage::user(instruction));
        let beat = match generated {
            Ok(beat) => {
                session.push_message(assistant_message(&beat));
                beat
            }
            Err(e) => {
                tracing::warn!(session_id = %session.id(), error = %e, "Story continuation failed, using fallback");
                degradations.push(Degradation::Narration);
                continue_fallback()
            }
        };

        match scored {
            Ok(score) => {
                let outcome = MoralReview::apply(&mut session, &score);
                tracing::debug!(
                    session_id = %session.id(),
                    scores = %outcome.scores,
                    new_traits = outcome.new_traits.len(),
                    "Applied moral score"
                );
            }
            Err(e) => {
                tracing::warn!(session_id = %session.id(), error = %e, "Scoring failed, ledger unchanged");
                degradations.push(Degradation::Scoring);
            }
        }

        session.set_last_story_text(beat.story_text.clone());
        let mut story_text = beat.story_text.clone();

        if prompts::ends_with_terminal_marker(&beat.story_text) && session.end() {
            let scores = session.moral_ledger().scores();
            match self.moral.reflect(scores).await {
                Ok(reflection) => {
                    story_text = format!("{story_text}\n\n{}", reflection.trim());
                }
                Err(e) => {
                    tracing::warn!(session_id = %session.id(), error = %e, "Reflection failed");
                    degradations.push(Degradation::Reflection);
                }
            }
            tracing::info!(session_id = %session.id(), scores = %scores, "Story ended");
        }

        let directive = blend(&beat.emotion_label(), &ambient);
        Narrated {
            session,
            story_text,
            visual_keywords: beat.visual_keywords,
            directive,
            audio: None,
            degradations,
        }
    }

    // =========================================================================
    // Media stages
    // =========================================================================

    async fn voice(&self, narrated: &mut Narrated) {
        let voice_id = narrated
            .session
            .character()
            .map(|c| c.voice_id().to_string())
            .unwrap_or_default();

        match self.media.narrate(&narrated.story_text, &voice_id).await {
            Ok(path) => narrated.audio = Some(path),
            Err(e) => {
                tracing::warn!(session_id = %narrated.session.id(), error = %e, "Audio generation failed");
                narrated.degradations.push(Degradation::Audio);
            }
        }
    }

    async fn illustrate(&self, narrated: &mut Narrated) -> Option<PathBuf> {
        let Some(character) = narrated.session.character() else {
            narrated.degradations.push(Degradation::Image);
            return None;
        };

        let brief = IllustrationBrief {
            story_text: narrated.story_text.clone(),
            emotion: narrated.directive.clone(),
            visual_keywords: narrated.visual_keywords.clone(),
            character_description: character.visual_description(),
            seed: character.visual_seed(),
        };

        match self.media.illustrate(brief).await {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(session_id = %narrated.session.id(), error = %e, "Image generation failed");
                narrated.degradations.push(Degradation::Image);
                None
            }
        }
    }
}

fn single(snapshot: TurnSnapshot) -> TurnStream {
    stream::iter([snapshot]).boxed()
}

/// The assistant turn as the model should see it on the next request.
fn assistant_message(beat: &StoryBeat) -> TranscriptMessage {
    let content = serde_json::to_string(beat).unwrap_or_else(|_| beat.story_text.clone());
    TranscriptMessage::assistant(content)
}

pub fn opening_fallback(theme: &Theme) -> StoryBeat {
    StoryBeat {
        story_text: format!(
            "The story begins with {theme}. (Error generating full story)"
        ),
        emotion: "mystery".to_string(),
        visual_keywords: "foggy, ancient, mysterious".to_string(),
    }
}

pub fn continue_fallback() -> StoryBeat {
    StoryBeat {
        story_text: "The story continues... (Error generating segment)".to_string(),
        emotion: "neutral".to_string(),
        visual_keywords: "standard scene".to_string(),
    }
}
