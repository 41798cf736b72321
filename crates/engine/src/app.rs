//! Application state and composition.

use std::sync::Arc;

use storyteller_domain::HistoryWindow;

use crate::config::EngineConfig;
use crate::infrastructure::{
    clock::{SystemClock, SystemRandom},
    ports::{
        AlignmentScorer, ArtifactStore, ClockPort, GroundingRetriever, IdentityGenerator,
        ImageGenPort, LlmPort, NarrativeGenerator, PromptStylist, RandomPort, SpeechPort,
        VisionClassifier,
    },
    storyteller::{
        LlmAlignmentScorer, LlmGroundingRetriever, LlmIdentityGenerator, LlmNarrativeGenerator,
        LlmPromptStylist,
    },
    vision::BlendshapeClassifier,
};
use crate::stores::SessionStore;
use crate::use_cases;
use crate::use_cases::story::{CharacterRegister, MediaPipeline, MoralReview, TurnOrchestrator};

/// Main application state.
///
/// Holds the session store and all use cases.
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
    pub sessions: Arc<SessionStore>,
}

/// Container for all use cases.
pub struct UseCases {
    pub story: use_cases::StoryUseCases,
    pub emotion: use_cases::EmotionUseCases,
}

impl App {
    /// Create a new App with all dependencies wired up.
    ///
    /// Every story collaborator is built over the one `llm` port.
    pub fn new(
        llm: Arc<dyn LlmPort>,
        image_gen: Arc<dyn ImageGenPort>,
        speech: Arc<dyn SpeechPort>,
        artifacts: Arc<dyn ArtifactStore>,
        config: &EngineConfig,
    ) -> Self {
        let clock_port: Arc<dyn ClockPort> = Arc::new(SystemClock);
        let random_port: Arc<dyn RandomPort> = Arc::new(SystemRandom);

        // LLM-backed collaborators
        let narrative: Arc<dyn NarrativeGenerator> =
            Arc::new(LlmNarrativeGenerator::new(llm.clone()));
        let grounding: Arc<dyn GroundingRetriever> =
            Arc::new(LlmGroundingRetriever::new(llm.clone()));
        let identity: Arc<dyn IdentityGenerator> =
            Arc::new(LlmIdentityGenerator::new(llm.clone()));
        let scorer: Arc<dyn AlignmentScorer> = Arc::new(LlmAlignmentScorer::new(llm.clone()));
        let stylist: Arc<dyn PromptStylist> = Arc::new(LlmPromptStylist::new(llm));
        let classifier: Arc<dyn VisionClassifier> = Arc::new(BlendshapeClassifier);

        let turns = Arc::new(TurnOrchestrator::new(
            narrative,
            grounding,
            Arc::new(CharacterRegister::new(identity, random_port)),
            Arc::new(MoralReview::new(scorer)),
            Arc::new(MediaPipeline::new(
                speech,
                image_gen,
                stylist,
                artifacts,
            )),
            HistoryWindow::new(config.max_history_messages),
        ));

        let feed = Arc::new(use_cases::emotion::LiveEmotionFeed::new(
            classifier,
            clock_port,
            config.emotion_sample_interval,
        ));

        let use_cases = UseCases {
            story: use_cases::StoryUseCases::new(turns),
            emotion: use_cases::EmotionUseCases::new(feed),
        };

        Self {
            use_cases,
            sessions: Arc::new(SessionStore::new()),
        }
    }
}
