//! Session aggregate - one player's play-through
//!
//! A session is a plain value owned by the caller. Every turn takes it by
//! value and hands back the updated copy, so there is no hidden aliasing
//! between turns. `version` increases on every committed mutation and
//! `playthrough` on every `begin`, so two copies of one session can be
//! ordered with `supersedes`.
//!
//! # Phases
//!
//! ```text
//! Uninitialized --begin--> Active --(turns)--> Active --end--> Ended
//!        ^                    |                                  |
//!        +-------- begin restarts from any phase ----------------+
//! ```

use serde::{Deserialize, Serialize};

use crate::aggregates::Character;
use crate::error::DomainError;
use crate::value_objects::{
    AmbientEmotion, HistoryWindow, MoralLedger, NarrationLanguage, TranscriptMessage,
    WindowOutcome,
};
use crate::SessionId;

/// Lifecycle phase of a play-through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Uninitialized,
    Active,
    Ended,
}

/// One user's play-through state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    version: u64,
    #[serde(default)]
    playthrough: u64,
    phase: SessionPhase,
    transcript: Vec<TranscriptMessage>,
    character: Option<Character>,
    moral_ledger: MoralLedger,
    ambient: AmbientEmotion,
    language: NarrationLanguage,
    last_story_text: String,
    reflection_delivered: bool,
}

impl Session {
    /// A fresh, uninitialized session.
    pub fn new() -> Self {
        Self::with_id(SessionId::new())
    }

    pub fn with_id(id: SessionId) -> Self {
        Self {
            id,
            version: 0,
            playthrough: 0,
            phase: SessionPhase::Uninitialized,
            transcript: Vec::new(),
            character: None,
            moral_ledger: MoralLedger::new(),
            ambient: AmbientEmotion::new(),
            language: NarrationLanguage::default(),
            last_story_text: String::new(),
            reflection_delivered: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// How many times `begin` has run on this session.
    pub fn playthrough(&self) -> u64 {
        self.playthrough
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn transcript(&self) -> &[TranscriptMessage] {
        &self.transcript
    }

    pub fn character(&self) -> Option<&Character> {
        self.character.as_ref()
    }

    pub fn moral_ledger(&self) -> &MoralLedger {
        &self.moral_ledger
    }

    pub fn ambient(&self) -> &AmbientEmotion {
        &self.ambient
    }

    pub fn language(&self) -> &NarrationLanguage {
        &self.language
    }

    /// The narration the player is currently reacting to.
    pub fn last_story_text(&self) -> &str {
        &self.last_story_text
    }

    pub fn reflection_delivered(&self) -> bool {
        self.reflection_delivered
    }

    /// Whether this copy is strictly newer than `other`: a later play-through,
    /// or further along the same one.
    pub fn supersedes(&self, other: &Session) -> bool {
        (self.playthrough, self.version) > (other.playthrough, other.version)
    }

    /// A session can be continued once `begin` has run.
    pub fn is_playable(&self) -> bool {
        self.phase != SessionPhase::Uninitialized && self.character.is_some()
    }

    /// Guard for continuation turns.
    ///
    /// # Errors
    ///
    /// `DomainError::InvalidStateTransition` if the session was never started.
    pub fn ensure_playable(&self) -> Result<&Character, DomainError> {
        match (&self.phase, &self.character) {
            (SessionPhase::Uninitialized, _) | (_, None) => Err(
                DomainError::invalid_state_transition(format!(
                    "session {} has not been started",
                    self.id
                )),
            ),
            (_, Some(character)) => Ok(character),
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Start (or restart) a play-through.
    ///
    /// Installs the character, zeroes the ledger, replaces the transcript and
    /// clears any earlier ending. The ambient slot is kept.
    pub fn begin(
        &mut self,
        character: Character,
        language: NarrationLanguage,
        transcript: Vec<TranscriptMessage>,
    ) {
        self.character = Some(character);
        self.moral_ledger.reset();
        self.language = language;
        self.transcript = transcript;
        self.last_story_text.clear();
        self.reflection_delivered = false;
        self.phase = SessionPhase::Active;
        self.playthrough = self.playthrough.wrapping_add(1);
        self.bump();
    }

    /// Apply the history window to the transcript.
    pub fn window_transcript(&mut self, window: &HistoryWindow) -> WindowOutcome {
        let outcome = window.apply(&mut self.transcript);
        if outcome != WindowOutcome::Untouched {
            self.bump();
        }
        outcome
    }

    pub fn push_message(&mut self, message: TranscriptMessage) {
        self.transcript.push(message);
        self.bump();
    }

    /// Remember the narration the player will react to next.
    pub fn set_last_story_text(&mut self, text: impl Into<String>) {
        self.last_story_text = text.into();
        self.bump();
    }

    pub fn moral_ledger_mut(&mut self) -> &mut MoralLedger {
        self.bump();
        &mut self.moral_ledger
    }

    pub fn character_mut(&mut self) -> Option<&mut Character> {
        self.bump();
        self.character.as_mut()
    }

    pub fn ambient_mut(&mut self) -> &mut AmbientEmotion {
        self.bump();
        &mut self.ambient
    }

    /// Replace the ambient slot with `other` if `other` is newer.
    pub fn merge_ambient(&mut self, other: AmbientEmotion) {
        let current = std::mem::take(&mut self.ambient);
        self.ambient = current.newest(other);
    }

    /// Mark the story finished. Returns `true` the first time only, which is
    /// when the closing reflection should be produced.
    pub fn end(&mut self) -> bool {
        self.phase = SessionPhase::Ended;
        self.bump();
        if self.reflection_delivered {
            return false;
        }
        self.reflection_delivered = true;
        true
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::MoralAxis;

    fn started() -> Session {
        let mut session = Session::new();
        session.begin(
            Character::new("Kenji", "Japanese Folklore", 12345),
            NarrationLanguage::default(),
            vec![TranscriptMessage::system("instruction")],
        );
        session
    }

    #[test]
    fn new_session_is_not_playable() {
        let session = Session::new();
        assert_eq!(session.phase(), SessionPhase::Uninitialized);
        assert!(!session.is_playable());
        assert!(matches!(
            session.ensure_playable(),
            Err(DomainError::InvalidStateTransition(_))
        ));
    }

    #[test]
    fn begin_activates_and_resets_ledger() {
        let mut session = started();
        session.moral_ledger_mut().apply(MoralAxis::Courage, 4);

        session.begin(
            Character::new("Asha", "Indian Epic", 777),
            NarrationLanguage::new("Hindi"),
            vec![TranscriptMessage::system("again")],
        );

        assert_eq!(session.phase(), SessionPhase::Active);
        assert_eq!(session.moral_ledger().scores().courage, 0);
        assert_eq!(session.character().map(|c| c.name()), Some("Asha"));
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.language().as_str(), "Hindi");
    }

    #[test]
    fn mutations_bump_version() {
        let mut session = started();
        let before = session.version();
        session.push_message(TranscriptMessage::user("1"));
        assert!(session.version() > before);
    }

    #[test]
    fn restarted_copy_supersedes_a_longer_old_play_through() {
        let base = started();

        let mut in_flight = base.clone();
        for choice in ["1", "2", "3", "4"] {
            in_flight.push_message(TranscriptMessage::user(choice));
        }

        let mut restarted = base.clone();
        restarted.begin(
            Character::new("Asha", "Indian Epic", 777),
            NarrationLanguage::default(),
            vec![TranscriptMessage::system("again")],
        );

        assert!(in_flight.version() > restarted.version());
        assert_eq!(restarted.playthrough(), base.playthrough() + 1);
        assert!(restarted.supersedes(&in_flight));
        assert!(!in_flight.supersedes(&restarted));
        assert!(in_flight.supersedes(&base));
        assert!(!base.supersedes(&base));
    }

    #[test]
    fn end_reports_first_time_only() {
        let mut session = started();
        assert!(session.end());
        assert_eq!(session.phase(), SessionPhase::Ended);
        assert!(!session.end());
        assert!(session.is_playable());
    }

    #[test]
    fn restart_clears_ending() {
        let mut session = started();
        session.end();
        session.begin(
            Character::new("Kenji", "Japanese Folklore", 1),
            NarrationLanguage::default(),
            vec![TranscriptMessage::system("instruction")],
        );
        assert!(!session.reflection_delivered());
        assert_eq!(session.phase(), SessionPhase::Active);
    }

    #[test]
    fn session_round_trips_through_json() {
        let session = started();
        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }
}
