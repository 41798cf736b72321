//! In-memory session storage.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use storyteller_domain::{AmbientEmotion, Session, SessionId};

/// Live play-through sessions keyed by id.
///
/// Turns work on a copy of the session and `commit` it as they progress.
/// A copy the stored session already supersedes is dropped, so a slow turn
/// from before a restart cannot overwrite the new play-through. The emotion
/// feed writes only the ambient slot, directly in the map, so a commit keeps
/// whichever ambient sample is newer.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<SessionId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and remember an empty session.
    pub fn create(&self) -> Session {
        let session = Session::new();
        self.sessions.insert(session.id(), session.clone());
        session
    }

    pub fn get(&self, id: SessionId) -> Option<Session> {
        self.sessions.get(&id).map(|entry| entry.clone())
    }

    /// The stored session, or a fresh unsaved one carrying `id`.
    pub fn get_or_new(&self, id: SessionId) -> Session {
        self.get(id).unwrap_or_else(|| Session::with_id(id))
    }

    /// Store the result of a turn. Returns `false` if the stored session is
    /// newer and the commit was skipped.
    pub fn commit(&self, mut session: Session) -> bool {
        let (id, playthrough, version) = (session.id(), session.playthrough(), session.version());

        match self.sessions.entry(id) {
            Entry::Occupied(mut entry) => {
                if entry.get().supersedes(&session) {
                    tracing::debug!(
                        session_id = %id,
                        playthrough,
                        version,
                        stored_playthrough = entry.get().playthrough(),
                        stored_version = entry.get().version(),
                        "Skipped stale session commit"
                    );
                    return false;
                }
                session.merge_ambient(entry.get().ambient().clone());
                entry.insert(session);
            }
            Entry::Vacant(entry) => {
                entry.insert(session);
            }
        }

        tracing::debug!(session_id = %id, playthrough, version, "Committed session");
        true
    }

    pub fn remove(&self, id: SessionId) -> Option<Session> {
        self.sessions.remove(&id).map(|(_, session)| session)
    }

    /// Run `update` against a session's ambient slot.
    ///
    /// Returns the closure's result and the slot as stored afterwards, or
    /// `None` for an unknown session.
    pub fn update_ambient<R>(
        &self,
        id: SessionId,
        update: impl FnOnce(&mut AmbientEmotion) -> R,
    ) -> Option<(R, AmbientEmotion)> {
        let mut entry = self.sessions.get_mut(&id)?;
        let mut ambient = entry.ambient().clone();
        let result = update(&mut ambient);
        entry.merge_ambient(ambient);
        Some((result, entry.ambient().clone()))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use storyteller_domain::{Character, EmotionLabel, NarrationLanguage, TranscriptMessage};

    fn interval() -> Duration {
        Duration::milliseconds(1000)
    }

    #[test]
    fn create_get_remove() {
        let store = SessionStore::new();
        let session = store.create();

        assert_eq!(store.get(session.id()), Some(session.clone()));
        assert_eq!(store.len(), 1);
        assert!(store.remove(session.id()).is_some());
        assert!(store.get(session.id()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn unknown_ids_get_a_fresh_session() {
        let store = SessionStore::new();
        let id = SessionId::new();

        let session = store.get_or_new(id);

        assert_eq!(session.id(), id);
        assert!(!session.is_playable());
        assert!(store.is_empty());
    }

    #[test]
    fn ambient_updates_survive_a_turn_commit() {
        let store = SessionStore::new();
        let mut turn_copy = store.create();
        let id = turn_copy.id();

        // The feed records a sample while the turn is running.
        let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let (accepted, ambient) = store
            .update_ambient(id, |ambient| {
                ambient.accept(EmotionLabel::new("fear"), at, interval())
            })
            .unwrap();
        assert!(accepted);
        assert_eq!(ambient.label().as_str(), "fear");

        turn_copy.begin(
            Character::new("Kenji", "Japanese Folklore", 48213),
            NarrationLanguage::default(),
            vec![TranscriptMessage::system("instruction")],
        );
        store.commit(turn_copy);

        let stored = store.get(id).unwrap();
        assert!(stored.is_playable());
        assert_eq!(stored.ambient().label().as_str(), "fear");
    }

    fn begin(session: &mut Session, name: &str) {
        session.begin(
            Character::new(name, "Japanese Folklore", 48213),
            NarrationLanguage::default(),
            vec![TranscriptMessage::system("instruction")],
        );
    }

    #[test]
    fn slow_turn_from_before_a_restart_is_dropped() {
        let store = SessionStore::new();
        let mut old = store.create();
        let id = old.id();
        begin(&mut old, "Old");
        assert!(store.commit(old));

        // A continuation takes its copy and is still producing media...
        let mut in_flight = store.get(id).unwrap();
        in_flight.push_message(TranscriptMessage::user("1"));
        in_flight.set_last_story_text("The bridge sways.");

        // ...when the player starts over.
        let mut restarted = store.get(id).unwrap();
        begin(&mut restarted, "New");
        assert!(store.commit(restarted));

        assert!(!store.commit(in_flight));
        let stored = store.get(id).unwrap();
        assert_eq!(stored.character().map(|c| c.name()), Some("New"));
        assert_eq!(stored.playthrough(), 2);
    }

    #[test]
    fn later_snapshots_of_one_turn_replace_earlier_ones() {
        let store = SessionStore::new();
        let mut turn_copy = store.create();
        let id = turn_copy.id();
        begin(&mut turn_copy, "Kenji");

        assert!(store.commit(turn_copy.clone()));
        // Media stages hand back the same session value.
        assert!(store.commit(turn_copy.clone()));

        turn_copy.set_last_story_text("You enter the shrine.");
        assert!(store.commit(turn_copy));
        assert_eq!(store.get(id).unwrap().last_story_text(), "You enter the shrine.");
    }

    #[test]
    fn ambient_update_on_unknown_session_is_none() {
        let store = SessionStore::new();
        assert!(store
            .update_ambient(SessionId::new(), |ambient| ambient.label().clone())
            .is_none());
    }
}
