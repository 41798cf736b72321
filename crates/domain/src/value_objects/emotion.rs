//! Emotion labels, blending and the ambient throttle
//!
//! Two signals compete for the rendering directive of a turn:
//! - the emotion the narrative declares for the scene
//! - the ambient emotion read from the player's face, sampled at most once per
//!   interval
//!
//! The story wins unless it declares exactly `neutral`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used when nothing more specific is known.
pub const NEUTRAL: &str = "neutral";

/// Default minimum spacing between accepted live samples.
pub const DEFAULT_SAMPLE_INTERVAL_MS: i64 = 1000;

/// A normalized emotion label (trimmed, lowercase, never empty).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct EmotionLabel(String);

impl EmotionLabel {
    /// Normalize a raw label. Blank input becomes `neutral`.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let normalized = raw.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            Self::neutral()
        } else {
            Self(normalized)
        }
    }

    pub fn neutral() -> Self {
        Self(NEUTRAL.to_string())
    }

    pub fn is_neutral(&self) -> bool {
        self.0 == NEUTRAL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EmotionLabel {
    fn default() -> Self {
        Self::neutral()
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EmotionLabel {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for EmotionLabel {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<EmotionLabel> for String {
    fn from(label: EmotionLabel) -> String {
        label.0
    }
}

/// Pick the rendering directive for a turn.
///
/// Literal precedence: the story's label is used unless it is `neutral`, in
/// which case the ambient label is used.
pub fn blend(story: &EmotionLabel, ambient: &EmotionLabel) -> EmotionLabel {
    if story.is_neutral() {
        ambient.clone()
    } else {
        story.clone()
    }
}

/// The session's ambient-emotion slot plus its throttle timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbientEmotion {
    label: EmotionLabel,
    last_sample_at: Option<DateTime<Utc>>,
}

impl AmbientEmotion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(&self) -> &EmotionLabel {
        &self.label
    }

    pub fn last_sample_at(&self) -> Option<DateTime<Utc>> {
        self.last_sample_at
    }

    /// Whether a sample taken at `at` would pass the throttle.
    pub fn is_due(&self, at: DateTime<Utc>, interval: Duration) -> bool {
        match self.last_sample_at {
            None => true,
            Some(last) => at - last >= interval,
        }
    }

    /// Offer a live sample. Returns `true` if it replaced the slot.
    ///
    /// Samples arriving inside the interval are dropped and leave both the
    /// label and the timestamp untouched.
    pub fn accept(&mut self, label: EmotionLabel, at: DateTime<Utc>, interval: Duration) -> bool {
        if !self.is_due(at, interval) {
            return false;
        }
        self.label = label;
        self.last_sample_at = Some(at);
        true
    }

    /// Keep whichever of two slots holds the more recent sample.
    pub fn newest(self, other: AmbientEmotion) -> AmbientEmotion {
        match (self.last_sample_at, other.last_sample_at) {
            (Some(mine), Some(theirs)) if theirs > mine => other,
            (None, Some(_)) => other,
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn interval() -> Duration {
        Duration::milliseconds(DEFAULT_SAMPLE_INTERVAL_MS)
    }

    #[test]
    fn labels_are_normalized() {
        assert_eq!(EmotionLabel::new("  Joy ").as_str(), "joy");
        assert!(EmotionLabel::new("   ").is_neutral());
        assert!(EmotionLabel::new("NEUTRAL").is_neutral());
    }

    #[test]
    fn story_emotion_wins_when_not_neutral() {
        let blended = blend(&"joy".into(), &"sad".into());
        assert_eq!(blended.as_str(), "joy");
    }

    #[test]
    fn neutral_story_defers_to_ambient() {
        let blended = blend(&"neutral".into(), &"sad".into());
        assert_eq!(blended.as_str(), "sad");
    }

    #[test]
    fn neutral_story_without_samples_stays_neutral() {
        let ambient = AmbientEmotion::new();
        let blended = blend(&EmotionLabel::neutral(), ambient.label());
        assert!(blended.is_neutral());
    }

    #[test]
    fn samples_closer_than_interval_are_dropped() {
        let mut ambient = AmbientEmotion::new();
        assert!(ambient.accept("happy".into(), t0(), interval()));
        assert!(!ambient.accept("sad".into(), t0() + Duration::milliseconds(400), interval()));
        assert_eq!(ambient.label().as_str(), "happy");
        assert_eq!(ambient.last_sample_at(), Some(t0()));
    }

    #[test]
    fn samples_past_interval_are_accepted() {
        let mut ambient = AmbientEmotion::new();
        assert!(ambient.accept("happy".into(), t0(), interval()));
        let later = t0() + Duration::milliseconds(1200);
        assert!(ambient.accept("sad".into(), later, interval()));
        assert_eq!(ambient.label().as_str(), "sad");
        assert_eq!(ambient.last_sample_at(), Some(later));
    }

    #[test]
    fn newest_prefers_later_sample() {
        let mut older = AmbientEmotion::new();
        older.accept("fear".into(), t0(), interval());
        let mut newer = AmbientEmotion::new();
        newer.accept("happy".into(), t0() + Duration::seconds(5), interval());

        assert_eq!(older.clone().newest(newer.clone()).label().as_str(), "happy");
        assert_eq!(newer.newest(older).label().as_str(), "happy");
    }

    #[test]
    fn serde_round_trip_normalizes() {
        let label: EmotionLabel = serde_json::from_str("\" Mystery\"").unwrap();
        assert_eq!(label.as_str(), "mystery");
    }
}
