//! Emotion use cases.
//!
//! The live feed turns camera frames into the session's ambient emotion.
//! Samples are throttled per session, so frames arriving faster than the
//! sampling interval are dropped before any classification work happens.

use std::sync::Arc;

use serde::Serialize;
use storyteller_domain::AmbientEmotion;

use crate::infrastructure::ports::{ClockPort, FaceFrame, VisionClassifier};

/// What happened to one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleOutcome {
    /// The ambient label and timestamp were updated.
    Accepted,
    /// Too soon after the previous accepted sample.
    Throttled,
    /// The classifier found nothing to report.
    NoSignal,
}

pub struct LiveEmotionFeed {
    classifier: Arc<dyn VisionClassifier>,
    clock: Arc<dyn ClockPort>,
    interval: chrono::Duration,
}

impl LiveEmotionFeed {
    pub fn new(
        classifier: Arc<dyn VisionClassifier>,
        clock: Arc<dyn ClockPort>,
        interval: chrono::Duration,
    ) -> Self {
        Self {
            classifier,
            clock,
            interval,
        }
    }

    pub fn interval(&self) -> chrono::Duration {
        self.interval
    }

    /// Offer one frame to the ambient slot.
    pub fn observe(&self, ambient: &mut AmbientEmotion, frame: &FaceFrame) -> SampleOutcome {
        let now = self.clock.now();
        if !ambient.is_due(now, self.interval) {
            return SampleOutcome::Throttled;
        }

        let Some(estimate) = self.classifier.classify(frame) else {
            return SampleOutcome::NoSignal;
        };

        if ambient.accept(estimate.emotion, now, self.interval) {
            tracing::trace!(
                emotion = %ambient.label(),
                confidence = estimate.confidence,
                "Accepted emotion sample"
            );
            SampleOutcome::Accepted
        } else {
            SampleOutcome::Throttled
        }
    }
}

/// Container for emotion use cases.
pub struct EmotionUseCases {
    pub feed: Arc<LiveEmotionFeed>,
}

impl EmotionUseCases {
    pub fn new(feed: Arc<LiveEmotionFeed>) -> Self {
        Self { feed }
    }
}
