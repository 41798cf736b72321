//! Facial-expression heuristics over ARKit-style blendshape scores.
//!
//! The face-landmark model runs in the client; frames arrive here already
//! reduced to named blendshape scores in `0.0..=1.0`.

use storyteller_domain::EmotionLabel;

use crate::infrastructure::ports::{EmotionEstimate, FaceFrame, VisionClassifier};

/// Below this the strongest signal is treated as a resting face.
pub const SIGNAL_THRESHOLD: f32 = 0.3;

#[derive(Debug, Default, Clone, Copy)]
pub struct BlendshapeClassifier;

impl BlendshapeClassifier {
    fn mean(frame: &FaceFrame, names: &[&str]) -> f32 {
        let total: f32 = names.iter().map(|name| frame.score(name)).sum();
        total / names.len() as f32
    }

    /// Candidate scores in a fixed order; ties go to the earlier entry.
    fn scores(frame: &FaceFrame) -> [(&'static str, f32); 5] {
        [
            ("happy", Self::mean(frame, &["mouthSmileLeft", "mouthSmileRight"])),
            ("surprise", Self::mean(frame, &["browInnerUp", "jawOpen"])),
            ("angry", Self::mean(frame, &["browDownLeft", "browDownRight"])),
            (
                "sad",
                Self::mean(frame, &["mouthFrownLeft", "mouthFrownRight", "browInnerUp"]),
            ),
            (
                "fear",
                Self::mean(frame, &["eyeWideLeft", "eyeWideRight", "mouthStretchLeft"]),
            ),
        ]
    }
}

impl VisionClassifier for BlendshapeClassifier {
    fn classify(&self, frame: &FaceFrame) -> Option<EmotionEstimate> {
        if frame.blendshapes.is_empty() {
            return None;
        }

        let (label, best) = Self::scores(frame)
            .into_iter()
            .fold(("neutral", f32::MIN), |best, candidate| {
                if candidate.1 > best.1 {
                    candidate
                } else {
                    best
                }
            });

        if best < SIGNAL_THRESHOLD {
            return Some(EmotionEstimate {
                emotion: EmotionLabel::neutral(),
                confidence: 1.0 - best,
            });
        }

        Some(EmotionEstimate {
            emotion: EmotionLabel::new(label),
            confidence: best,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn frame(pairs: &[(&str, f32)]) -> FaceFrame {
        FaceFrame {
            blendshapes: pairs
                .iter()
                .map(|(name, score)| (name.to_string(), *score))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn empty_frame_has_no_signal() {
        assert!(BlendshapeClassifier.classify(&FaceFrame::default()).is_none());
    }

    #[test]
    fn smile_reads_as_happy() {
        let estimate = BlendshapeClassifier
            .classify(&frame(&[("mouthSmileLeft", 0.8), ("mouthSmileRight", 0.6)]))
            .unwrap();
        assert_eq!(estimate.emotion.as_str(), "happy");
        assert!((estimate.confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn lowered_brows_read_as_angry() {
        let estimate = BlendshapeClassifier
            .classify(&frame(&[("browDownLeft", 0.9), ("browDownRight", 0.7)]))
            .unwrap();
        assert_eq!(estimate.emotion.as_str(), "angry");
    }

    #[test]
    fn wide_eyes_read_as_fear() {
        let estimate = BlendshapeClassifier
            .classify(&frame(&[
                ("eyeWideLeft", 0.9),
                ("eyeWideRight", 0.9),
                ("mouthStretchLeft", 0.6),
            ]))
            .unwrap();
        assert_eq!(estimate.emotion.as_str(), "fear");
    }

    #[test]
    fn weak_signals_are_neutral_with_inverse_confidence() {
        let estimate = BlendshapeClassifier
            .classify(&frame(&[("mouthSmileLeft", 0.2), ("mouthSmileRight", 0.2)]))
            .unwrap();
        assert!(estimate.emotion.is_neutral());
        assert!((estimate.confidence - 0.8).abs() < 1e-6);
    }
}
