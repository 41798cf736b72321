//! Moral alignment ledger
//!
//! Three independent counters (compassion, courage, greed) that the alignment
//! scorer nudges after every player choice. Each counter saturates at
//! `[MORAL_SCORE_MIN, MORAL_SCORE_MAX]`, and crossing `TRAIT_THRESHOLD` in
//! either direction produces a trait signal for the protagonist.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lowest value any axis can hold.
pub const MORAL_SCORE_MIN: i32 = -10;

/// Highest value any axis can hold.
pub const MORAL_SCORE_MAX: i32 = 10;

/// Absolute score at which an axis starts emitting a trait signal.
pub const TRAIT_THRESHOLD: i32 = 5;

/// One axis of the alignment ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoralAxis {
    Compassion,
    Courage,
    Greed,
}

impl MoralAxis {
    /// All axes in ledger order.
    pub fn all() -> &'static [MoralAxis] {
        &[MoralAxis::Compassion, MoralAxis::Courage, MoralAxis::Greed]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoralAxis::Compassion => "compassion",
            MoralAxis::Courage => "courage",
            MoralAxis::Greed => "greed",
        }
    }

    /// Trait earned when the axis reaches `+TRAIT_THRESHOLD`.
    pub fn high_trait(&self) -> TraitSignal {
        match self {
            MoralAxis::Compassion => TraitSignal::Kind,
            MoralAxis::Courage => TraitSignal::Brave,
            MoralAxis::Greed => TraitSignal::Ambitious,
        }
    }

    /// Trait earned when the axis reaches `-TRAIT_THRESHOLD`.
    pub fn low_trait(&self) -> TraitSignal {
        match self {
            MoralAxis::Compassion => TraitSignal::Ruthless,
            MoralAxis::Courage => TraitSignal::Cowardly,
            MoralAxis::Greed => TraitSignal::Generous,
        }
    }
}

impl fmt::Display for MoralAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MoralAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compassion" => Ok(MoralAxis::Compassion),
            "courage" => Ok(MoralAxis::Courage),
            "greed" => Ok(MoralAxis::Greed),
            _ => Err(format!("Unknown moral axis: {}", s)),
        }
    }
}

/// Character trait label derived from a saturated-enough axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraitSignal {
    Kind,
    Ruthless,
    Brave,
    Cowardly,
    Ambitious,
    Generous,
}

impl TraitSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraitSignal::Kind => "Kind",
            TraitSignal::Ruthless => "Ruthless",
            TraitSignal::Brave => "Brave",
            TraitSignal::Cowardly => "Cowardly",
            TraitSignal::Ambitious => "Ambitious",
            TraitSignal::Generous => "Generous",
        }
    }
}

impl fmt::Display for TraitSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of all three axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoralScores {
    pub compassion: i32,
    pub courage: i32,
    pub greed: i32,
}

impl MoralScores {
    pub fn get(&self, axis: MoralAxis) -> i32 {
        match axis {
            MoralAxis::Compassion => self.compassion,
            MoralAxis::Courage => self.courage,
            MoralAxis::Greed => self.greed,
        }
    }

    fn slot_mut(&mut self, axis: MoralAxis) -> &mut i32 {
        match axis {
            MoralAxis::Compassion => &mut self.compassion,
            MoralAxis::Courage => &mut self.courage,
            MoralAxis::Greed => &mut self.greed,
        }
    }

    /// Compact one-line rendering, e.g. `compassion 3 | courage -1 | greed 0`.
    pub fn summary(&self) -> String {
        MoralAxis::all()
            .iter()
            .map(|axis| format!("{} {}", axis, self.get(*axis)))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl fmt::Display for MoralScores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

/// Bounded alignment counters for one play-through.
///
/// # Invariants
///
/// - Every axis lies in `[MORAL_SCORE_MIN, MORAL_SCORE_MAX]` after any update
/// - Overflowing updates saturate at the bound
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoralLedger {
    scores: MoralScores,
}

impl MoralLedger {
    /// A ledger with every axis at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scores(&self) -> MoralScores {
        self.scores
    }

    /// Zero every axis (new play-through).
    pub fn reset(&mut self) {
        self.scores = MoralScores::default();
    }

    /// Add one delta to one axis, clamping the result.
    pub fn apply(&mut self, axis: MoralAxis, delta: i32) -> i32 {
        let slot = self.scores.slot_mut(axis);
        *slot = slot.saturating_add(delta).clamp(MORAL_SCORE_MIN, MORAL_SCORE_MAX);
        *slot
    }

    /// Apply a keyed delta map and return the post-clamp scores.
    ///
    /// Keys are matched case-insensitively against the axis names; unknown
    /// keys are ignored and missing axes receive a zero delta.
    pub fn apply_deltas(&mut self, deltas: &BTreeMap<String, i32>) -> MoralScores {
        for (key, delta) in deltas {
            if let Ok(axis) = key.parse::<MoralAxis>() {
                self.apply(axis, *delta);
            }
        }
        self.scores
    }
}

/// Trait signals implied by the given scores, in axis order.
pub fn derive_trait_signals(scores: &MoralScores) -> Vec<TraitSignal> {
    MoralAxis::all()
        .iter()
        .filter_map(|axis| {
            let value = scores.get(*axis);
            if value >= TRAIT_THRESHOLD {
                Some(axis.high_trait())
            } else if value <= -TRAIT_THRESHOLD {
                Some(axis.low_trait())
            } else {
                None
            }
        })
        .collect()
}
