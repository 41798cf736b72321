//! Time and randomness behind ports so turns and throttling are reproducible.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Lowest visual seed handed to a new character.
pub const VISUAL_SEED_MIN: u32 = 10_000;
/// Highest visual seed handed to a new character.
pub const VISUAL_SEED_MAX: u32 = 99_999;

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[cfg_attr(test, mockall::automock)]
pub trait RandomPort: Send + Sync {
    /// Uniform value in `min..=max`.
    fn gen_range(&self, min: u32, max: u32) -> u32;
    fn gen_uuid(&self) -> Uuid;
}
