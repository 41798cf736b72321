//! Production clock and randomness.

use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::infrastructure::ports::{ClockPort, RandomPort};

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Thread-local RNG and v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRandom;

impl RandomPort for SystemRandom {
    fn gen_range(&self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }

    fn gen_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{VISUAL_SEED_MAX, VISUAL_SEED_MIN};

    #[test]
    fn seeds_stay_in_range() {
        let random = SystemRandom;
        for _ in 0..200 {
            let seed = random.gen_range(VISUAL_SEED_MIN, VISUAL_SEED_MAX);
            assert!((VISUAL_SEED_MIN..=VISUAL_SEED_MAX).contains(&seed));
        }
    }

    #[test]
    fn degenerate_range_returns_min() {
        assert_eq!(SystemRandom.gen_range(7, 7), 7);
        assert_eq!(SystemRandom.gen_range(9, 3), 9);
    }

    #[test]
    fn uuids_are_unique() {
        assert_ne!(SystemRandom.gen_uuid(), SystemRandom.gen_uuid());
    }
}
