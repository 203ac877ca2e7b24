//! Random level selection

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Level could not be presented; the current scene stays up
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error("level {0} not found")]
    Missing(u32),
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::new(self.seed, self.stream)
    }
}

/// Uniform pick over `1..=num_levels`, seeded for replays
#[derive(Debug, Clone)]
pub struct LevelPicker {
    pub rng_state: RngState,
    rng: Pcg32,
    pub num_levels: u32,
}

impl LevelPicker {
    pub fn new(seed: u64, num_levels: u32) -> Self {
        let rng_state = RngState::new(seed);
        Self {
            rng: rng_state.to_rng(),
            rng_state,
            num_levels,
        }
    }

    /// Next level number, `None` if there are no levels
    pub fn pick(&mut self) -> Option<u32> {
        if self.num_levels == 0 {
            return None;
        }
        Some(self.rng.random_range(1..=self.num_levels))
    }
}

/// Seed helper for callers without their own
pub fn seed_from_entropy() -> u64 {
    Pcg32::from_os_rng().random()
}
