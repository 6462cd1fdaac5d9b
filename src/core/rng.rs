//! Seeded randomness for the simulation.

use bevy::prelude::*;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic RNG resource. Every spawned agent draws its own seed
/// from here, so a run is reproducible from a single number.
#[derive(Resource)]
pub struct SimulationRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl SimulationRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed for a freshly spawned agent.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.next_u64()
    }
}

impl Default for SimulationRng {
    fn default() -> Self {
        Self::new(42)
    }
}
