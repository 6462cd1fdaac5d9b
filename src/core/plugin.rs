//! Core plugin that sets up global events, the seeded RNG and the
//! per-frame system ordering.

use bevy::prelude::*;

use super::events::*;
use super::rng::SimulationRng;

/// Ordering of the per-frame agent pipeline.
///
/// - `Sense`: publish the shared target state agents perceive
/// - `Think`: tick every agent's state machine
/// - `Effects`: advance hitboxes and projectiles spawned by actions
/// - `Damage`: apply queued damage, report deaths
/// - `Cleanup`: despawn, recycle and spawn agents
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum AgentSet {
    Sense,
    Think,
    Effects,
    Damage,
    Cleanup,
}

/// Core plugin - must be added first as other plugins depend on it.
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app
            // Keep an existing seed if the host inserted one before us
            .init_resource::<SimulationRng>()

            // Register global events
            .add_event::<DamageEvent>()
            .add_event::<DeathEvent>()

            .configure_sets(
                Update,
                (
                    AgentSet::Sense,
                    AgentSet::Think,
                    AgentSet::Effects,
                    AgentSet::Damage,
                    AgentSet::Cleanup,
                )
                    .chain(),
            );
    }
}
