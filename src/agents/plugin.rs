//! Agent plugin - registers archetype loading, spawning and the agent tick.

use bevy::prelude::*;

use super::data::{load_archetypes, AgentDataPath, ArchetypeRegistry};
use super::events::{AgentCollision, AgentStateChanged, AnimationEvent, LootDropped};
use super::pool::AgentPool;
use super::spawning::{spawn_agents, ArenaLayout, SharedTarget, SpawnAgent};
use super::systems;
use crate::core::AgentSet;

/// Agent plugin - handles archetypes, spawning, pooling and per-frame AI.
pub struct AgentPlugin;

impl Plugin for AgentPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ArchetypeRegistry>()
            .init_resource::<AgentDataPath>()
            .init_resource::<AgentPool>()
            .init_resource::<SharedTarget>()
            .init_resource::<ArenaLayout>()
            .add_event::<SpawnAgent>()
            .add_event::<AgentStateChanged>()
            .add_event::<LootDropped>()
            .add_event::<AnimationEvent>()
            .add_event::<AgentCollision>()
            .add_systems(Startup, load_archetypes)
            .add_systems(Update, systems::publish_target.in_set(AgentSet::Sense))
            .add_systems(
                Update,
                (systems::forward_collisions, systems::tick_agents)
                    .chain()
                    .in_set(AgentSet::Think),
            )
            // Spawning after despawning lets a corpse parked this frame be
            // reused by a request from the same frame.
            .add_systems(
                Update,
                (systems::despawn_agents, spawn_agents)
                    .chain()
                    .in_set(AgentSet::Cleanup),
            );
    }
}
