//! Agent Combat - a combat-agent state machine framework on Bevy's ECS.
//!
//! Agents are finite-state machines (Idle, Hostile, Searching, Dead) that
//! compose pluggable anger triggers and combat actions, driven once per
//! frame by a frame delta.
//!
//! # Architecture
//!
//! The crate is organized into modules, each handling a specific aspect:
//!
//! - **Core**: Countdowns, global events, the seeded RNG, system ordering
//! - **Providers**: Movement, perception and animation interfaces
//! - **Triggers**: Conditions that turn a calm agent hostile
//! - **Actions**: Multi-phase attacks and maneuvers
//! - **Combat**: Hitboxes, projectiles, health, loot and damage
//! - **Agents**: The state machine, archetype data, spawning and pooling

pub mod actions;
pub mod agents;
pub mod combat;
pub mod core;
pub mod error;
pub mod providers;
pub mod triggers;

use bevy::prelude::*;

/// Main plugin that adds all sub-plugins.
pub struct AgentCombatPlugin;

impl Plugin for AgentCombatPlugin {
    fn build(&self, app: &mut App) {
        app
            // Core systems (must be first)
            .add_plugins(core::CorePlugin)

            // Hitboxes, projectiles and damage
            .add_plugins(combat::CombatPlugin)

            // Agent systems
            .add_plugins(agents::AgentPlugin);
    }
}
