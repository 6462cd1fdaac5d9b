//! Events the agent layer publishes for the rest of the host.

use bevy::prelude::*;

use super::agent::AgentState;
use crate::combat::LootDrop;
use crate::providers::AnimationCommand;

/// An agent moved between states.
#[derive(Event, Debug, Clone)]
pub struct AgentStateChanged {
    pub entity: Entity,
    pub from: AgentState,
    pub to: AgentState,
}

/// A corpse settled and rolled its loot table.
#[derive(Event, Debug, Clone)]
pub struct LootDropped {
    pub entity: Entity,
    pub position: Vec3,
    pub drops: Vec<LootDrop>,
}

/// Animation parameter change for whatever plays the agent's animations.
#[derive(Event, Debug, Clone)]
pub struct AnimationEvent {
    pub entity: Entity,
    pub command: AnimationCommand,
}

/// Sent by the host's physics when an agent's body hits something.
#[derive(Event, Debug, Clone, Copy)]
pub struct AgentCollision {
    pub entity: Entity,
}
