//! Global events used for cross-system communication.
//!
//! Hitboxes, projectiles and outside systems (a player's sword, a trap)
//! never touch an agent's health directly. They send a [`DamageEvent`],
//! and the damage system applies it through the agent's damage sink.

use bevy::prelude::*;

/// Sent when an entity takes damage.
#[derive(Event, Debug, Clone)]
pub struct DamageEvent {
    /// Entity receiving damage
    pub target: Entity,
    /// Entity that caused the damage (the hitbox or projectile owner)
    pub source: Option<Entity>,
    /// Damage amount; non-positive amounts are ignored
    pub amount: f32,
}

/// Sent when an entity dies (health reaches 0).
///
/// Sent once per death, by whichever system observed the transition.
#[derive(Event, Debug, Clone)]
pub struct DeathEvent {
    /// Entity that died
    pub entity: Entity,
    /// Entity that killed them (if any)
    pub killed_by: Option<Entity>,
}
