//! Combat module - hitboxes, projectiles, health, loot and damage.

mod components;
mod hitbox;
mod loot;
mod plugin;
mod projectile;
mod systems;

pub use components::*;
pub use hitbox::{Hitbox, HitboxShape, HitboxSpec};
pub use loot::{LootDrop, LootEntry, LootTable};
pub use plugin::CombatPlugin;
pub use projectile::{Projectile, ProjectileSpec, DEFAULT_ARMING_DELAY, DEFAULT_LIFETIME};
