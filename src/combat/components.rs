//! Combat-related components.

use bevy::prelude::*;

// Re-export from core to avoid duplication
pub use crate::core::{DamageEvent, DeathEvent};

/// Component for non-agent entities that can take damage (the player,
/// training dummies, destructible props).
#[derive(Component, Debug, Clone)]
pub struct Health {
    pub current: f32,
    pub maximum: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            current: max,
            maximum: max,
        }
    }

    /// Returns the damage actually taken. Non-positive or non-finite
    /// amounts do nothing.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if !(amount.is_finite() && amount > 0.0) {
            return 0.0;
        }
        let actual = amount.min(self.current);
        self.current -= actual;
        actual
    }

    pub fn heal(&mut self, amount: f32) -> f32 {
        if !(amount.is_finite() && amount > 0.0) {
            return 0.0;
        }
        let actual = amount.min(self.maximum - self.current);
        self.current += actual;
        actual
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    pub fn percentage(&self) -> f32 {
        if self.maximum <= 0.0 {
            0.0
        } else {
            self.current / self.maximum
        }
    }
}

/// Something agent hitboxes and projectiles can hit.
#[derive(Component, Debug, Clone, Copy)]
pub struct CombatTarget {
    /// Body radius added to the hitbox radius for overlap tests
    pub radius: f32,
}

impl Default for CombatTarget {
    fn default() -> Self {
        Self { radius: 0.5 }
    }
}
