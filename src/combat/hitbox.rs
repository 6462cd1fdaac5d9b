//! Transient damage volumes spawned by combat actions.

use std::f32::consts::PI;

use bevy::prelude::*;
use serde::Deserialize;

use crate::core::Countdown;

/// Volume of a hitbox over its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub enum HitboxShape {
    /// Constant radius
    Static { radius: f32 },
    /// Grows from 0 to `max_radius` at half-life, then shrinks back to 0
    Expanding { max_radius: f32 },
}

/// Everything needed to spawn a hitbox.
#[derive(Debug, Clone, PartialEq)]
pub struct HitboxSpec {
    /// World-space center at spawn time
    pub position: Vec3,
    /// Offset in the owner's local frame. When set, the hitbox follows its
    /// owner instead of staying where it was spawned.
    pub follow_offset: Option<Vec3>,
    pub shape: HitboxShape,
    pub damage: f32,
    pub duration: f32,
}

/// A live hitbox. Deals its damage to at most one target, once.
#[derive(Component, Debug, Clone)]
pub struct Hitbox {
    pub owner: Option<Entity>,
    pub shape: HitboxShape,
    pub damage: f32,
    pub follow_offset: Option<Vec3>,
    lifetime: Countdown,
    has_hit: bool,
}

impl Hitbox {
    pub fn new(shape: HitboxShape, damage: f32, duration: f32) -> Self {
        Self {
            owner: None,
            shape,
            damage,
            follow_offset: None,
            lifetime: Countdown::new(duration),
            has_hit: false,
        }
    }

    pub fn from_spec(owner: Option<Entity>, spec: &HitboxSpec) -> Self {
        Self {
            owner,
            follow_offset: spec.follow_offset,
            ..Self::new(spec.shape, spec.damage, spec.duration)
        }
    }

    /// Current radius. Expanding hitboxes follow `sin(pi * t / duration)`.
    pub fn radius(&self) -> f32 {
        match self.shape {
            HitboxShape::Static { radius } => radius.max(0.0),
            HitboxShape::Expanding { max_radius } => {
                let t = self.lifetime.fraction_elapsed();
                ((t * PI).sin() * max_radius).max(0.0)
            }
        }
    }

    pub fn tick(&mut self, delta: f32) {
        self.lifetime.tick(delta);
    }

    pub fn is_finished(&self) -> bool {
        self.lifetime.is_expired()
    }

    pub fn has_hit(&self) -> bool {
        self.has_hit
    }

    pub fn overlaps(&self, center: Vec3, target: Vec3, target_radius: f32) -> bool {
        center.distance(target) <= self.radius() + target_radius.max(0.0)
    }

    /// Damage to apply if this hitbox touches the target and has not hit yet.
    pub fn try_hit(&mut self, center: Vec3, target: Vec3, target_radius: f32) -> Option<f32> {
        if self.has_hit || !self.overlaps(center, target, target_radius) {
            return None;
        }
        self.has_hit = true;
        Some(self.damage)
    }
}
