//! Projectiles fired by ranged actions.

use bevy::prelude::*;

use crate::core::Countdown;

/// Collision stays off this long after launch so a projectile cannot hit
/// whatever it spawned inside of.
pub const DEFAULT_ARMING_DELAY: f32 = 0.5;
/// Projectiles that never hit anything vanish after this long.
pub const DEFAULT_LIFETIME: f32 = 15.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileSpec {
    pub origin: Vec3,
    pub velocity: Vec3,
    pub damage: f32,
    pub radius: f32,
    pub arming_delay: f32,
    pub lifetime: f32,
}

/// A straight-flying projectile. Hits at most one target.
#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub owner: Option<Entity>,
    pub velocity: Vec3,
    pub damage: f32,
    pub radius: f32,
    arming: Countdown,
    lifetime: Countdown,
    spent: bool,
}

impl Projectile {
    pub fn from_spec(owner: Option<Entity>, spec: &ProjectileSpec) -> Self {
        Self {
            owner,
            velocity: spec.velocity,
            damage: spec.damage,
            radius: spec.radius.max(0.0),
            arming: Countdown::new(spec.arming_delay),
            lifetime: Countdown::new(spec.lifetime),
            spent: false,
        }
    }

    /// Move `position` along the velocity and age the projectile.
    pub fn advance(&mut self, position: &mut Vec3, delta: f32) {
        if !(delta.is_finite() && delta > 0.0) {
            return;
        }
        *position += self.velocity * delta;
        self.arming.tick(delta);
        self.lifetime.tick(delta);
    }

    pub fn is_armed(&self) -> bool {
        self.arming.is_expired()
    }

    /// Spent or timed out; the host should despawn it.
    pub fn is_finished(&self) -> bool {
        self.spent || self.lifetime.is_expired()
    }

    pub fn try_hit(&mut self, position: Vec3, target: Vec3, target_radius: f32) -> Option<f32> {
        if self.spent || !self.is_armed() {
            return None;
        }
        if position.distance(target) > self.radius + target_radius.max(0.0) {
            return None;
        }
        self.spent = true;
        Some(self.damage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ProjectileSpec {
        ProjectileSpec {
            origin: Vec3::ZERO,
            velocity: Vec3::new(0.0, 0.0, 4.0),
            damage: 7.0,
            radius: 0.25,
            arming_delay: DEFAULT_ARMING_DELAY,
            lifetime: 2.0,
        }
    }

    #[test]
    fn unarmed_projectile_passes_through() {
        let mut projectile = Projectile::from_spec(None, &spec());
        let mut position = Vec3::ZERO;
        projectile.advance(&mut position, 0.25);
        assert!(!projectile.is_armed());
        assert_eq!(projectile.try_hit(position, position, 0.5), None);

        projectile.advance(&mut position, 0.25);
        assert_eq!(position, Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(projectile.try_hit(position, position, 0.5), Some(7.0));
        assert_eq!(projectile.try_hit(position, position, 0.5), None);
        assert!(projectile.is_finished());
    }

    #[test]
    fn expires_after_lifetime() {
        let mut projectile = Projectile::from_spec(None, &spec());
        let mut position = Vec3::ZERO;
        for _ in 0..8 {
            projectile.advance(&mut position, 0.25);
        }
        assert!(projectile.is_finished());
    }
}
