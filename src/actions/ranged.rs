//! Projectile attack aimed at the target's chest.

use bevy::prelude::*;
use serde::Deserialize;

use super::task::{self, Approach, Task};
use super::{
    ActionContext, ActionEffect, ActionError, ActionKind, ActionProfile, ActionStatus,
    CombatAction,
};
use crate::combat::{ProjectileSpec, DEFAULT_ARMING_DELAY, DEFAULT_LIFETIME};
use crate::core::Countdown;
use crate::providers::Collaborators;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RangedConfig {
    pub profile: ActionProfile,
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    /// Aim this far above the target's feet
    pub aim_height: f32,
    /// Muzzle position in the agent's local frame
    pub muzzle_offset: [f32; 3],
    pub arming_delay: f32,
    pub lifetime: f32,
}

impl Default for RangedConfig {
    fn default() -> Self {
        Self {
            profile: ActionProfile {
                range: 12.0,
                ..default()
            },
            projectile_speed: 20.0,
            projectile_radius: 0.3,
            aim_height: 1.2,
            muzzle_offset: [0.0, 1.2, 0.5],
            arming_delay: DEFAULT_ARMING_DELAY,
            lifetime: DEFAULT_LIFETIME,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Approach,
    WindUp,
    Recovery,
}

pub struct RangedAttack {
    config: RangedConfig,
    cooldown: Countdown,
    task: Option<Task<Phase>>,
}

impl RangedAttack {
    pub fn new(config: RangedConfig) -> Self {
        Self {
            config,
            cooldown: Countdown::ready(),
            task: None,
        }
    }

    fn projectile(&self, ctx: &ActionContext, target: Vec3) -> ProjectileSpec {
        let forward = task::facing(ctx.view.position, target, ctx.view.forward);
        let origin = task::local_to_world(
            ctx.view.position,
            forward,
            Vec3::from(self.config.muzzle_offset),
        );
        let aim = target + Vec3::Y * self.config.aim_height;
        let mut direction = (aim - origin).normalize_or_zero();
        if direction == Vec3::ZERO {
            direction = forward;
        }

        ProjectileSpec {
            origin,
            velocity: direction * self.config.projectile_speed,
            damage: self.config.profile.damage,
            radius: self.config.projectile_radius,
            arming_delay: self.config.arming_delay,
            lifetime: self.config.lifetime,
        }
    }
}

impl CombatAction for RangedAttack {
    fn kind(&self) -> ActionKind {
        ActionKind::Ranged
    }

    fn profile(&self) -> &ActionProfile {
        &self.config.profile
    }

    fn cooldown(&self) -> &Countdown {
        &self.cooldown
    }

    fn cooldown_mut(&mut self) -> &mut Countdown {
        &mut self.cooldown
    }

    fn is_running(&self) -> bool {
        self.task.is_some()
    }

    fn begin(&mut self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        if ctx.view.target_position.is_none() {
            return Err(ActionError::NoTarget);
        }
        self.task = Some(Task::new(
            Phase::Approach,
            self.config.profile.approach_timeout,
        ));
        Ok(())
    }

    fn step(&mut self, ctx: &mut ActionContext) -> ActionStatus {
        let Some(mut current) = self.task.take() else {
            return ActionStatus::Completed;
        };
        current.tick(ctx.view.delta);

        loop {
            match current.phase() {
                Phase::Approach => match task::approach(ctx, self.config.profile.range) {
                    Approach::InRange(target) => {
                        task::commit(ctx, target, &self.config.profile.animation_trigger);
                        self.start_cooldown();
                        current.enter(Phase::WindUp, self.config.profile.pre_delay);
                    }
                    Approach::Closing if !current.done() => break,
                    Approach::Closing | Approach::Lost => {
                        task::stand_down(ctx);
                        return ActionStatus::Aborted;
                    }
                },
                Phase::WindUp => {
                    if !current.done() {
                        break;
                    }
                    // The target may have died during the wind-up; the shot is skipped.
                    if let Some(target) = ctx.view.target_position {
                        let projectile = self.projectile(ctx, target);
                        ctx.effects.push(ActionEffect::LaunchProjectile(projectile));
                    }
                    current.enter(Phase::Recovery, self.config.profile.hitbox_duration);
                }
                Phase::Recovery => {
                    if !current.done() {
                        break;
                    }
                    return ActionStatus::Completed;
                }
            }
        }

        self.task = Some(current);
        ActionStatus::Running
    }

    fn abort(&mut self, collaborators: &mut Collaborators) {
        if self.task.take().is_some() {
            collaborators.set_bool("Running", false);
        }
    }

    fn reset(&mut self) {
        self.task = None;
        self.cooldown.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn fires_one_projectile_at_the_chest() {
        let mut action = RangedAttack::new(RangedConfig::default());
        let mut collaborators = collaborators(Vec3::ZERO);
        let view = view(Vec3::ZERO, Some(Vec3::new(0.0, 0.0, 8.0)));
        let mut effects = Vec::new();
        let mut rng = rng();

        action
            .execute(&mut ActionContext {
                view,
                collaborators: &mut collaborators,
                effects: &mut effects,
                rng: &mut rng,
            })
            .unwrap();
        let (status, effects, _) = run_to_end(&mut action, &mut collaborators, view, 10);

        assert_eq!(status, ActionStatus::Completed);
        let [ActionEffect::LaunchProjectile(spec)] = effects.as_slice() else {
            panic!("expected one projectile, got {effects:?}");
        };
        assert!(spec.origin.distance(Vec3::new(0.0, 1.2, 0.5)) < 1e-5);
        // Muzzle and chest are level, so the shot flies flat along +Z.
        assert!(spec.velocity.distance(Vec3::new(0.0, 0.0, 20.0)) < 1e-4);
        assert_eq!(spec.arming_delay, DEFAULT_ARMING_DELAY);
    }
}
