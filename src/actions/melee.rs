//! Close-range strike with a static hitbox in front of the agent.

use bevy::prelude::*;
use serde::Deserialize;

use super::task::{self, Approach, Task};
use super::{
    ActionContext, ActionEffect, ActionError, ActionKind, ActionProfile, ActionStatus,
    CombatAction,
};
use crate::combat::{HitboxShape, HitboxSpec};
use crate::core::Countdown;
use crate::providers::Collaborators;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MeleeConfig {
    pub profile: ActionProfile,
    /// Hitbox center in the agent's local frame (x right, y up, z forward)
    pub hitbox_offset: [f32; 3],
}

impl Default for MeleeConfig {
    fn default() -> Self {
        Self {
            profile: ActionProfile::default(),
            hitbox_offset: [0.0, 1.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Approach,
    WindUp,
    Recovery,
}

pub struct MeleeAttack {
    config: MeleeConfig,
    cooldown: Countdown,
    task: Option<Task<Phase>>,
}

impl MeleeAttack {
    pub fn new(config: MeleeConfig) -> Self {
        Self {
            config,
            cooldown: Countdown::ready(),
            task: None,
        }
    }

    fn hitbox(&self, ctx: &ActionContext) -> HitboxSpec {
        let profile = &self.config.profile;
        let offset = Vec3::from(self.config.hitbox_offset);
        let forward = ctx
            .view
            .target_position
            .map_or(ctx.view.forward, |target| {
                task::facing(ctx.view.position, target, ctx.view.forward)
            });
        HitboxSpec {
            position: task::local_to_world(ctx.view.position, forward, offset),
            follow_offset: Some(offset),
            shape: HitboxShape::Static {
                radius: profile.hitbox_radius,
            },
            damage: profile.damage,
            duration: profile.hitbox_duration,
        }
    }
}

impl CombatAction for MeleeAttack {
    fn kind(&self) -> ActionKind {
        ActionKind::Melee
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
                    let hitbox = self.hitbox(ctx);
                    ctx.effects.push(ActionEffect::SpawnHitbox(hitbox));
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
