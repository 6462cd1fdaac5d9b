//! Leap straight up, come down, and slam an expanding shockwave.

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
pub struct JumpSlamConfig {
    pub profile: ActionProfile,
    /// Upward launch speed
    pub jump_force: f32,
    /// Time between leaving the ground and the slam
    pub air_time: f32,
    pub slam_damage: f32,
    pub slam_radius: f32,
    pub slam_duration: f32,
}

impl Default for JumpSlamConfig {
    fn default() -> Self {
        Self {
            profile: ActionProfile::with_trigger("JumpSlam"),
            jump_force: 8.0,
            air_time: 2.0,
            slam_damage: 20.0,
            slam_radius: 7.0,
            slam_duration: 0.35,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Approach,
    WindUp,
    Airborne,
    Recovery,
}

pub struct JumpSlam {
    config: JumpSlamConfig,
    cooldown: Countdown,
    task: Option<Task<Phase>>,
}

impl JumpSlam {
    pub fn new(config: JumpSlamConfig) -> Self {
        Self {
            config,
            cooldown: Countdown::ready(),
            task: None,
        }
    }
}

impl CombatAction for JumpSlam {
    fn kind(&self) -> ActionKind {
        ActionKind::JumpSlam
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
                    ctx.collaborators
                        .launch(Vec3::Y * self.config.jump_force);
                    current.enter(Phase::Airborne, self.config.air_time);
                }
                Phase::Airborne => {
                    if !current.done() {
                        break;
                    }
                    ctx.collaborators.land();
                    let position = ctx.collaborators.position().unwrap_or(ctx.view.position);
                    ctx.effects.push(ActionEffect::SpawnHitbox(HitboxSpec {
                        position,
                        follow_offset: Some(Vec3::ZERO),
                        shape: HitboxShape::Expanding {
                            max_radius: self.config.slam_radius,
                        },
                        damage: self.config.slam_damage,
                        duration: self.config.slam_duration,
                    }));
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
        let Some(current) = self.task.take() else {
            return;
        };
        if current.phase() == Phase::Airborne {
            collaborators.land();
        }
        collaborators.set_bool("Running", false);
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

    fn start(action: &mut JumpSlam, collaborators: &mut Collaborators, view: crate::agents::AgentView) {
        let mut effects = Vec::new();
        let mut rng = rng();
        action
            .execute(&mut ActionContext {
                view,
                collaborators,
                effects: &mut effects,
                rng: &mut rng,
            })
            .unwrap();
    }

    #[test]
    fn slams_after_air_time() {
        let mut action = JumpSlam::new(JumpSlamConfig::default());
        let mut collaborators = collaborators(Vec3::ZERO);
        let view = view(Vec3::ZERO, Some(Vec3::new(1.0, 0.0, 0.0)));
        start(&mut action, &mut collaborators, view);

        // wind-up tick launches
        let (status, effects, _) = run_to_end(&mut action, &mut collaborators, view, 1);
        assert_eq!(status, ActionStatus::Running);
        assert!(effects.is_empty());
        assert!(collaborators.is_airborne());

        let (status, effects, ticks) = run_to_end(&mut action, &mut collaborators, view, 40);
        assert_eq!(status, ActionStatus::Completed);
        // 2s of air time plus 0.5s of recovery at 0.25s per tick
        assert_eq!(ticks, 10);
        assert!(!collaborators.is_airborne());
        let [ActionEffect::SpawnHitbox(spec)] = effects.as_slice() else {
            panic!("expected one slam, got {effects:?}");
        };
        assert_eq!(spec.damage, 20.0);
        assert_eq!(spec.shape, HitboxShape::Expanding { max_radius: 7.0 });
    }

    #[test]
    fn abort_mid_air_lands() {
        let mut action = JumpSlam::new(JumpSlamConfig::default());
        let mut collaborators = collaborators(Vec3::ZERO);
        let view = view(Vec3::ZERO, Some(Vec3::new(1.0, 0.0, 0.0)));
        start(&mut action, &mut collaborators, view);
        run_to_end(&mut action, &mut collaborators, view, 1);
        assert!(collaborators.is_airborne());

        action.abort(&mut collaborators);
        assert!(!action.is_running());
        assert!(!collaborators.is_airborne());
    }
}
