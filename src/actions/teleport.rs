//! Blink to a reachable point on a ring around the target.

use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;

use super::task::Task;
use super::{ActionContext, ActionError, ActionKind, ActionProfile, ActionStatus, CombatAction};
use crate::core::Countdown;
use crate::providers::Collaborators;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TeleportConfig {
    pub profile: ActionProfile,
    /// Distance from the target to land at
    pub radius: f32,
    /// Attempts on the preferred half of the ring
    pub sample_tries: u32,
    /// Attempts anywhere on the ring once the preferred half failed
    pub fallback_tries: u32,
    /// How far a candidate may be snapped to reach navigable ground
    pub nav_sample_max_distance: f32,
    /// Prefer the half behind the target rather than in front of it
    pub behind_target: bool,
    /// Pause after arriving before the agent acts again
    pub settle: f32,
}

impl Default for TeleportConfig {
    fn default() -> Self {
        Self {
            profile: ActionProfile {
                pre_delay: 0.25,
                ..ActionProfile::with_trigger("Teleport")
            },
            radius: 5.0,
            sample_tries: 10,
            fallback_tries: 10,
            nav_sample_max_distance: 5.0,
            behind_target: true,
            settle: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    WindUp,
    Settle,
}

pub struct Teleport {
    config: TeleportConfig,
    cooldown: Countdown,
    task: Option<Task<Phase>>,
    destination: Vec3,
}

impl Teleport {
    pub fn new(config: TeleportConfig) -> Self {
        Self {
            config,
            cooldown: Countdown::ready(),
            task: None,
            destination: Vec3::ZERO,
        }
    }

    /// Random point on the ring around `target`, preferring the configured
    /// half, snapped to navigable ground.
    fn choose_location<R: Rng + ?Sized>(
        &self,
        collaborators: &Collaborators,
        rng: &mut R,
        target: Vec3,
        target_forward: Vec3,
    ) -> Option<Vec3> {
        let flat = Vec3::new(target_forward.x, 0.0, target_forward.z).normalize_or_zero();
        let facing = if flat == Vec3::ZERO { Vec3::Z } else { flat };
        let base = if self.config.behind_target {
            -facing
        } else {
            facing
        };

        for _ in 0..self.config.sample_tries {
            let angle: f32 = rng.gen_range(-90.0..=90.0);
            let direction = Quat::from_rotation_y(angle.to_radians()) * base;
            if let Some(point) = self.reachable(collaborators, target, direction) {
                return Some(point);
            }
        }
        for _ in 0..self.config.fallback_tries {
            let angle: f32 = rng.gen_range(0.0..360.0);
            let direction = Quat::from_rotation_y(angle.to_radians()) * Vec3::Z;
            if let Some(point) = self.reachable(collaborators, target, direction) {
                return Some(point);
            }
        }
        None
    }

    fn reachable(
        &self,
        collaborators: &Collaborators,
        target: Vec3,
        direction: Vec3,
    ) -> Option<Vec3> {
        let candidate = target + direction.normalize_or_zero() * self.config.radius;
        collaborators.sample_near(candidate, self.config.nav_sample_max_distance)
    }
}

impl CombatAction for Teleport {
    fn kind(&self) -> ActionKind {
        ActionKind::Teleport
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

    /// Picks the destination up front; failing to find one refuses the
    /// execution without touching the cooldown.
    fn begin(&mut self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        let Some(target) = ctx.view.target_position else {
            return Err(ActionError::NoTarget);
        };
        let forward = ctx.view.target_forward.unwrap_or(Vec3::Z);
        let destination = self
            .choose_location(&*ctx.collaborators, &mut *ctx.rng, target, forward)
            .ok_or(ActionError::NoReachablePoint)?;

        ctx.collaborators.stop();
        ctx.collaborators
            .trigger(&self.config.profile.animation_trigger);
        self.start_cooldown();
        self.destination = destination;
        self.task = Some(Task::new(Phase::WindUp, self.config.profile.pre_delay));
        Ok(())
    }

    fn step(&mut self, ctx: &mut ActionContext) -> ActionStatus {
        let Some(mut current) = self.task.take() else {
            return ActionStatus::Completed;
        };
        current.tick(ctx.view.delta);

        loop {
            match current.phase() {
                Phase::WindUp => {
                    if !current.done() {
                        break;
                    }
                    if !ctx.collaborators.warp(self.destination) {
                        debug!("teleport destination {:?} rejected", self.destination);
                    }
                    if let Some(target) = ctx.view.target_position {
                        ctx.collaborators.face(target);
                    }
                    current.enter(Phase::Settle, self.config.settle);
                }
                Phase::Settle => {
                    if !current.done() {
                        break;
                    }
                    ctx.collaborators.set_bool("Moving", false);
                    return ActionStatus::Completed;
                }
            }
        }

        self.task = Some(current);
        ActionStatus::Running
    }

    fn abort(&mut self, collaborators: &mut Collaborators) {
        if self.task.take().is_some() {
            collaborators.set_bool("Moving", false);
        }
    }

    fn reset(&mut self) {
        self.task = None;
        self.cooldown.clear();
    }
}
