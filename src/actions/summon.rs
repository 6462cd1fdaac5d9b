//! Call in subordinate agents, up to a cap.

use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;

use super::task::{self, Approach, Task};
use super::{
    ActionContext, ActionEffect, ActionError, ActionKind, ActionProfile, ActionStatus,
    CombatAction, SummonId, SummonRequest,
};
use crate::core::Countdown;
use crate::providers::Collaborators;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SummonConfig {
    pub profile: ActionProfile,
    /// Archetype of the summoned agent
    pub archetype: String,
    pub max_active: usize,
    /// Scatter radius around the caster when there is no target
    pub summon_radius: f32,
    /// Distance from the target (around it) or from the caster (toward it)
    pub spawn_distance: f32,
    pub spawn_around_target: bool,
    /// Snap the spawn point onto navigable ground when one is close enough
    pub snap_to_nav: bool,
    pub nav_sample_max_distance: f32,
}

impl Default for SummonConfig {
    fn default() -> Self {
        Self {
            profile: ActionProfile::with_trigger("Summon"),
            archetype: String::new(),
            max_active: 3,
            summon_radius: 5.0,
            spawn_distance: 4.0,
            spawn_around_target: false,
            snap_to_nav: true,
            nav_sample_max_distance: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Approach,
    WindUp,
    Recovery,
}

pub struct Summon {
    config: SummonConfig,
    cooldown: Countdown,
    task: Option<Task<Phase>>,
    active: Vec<SummonId>,
}

impl Summon {
    pub fn new(config: SummonConfig) -> Self {
        Self {
            config,
            cooldown: Countdown::ready(),
            task: None,
            active: Vec::new(),
        }
    }

    pub fn active(&self) -> &[SummonId] {
        &self.active
    }

    fn spawn_position(&self, ctx: &mut ActionContext) -> Vec3 {
        let caster = ctx.view.position;
        let position = match ctx.view.target_position {
            Some(target) if self.config.spawn_around_target => {
                let angle: f32 = ctx.rng.gen_range(0.0..std::f32::consts::TAU);
                target + Vec3::new(angle.cos(), 0.0, angle.sin()) * self.config.spawn_distance
            }
            Some(target) => {
                let toward = (target - caster).normalize_or_zero();
                caster + toward * self.config.spawn_distance
            }
            None => {
                let angle: f32 = ctx.rng.gen_range(0.0..std::f32::consts::TAU);
                let distance = ctx.rng.gen_range(0.0..=self.config.summon_radius.max(0.0));
                caster + Vec3::new(angle.cos(), 0.0, angle.sin()) * distance
            }
        };

        if self.config.snap_to_nav {
            if let Some(snapped) = ctx
                .collaborators
                .sample_near(position, self.config.nav_sample_max_distance)
            {
                return snapped;
            }
        }
        position
    }

    fn summon(&mut self, ctx: &mut ActionContext) {
        if self.config.archetype.is_empty() {
            warn!("summon action has no archetype configured");
            return;
        }
        if self.active.len() >= self.config.max_active {
            // At the cap: keep the current summons, spawn nothing.
            debug!(
                "summon cap of {} reached, refreshing instead",
                self.config.max_active
            );
            return;
        }

        let position = self.spawn_position(ctx);
        let facing = ctx
            .view
            .target_position
            .map_or(Vec3::Z, |target| task::facing(position, target, Vec3::Z));
        let id = SummonId(ctx.rng.gen());

        self.active.push(id);
        ctx.effects.push(ActionEffect::Summon(SummonRequest {
            archetype: self.config.archetype.clone(),
            position,
            facing,
            id,
        }));
    }
}

impl CombatAction for Summon {
    fn kind(&self) -> ActionKind {
        ActionKind::Summon
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
                    self.summon(ctx);
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
        self.active.clear();
    }

    fn release_summon(&mut self, id: SummonId) -> bool {
        let before = self.active.len();
        self.active.retain(|active| *active != id);
        self.active.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn cast(action: &mut Summon, rng: &mut rand_chacha::ChaCha8Rng) -> Vec<ActionEffect> {
        let mut collaborators = collaborators(Vec3::ZERO);
        let view = view(Vec3::ZERO, Some(Vec3::new(0.0, 0.0, 1.5)));
        let mut effects = Vec::new();
        let mut ctx = ActionContext {
            view,
            collaborators: &mut collaborators,
            effects: &mut effects,
            rng,
        };
        let mut status = action.execute(&mut ctx).unwrap();
        while status == ActionStatus::Running {
            status = action.step(&mut ctx);
        }
        action.cooldown_mut().clear();
        effects
    }

    #[test]
    fn caps_active_summons() {
        let mut action = Summon::new(SummonConfig {
            archetype: "skitter".into(),
            max_active: 2,
            ..default()
        });

        let mut rng = rng();

        assert_eq!(cast(&mut action, &mut rng).len(), 1);
        assert_eq!(cast(&mut action, &mut rng).len(), 1);
        assert!(cast(&mut action, &mut rng).is_empty());
        assert_eq!(action.active().len(), 2);
        assert_ne!(action.active()[0], action.active()[1]);

        let released = action.active()[0];
        assert!(action.release_summon(released));
        assert!(!action.release_summon(released));

        let effects = cast(&mut action, &mut rng);
        let [ActionEffect::Summon(request)] = effects.as_slice() else {
            panic!("expected a summon, got {effects:?}");
        };
        assert_eq!(request.archetype, "skitter");
        // Toward the target, spawn_distance away from the caster
        assert!(request.position.distance(Vec3::new(0.0, 0.0, 4.0)) < 1e-5);
    }
}
