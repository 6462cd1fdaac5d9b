//! Leap at the target and explode.

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
pub struct KamikazeConfig {
    pub profile: ActionProfile,
    /// Upward launch speed; the forward part is this times `forward_multiplier`
    pub jump_force: f32,
    pub forward_multiplier: f32,
    /// Collisions are ignored this long after launch
    pub arming_delay: f32,
    /// Explode anyway once armed for this long
    pub self_destruct_delay: f32,
}

impl Default for KamikazeConfig {
    fn default() -> Self {
        Self {
            profile: ActionProfile::with_trigger("Kamikaze"),
            jump_force: 10.0,
            forward_multiplier: 1.5,
            arming_delay: 0.1,
            self_destruct_delay: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Approach,
    Arming,
    Armed,
}

/// Single use. Once launched it cannot be executed again until reset.
pub struct Kamikaze {
    config: KamikazeConfig,
    cooldown: Countdown,
    task: Option<Task<Phase>>,
    launched: bool,
    exploded: bool,
}

impl Kamikaze {
    pub fn new(config: KamikazeConfig) -> Self {
        Self {
            config,
            cooldown: Countdown::ready(),
            task: None,
            launched: false,
            exploded: false,
        }
    }

    pub fn has_exploded(&self) -> bool {
        self.exploded
    }

    fn is_armed(&self) -> bool {
        self.task
            .as_ref()
            .is_some_and(|current| current.phase() == Phase::Armed)
    }

    fn launch(&mut self, ctx: &mut ActionContext, target: Vec3) {
        let toward = (target - ctx.view.position).normalize_or_zero();
        let force = self.config.jump_force;
        ctx.collaborators
            .launch(toward * (self.config.forward_multiplier * force) + Vec3::Y * force);
        self.launched = true;
    }

    /// Idempotent: only the first call produces an explosion.
    fn explode(&mut self, ctx: &mut ActionContext) -> bool {
        if self.exploded {
            return false;
        }
        self.exploded = true;
        self.task = None;

        let position = ctx.collaborators.position().unwrap_or(ctx.view.position);
        let profile = &self.config.profile;
        ctx.effects.push(ActionEffect::SpawnHitbox(HitboxSpec {
            position,
            follow_offset: None,
            shape: HitboxShape::Expanding {
                max_radius: profile.hitbox_radius,
            },
            damage: profile.damage,
            duration: profile.hitbox_duration,
        }));
        ctx.effects.push(ActionEffect::SelfDestruct);
        true
    }
}

impl CombatAction for Kamikaze {
    fn kind(&self) -> ActionKind {
        ActionKind::Kamikaze
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

    fn is_ready(&self) -> bool {
        !self.launched && !self.exploded && !self.is_running() && self.cooldown.is_expired()
    }

    fn begin(&mut self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        if self.launched || self.exploded {
            return Err(ActionError::Exhausted);
        }
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
                        self.launch(ctx, target);
                        current.enter(Phase::Arming, self.config.arming_delay);
                    }
                    Approach::Closing if !current.done() => break,
                    Approach::Closing | Approach::Lost => {
                        task::stand_down(ctx);
                        return ActionStatus::Aborted;
                    }
                },
                Phase::Arming => {
                    if !current.done() {
                        break;
                    }
                    current.enter(Phase::Armed, self.config.self_destruct_delay);
                }
                Phase::Armed => {
                    // Touching down counts as a collision.
                    if current.done() || !ctx.collaborators.is_airborne() {
                        self.explode(ctx);
                        return ActionStatus::Completed;
                    }
                    break;
                }
            }
        }

        self.task = Some(current);
        ActionStatus::Running
    }

    /// Disarms. A kamikaze that already left the ground stays spent.
    fn abort(&mut self, collaborators: &mut Collaborators) {
        if self.task.take().is_none() {
            return;
        }
        if collaborators.is_airborne() {
            collaborators.land();
        }
        collaborators.set_bool("Running", false);
    }

    fn reset(&mut self) {
        self.task = None;
        self.cooldown.clear();
        self.launched = false;
        self.exploded = false;
    }

    fn notify_collision(&mut self, ctx: &mut ActionContext) -> bool {
        if !self.is_armed() {
            return false;
        }
        self.explode(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::agents::AgentView;

    fn launched() -> (Kamikaze, Collaborators, AgentView) {
        let mut action = Kamikaze::new(KamikazeConfig::default());
        let mut collaborators = collaborators(Vec3::ZERO);
        let view = view(Vec3::ZERO, Some(Vec3::new(0.0, 0.0, 1.0)));
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
        assert!(collaborators.is_airborne());
        (action, collaborators, view)
    }

    fn collide(action: &mut Kamikaze, collaborators: &mut Collaborators, view: AgentView) -> Vec<ActionEffect> {
        let mut effects = Vec::new();
        let mut rng = rng();
        action.notify_collision(&mut ActionContext {
            view,
            collaborators,
            effects: &mut effects,
            rng: &mut rng,
        });
        effects
    }

    #[test]
    fn collision_before_arming_is_ignored() {
        let (mut action, mut collaborators, view) = launched();
        assert!(collide(&mut action, &mut collaborators, view).is_empty());
        assert!(!action.has_exploded());
    }

    #[test]
    fn explodes_once_on_collision() {
        let (mut action, mut collaborators, view) = launched();
        // one tick arms it
        let (status, _, _) = run_to_end(&mut action, &mut collaborators, view, 1);
        assert_eq!(status, ActionStatus::Running);

        let effects = collide(&mut action, &mut collaborators, view);
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[1], ActionEffect::SelfDestruct);
        assert!(collide(&mut action, &mut collaborators, view).is_empty());
        assert!(!action.is_running());
    }

    #[test]
    fn fallback_timer_explodes_without_collision() {
        let (mut action, mut collaborators, view) = launched();
        let (status, effects, ticks) = run_to_end(&mut action, &mut collaborators, view, 40);
        assert_eq!(status, ActionStatus::Completed);
        // 0.1s arming then 3s armed, at 0.25s per tick
        assert_eq!(ticks, 13);
        assert!(effects.contains(&ActionEffect::SelfDestruct));
    }

    #[test]
    fn spent_after_launch() {
        let (mut action, mut collaborators, view) = launched();
        action.abort(&mut collaborators);
        assert!(!collaborators.is_airborne());
        action.cooldown_mut().clear();
        assert!(!action.is_ready());

        let mut effects = Vec::new();
        let mut rng = rng();
        let result = action.execute(&mut ActionContext {
            view,
            collaborators: &mut collaborators,
            effects: &mut effects,
            rng: &mut rng,
        });
        assert_eq!(result, Err(ActionError::Exhausted));

        action.reset();
        assert!(action.is_ready());
    }
}
