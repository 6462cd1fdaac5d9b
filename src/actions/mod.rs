//! Combat actions - the attacks and maneuvers an agent performs while hostile.
//!
//! An action is a small task object advanced once per tick by its agent:
//! approach the target, commit (stop, face, animation trigger, wind-up),
//! produce its effect, then recover. Effects that need the world (hitboxes,
//! projectiles, summons, self-destruction) are pushed as [`ActionEffect`]s
//! for the host to carry out.

mod jump_slam;
mod kamikaze;
mod melee;
mod ranged;
mod summon;
mod task;
mod teleport;

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use thiserror::Error;

use crate::agents::AgentView;
use crate::combat::{HitboxSpec, ProjectileSpec};
use crate::core::Countdown;
use crate::providers::Collaborators;

pub use jump_slam::{JumpSlam, JumpSlamConfig};
pub use kamikaze::{Kamikaze, KamikazeConfig};
pub use melee::{MeleeAttack, MeleeConfig};
pub use ranged::{RangedAttack, RangedConfig};
pub use summon::{Summon, SummonConfig};
pub use teleport::{Teleport, TeleportConfig};

pub(crate) use task::yaw;

/// Tunables shared by every action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ActionProfile {
    /// Distance at which the approach phase ends
    pub range: f32,
    /// Seconds between executions
    pub cooldown: f32,
    pub damage: f32,
    pub hitbox_radius: f32,
    /// Hitbox lifetime, also the recovery wait
    pub hitbox_duration: f32,
    /// Wind-up between the animation trigger and the effect
    pub pre_delay: f32,
    pub animation_trigger: String,
    /// Give up on a target that cannot be reached within this many seconds
    pub approach_timeout: f32,
}

impl Default for ActionProfile {
    fn default() -> Self {
        Self {
            range: 2.0,
            cooldown: 5.0,
            damage: 2.0,
            hitbox_radius: 1.2,
            hitbox_duration: 0.5,
            pre_delay: 0.2,
            animation_trigger: "Attack".to_string(),
            approach_timeout: 10.0,
        }
    }
}

impl ActionProfile {
    pub fn with_trigger(trigger: &str) -> Self {
        Self {
            animation_trigger: trigger.to_string(),
            ..default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Melee,
    Ranged,
    JumpSlam,
    Teleport,
    Summon,
    Kamikaze,
}

impl ActionKind {
    pub fn label(self) -> &'static str {
        match self {
            ActionKind::Melee => "melee",
            ActionKind::Ranged => "ranged",
            ActionKind::JumpSlam => "jump-slam",
            ActionKind::Teleport => "teleport",
            ActionKind::Summon => "summon",
            ActionKind::Kamikaze => "kamikaze",
        }
    }
}

/// Identifies one summoned subordinate to the action that summoned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SummonId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct SummonRequest {
    /// Archetype name of the agent to spawn
    pub archetype: String,
    pub position: Vec3,
    pub facing: Vec3,
    pub id: SummonId,
}

/// Something an action needs the world to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionEffect {
    SpawnHitbox(HitboxSpec),
    LaunchProjectile(ProjectileSpec),
    Summon(SummonRequest),
    /// The agent blows itself up: dies without loot and despawns at once.
    SelfDestruct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Running,
    Completed,
    Aborted,
}

/// Why an execution was refused. Refusals never consume the cooldown.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error("on cooldown for another {remaining:.2}s")]
    CoolingDown { remaining: f32 },
    #[error("already running")]
    AlreadyRunning,
    #[error("no reachable point found")]
    NoReachablePoint,
    #[error("no target")]
    NoTarget,
    #[error("single-use action already spent")]
    Exhausted,
}

/// Everything an action may touch during one tick.
pub struct ActionContext<'a> {
    pub view: AgentView,
    pub collaborators: &'a mut Collaborators,
    pub effects: &'a mut Vec<ActionEffect>,
    pub rng: &'a mut ChaCha8Rng,
}

/// A pluggable attack or maneuver.
pub trait CombatAction: Send + Sync {
    fn kind(&self) -> ActionKind;

    fn profile(&self) -> &ActionProfile;

    fn cooldown(&self) -> &Countdown;

    fn cooldown_mut(&mut self) -> &mut Countdown;

    fn is_running(&self) -> bool;

    /// Set up a new execution. Only called when the action is ready.
    fn begin(&mut self, ctx: &mut ActionContext) -> Result<(), ActionError>;

    /// Advance the running execution by one tick.
    fn step(&mut self, ctx: &mut ActionContext) -> ActionStatus;

    /// Cancel the running execution, undoing any half-done maneuver.
    fn abort(&mut self, collaborators: &mut Collaborators);

    /// Back to a freshly built state: not running, cooldown ready.
    fn reset(&mut self);

    /// The agent bumped into something. Returns true if the action reacted.
    fn notify_collision(&mut self, _ctx: &mut ActionContext) -> bool {
        false
    }

    /// A subordinate this action summoned is gone.
    fn release_summon(&mut self, _id: SummonId) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        self.kind().label()
    }

    fn range(&self) -> f32 {
        self.profile().range
    }

    fn is_ready(&self) -> bool {
        !self.is_running() && self.cooldown().is_expired()
    }

    fn tick_cooldown(&mut self, delta: f32) {
        self.cooldown_mut().tick(delta);
    }

    /// Start the full cooldown. Actions call this when they commit.
    fn start_cooldown(&mut self) {
        let seconds = self.profile().cooldown;
        self.cooldown_mut().reset(seconds);
    }

    /// Begin an execution and run its first step.
    fn execute(&mut self, ctx: &mut ActionContext) -> Result<ActionStatus, ActionError> {
        if self.is_running() {
            return Err(ActionError::AlreadyRunning);
        }
        if !self.cooldown().is_expired() {
            return Err(ActionError::CoolingDown {
                remaining: self.cooldown().remaining_secs(),
            });
        }
        self.begin(ctx)?;
        Ok(self.step(ctx))
    }
}

/// Action configuration as written in archetype files.
#[derive(Debug, Clone, Deserialize)]
pub enum ActionConfig {
    Melee(MeleeConfig),
    Ranged(RangedConfig),
    JumpSlam(JumpSlamConfig),
    Teleport(TeleportConfig),
    Summon(SummonConfig),
    Kamikaze(KamikazeConfig),
}

impl ActionConfig {
    pub fn build(&self) -> Box<dyn CombatAction> {
        match self {
            ActionConfig::Melee(config) => Box::new(MeleeAttack::new(config.clone())),
            ActionConfig::Ranged(config) => Box::new(RangedAttack::new(config.clone())),
            ActionConfig::JumpSlam(config) => Box::new(JumpSlam::new(config.clone())),
            ActionConfig::Teleport(config) => Box::new(Teleport::new(config.clone())),
            ActionConfig::Summon(config) => Box::new(Summon::new(config.clone())),
            ActionConfig::Kamikaze(config) => Box::new(Kamikaze::new(config.clone())),
        }
    }
}
