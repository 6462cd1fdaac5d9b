//! The agent state machine.

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use super::behavior::{
    self, DeathConfig, HostileReaction, IdleBehavior, SearchConfig, WanderState,
    ARRIVAL_TOLERANCE, FLEE_DISTANCE,
};
use super::AgentView;
use crate::actions::{
    ActionContext, ActionEffect, ActionError, ActionKind, ActionStatus, CombatAction, SummonId,
};
use crate::combat::{LootDrop, LootTable};
use crate::core::Countdown;
use crate::providers::{Collaborators, Pose};
use crate::triggers::AngerTrigger;

/// How far a respawn point may be moved to reach navigable ground.
const RESPAWN_SNAP_DISTANCE: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AgentState {
    #[default]
    Idle,
    Hostile,
    Searching,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DespawnMode {
    ReturnToPool,
    Destroy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    Damage,
    SelfDestruct,
}

/// Something that happened during a tick (or since the last one).
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    StateChanged { from: AgentState, to: AgentState },
    ActionStarted { index: usize, kind: ActionKind },
    ActionFinished { index: usize, kind: ActionKind, status: ActionStatus },
    /// World-side work requested by an action
    Effect(ActionEffect),
    Died(DeathCause),
    LootDropped(Vec<LootDrop>),
    /// The corpse is done; remove or recycle the agent
    Despawn(DespawnMode),
}

/// Everything an agent reports from one tick.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub events: Vec<AgentEvent>,
}

impl TickReport {
    pub fn effects(&self) -> impl Iterator<Item = &ActionEffect> {
        self.events.iter().filter_map(|event| match event {
            AgentEvent::Effect(effect) => Some(effect),
            _ => None,
        })
    }

    pub fn entered(&self, state: AgentState) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, AgentEvent::StateChanged { to, .. } if *to == state))
    }

    pub fn started_actions(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, AgentEvent::ActionStarted { .. }))
            .count()
    }
}

/// Why a direct execution request was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecuteError {
    #[error("agent has no action at index {0}")]
    UnknownAction(usize),
    #[error("agent is dead")]
    Dead,
    #[error("another action is executing")]
    Busy,
    #[error(transparent)]
    Action(#[from] ActionError),
}

#[derive(Debug, Clone, Default)]
pub(super) struct Corpse {
    pub loot: Countdown,
    pub despawn: Countdown,
    pub looted: bool,
    pub removed: bool,
}

/// An AI-controlled combatant.
///
/// Owns its actions, triggers, collaborators and timers. Advanced once per
/// frame with [`Agent::tick`]; damage arrives through [`Agent::apply_damage`].
#[derive(Component)]
pub struct Agent {
    pub(super) name: String,
    pub(super) archetype: String,
    pub(super) health: f32,
    pub(super) max_health: f32,
    pub(super) state: AgentState,
    pub(super) actions: Vec<Box<dyn CombatAction>>,
    pub(super) triggers: Vec<Box<dyn AngerTrigger>>,
    pub(super) collaborators: Collaborators,
    pub(super) reaction: HostileReaction,
    pub(super) idle: IdleBehavior,
    pub(super) search: Option<SearchConfig>,
    pub(super) death: DeathConfig,
    pub(super) loot: LootTable,
    pub(super) anger_duration: f32,
    pub(super) hostility: Countdown,
    pub(super) search_timer: Countdown,
    pub(super) executing: Option<usize>,
    pub(super) spawn_position: Vec3,
    pub(super) last_known_target: Option<Vec3>,
    pub(super) was_damaged: bool,
    pub(super) wander: WanderState,
    pub(super) corpse: Corpse,
    pub(super) pending: Vec<AgentEvent>,
    pub(super) rng: ChaCha8Rng,
}

impl Agent {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn archetype(&self) -> &str {
        &self.archetype
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn is_dead(&self) -> bool {
        self.state == AgentState::Dead
    }

    pub fn is_executing(&self) -> bool {
        self.executing.is_some()
    }

    pub fn executing(&self) -> Option<usize> {
        self.executing
    }

    pub fn actions(&self) -> &[Box<dyn CombatAction>] {
        &self.actions
    }

    pub fn triggers(&self) -> &[Box<dyn AngerTrigger>] {
        &self.triggers
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    pub fn collaborators_mut(&mut self) -> &mut Collaborators {
        &mut self.collaborators
    }

    pub fn spawn_position(&self) -> Vec3 {
        self.spawn_position
    }

    pub fn position(&self) -> Vec3 {
        self.collaborators.position().unwrap_or(self.spawn_position)
    }

    pub fn forward(&self) -> Vec3 {
        self.collaborators.forward().unwrap_or(Vec3::Z)
    }

    pub fn last_known_target(&self) -> Option<Vec3> {
        self.last_known_target
    }

    pub fn death_config(&self) -> &DeathConfig {
        &self.death
    }

    pub fn despawn_mode(&self) -> DespawnMode {
        if self.death.recycle {
            DespawnMode::ReturnToPool
        } else {
            DespawnMode::Destroy
        }
    }

    /// Advance the agent by one frame.
    pub fn tick(&mut self, delta: f32) -> TickReport {
        let mut events = std::mem::take(&mut self.pending);
        let delta = if delta.is_finite() && delta > 0.0 {
            delta
        } else {
            0.0
        };

        if self.state == AgentState::Dead {
            self.tick_corpse(delta, &mut events);
            self.was_damaged = false;
            return TickReport { events };
        }

        self.collaborators.advance(delta);
        let mut view = self.view(delta);
        if view.perceives_target {
            self.last_known_target = self
                .collaborators
                .target_last_known_position()
                .or(view.target_position);
            view.last_known_target = self.last_known_target;
        }

        if matches!(self.state, AgentState::Idle | AgentState::Searching)
            && self.poll_triggers(&view)
        {
            self.enter_hostile(&mut events);
        }

        for action in &mut self.actions {
            action.tick_cooldown(delta);
        }

        if let Some(index) = self.executing {
            self.step_action(index, &view, &mut events);
        }

        match self.state {
            AgentState::Idle => self.run_idle(&view),
            AgentState::Hostile => self.run_hostile(&view, &mut events),
            AgentState::Searching => self.run_search(&view, &mut events),
            AgentState::Dead => {}
        }

        self.was_damaged = false;
        TickReport { events }
    }

    /// Damage sink. Returns the damage actually taken.
    ///
    /// Non-positive or non-finite amounts, and any damage to a dead agent,
    /// change nothing.
    pub fn apply_damage(&mut self, amount: f32) -> f32 {
        if self.state == AgentState::Dead || !(amount.is_finite() && amount > 0.0) {
            return 0.0;
        }
        let taken = amount.min(self.health);
        self.health -= taken;
        self.was_damaged = true;

        if self.health <= 0.0 {
            self.health = 0.0;
            let mut events = std::mem::take(&mut self.pending);
            self.die(DeathCause::Damage, &mut events);
            self.pending = events;
        }
        taken
    }

    /// Start the action at `index` now, if it and the agent are ready.
    pub fn try_execute(&mut self, index: usize) -> Result<(), ExecuteError> {
        if self.state == AgentState::Dead {
            return Err(ExecuteError::Dead);
        }
        if index >= self.actions.len() {
            return Err(ExecuteError::UnknownAction(index));
        }
        if self.executing.is_some() {
            return Err(ExecuteError::Busy);
        }

        let view = self.view(0.0);
        let mut events = std::mem::take(&mut self.pending);
        let result = self.start_action(index, &view, &mut events);
        self.pending = events;
        result.map_err(ExecuteError::from)
    }

    /// Cancel whatever is executing, then start the action at `index`.
    pub fn preempt(&mut self, index: usize) -> Result<(), ExecuteError> {
        if self.state == AgentState::Dead {
            return Err(ExecuteError::Dead);
        }
        if index >= self.actions.len() {
            return Err(ExecuteError::UnknownAction(index));
        }
        if let Some(current) = self.executing.take() {
            self.actions[current].abort(&mut self.collaborators);
            let kind = self.actions[current].kind();
            self.pending.push(AgentEvent::ActionFinished {
                index: current,
                kind,
                status: ActionStatus::Aborted,
            });
        }
        self.try_execute(index)
    }

    /// The agent's body hit something. Armed kamikaze actions explode.
    pub fn notify_collision(&mut self) -> bool {
        if self.state == AgentState::Dead {
            return false;
        }
        let view = self.view(0.0);
        let mut effects = Vec::new();
        let mut reacted = false;
        for action in &mut self.actions {
            let mut ctx = ActionContext {
                view,
                collaborators: &mut self.collaborators,
                effects: &mut effects,
                rng: &mut self.rng,
            };
            reacted |= action.notify_collision(&mut ctx);
        }

        let mut events = std::mem::take(&mut self.pending);
        if let Some(index) = self.executing {
            if !self.actions[index].is_running() {
                self.executing = None;
                events.push(AgentEvent::ActionFinished {
                    index,
                    kind: self.actions[index].kind(),
                    status: ActionStatus::Completed,
                });
            }
        }
        self.apply_effects(effects, &mut events);
        self.pending = events;
        reacted
    }

    /// A subordinate summoned by one of this agent's actions is gone.
    pub fn release_summon(&mut self, id: SummonId) -> bool {
        self.actions
            .iter_mut()
            .any(|action| action.release_summon(id))
    }

    /// Restore a freshly spawned state at `spawn_position`: full health,
    /// Idle, cooldowns ready, one-shot triggers re-armed, timers cleared.
    pub fn reset(&mut self, spawn_position: Vec3) {
        for action in &mut self.actions {
            action.reset();
        }
        for trigger in &mut self.triggers {
            trigger.reset();
        }
        self.health = self.max_health;
        self.state = AgentState::Idle;
        self.hostility.clear();
        self.search_timer.clear();
        self.executing = None;
        self.spawn_position = spawn_position;
        self.last_known_target = None;
        self.was_damaged = false;
        self.wander = WanderState::default();
        self.corpse = Corpse::default();
        self.pending.clear();

        self.collaborators.land();
        self.place_at(spawn_position);
        self.collaborators.stop();
        self.collaborators.take_animation_commands();
    }

    /// Warp to `point`, or to the closest navigable point near it. The
    /// spawn position follows wherever the agent actually ends up.
    fn place_at(&mut self, point: Vec3) {
        let placed = self.collaborators.warp(point)
            || self
                .collaborators
                .sample_near(point, RESPAWN_SNAP_DISTANCE)
                .is_some_and(|snapped| self.collaborators.warp(snapped));
        if !placed {
            warn!("{}: cannot respawn at {:?}, staying put", self.name, point);
        }
        self.spawn_position = self.collaborators.position().unwrap_or(point);
    }

    fn view(&self, delta: f32) -> AgentView {
        let position = self.position();
        let forward = self.forward();
        let perceives_target = self.collaborators.perceives(&Pose { position, forward });
        AgentView {
            delta,
            position,
            forward,
            spawn_position: self.spawn_position,
            target_position: self.collaborators.target_position(),
            target_forward: self.collaborators.target_forward(),
            last_known_target: self.last_known_target,
            perceives_target,
            was_damaged: self.was_damaged,
            health: self.health,
            max_health: self.max_health,
        }
    }

    /// First trigger to fire wins; the rest are skipped this tick.
    fn poll_triggers(&mut self, view: &AgentView) -> bool {
        self.triggers
            .iter_mut()
            .any(|trigger| trigger.should_trigger(view))
    }

    fn set_state(&mut self, to: AgentState, events: &mut Vec<AgentEvent>) {
        let from = self.state;
        if from == to {
            return;
        }
        if from == AgentState::Hostile {
            self.abort_all(events);
            self.collaborators.set_bool("Running", false);
        }
        self.state = to;
        debug!("{} {:?} -> {:?}", self.name, from, to);
        events.push(AgentEvent::StateChanged { from, to });
    }

    fn enter_hostile(&mut self, events: &mut Vec<AgentEvent>) {
        self.set_state(AgentState::Hostile, events);
        self.hostility.reset(self.anger_duration);
        self.collaborators.set_bool("Walking", false);
    }

    fn abort_all(&mut self, events: &mut Vec<AgentEvent>) {
        if let Some(index) = self.executing.take() {
            events.push(AgentEvent::ActionFinished {
                index,
                kind: self.actions[index].kind(),
                status: ActionStatus::Aborted,
            });
        }
        for action in &mut self.actions {
            action.abort(&mut self.collaborators);
        }
    }

    fn run_idle(&mut self, view: &AgentView) {
        if self.executing.is_some() {
            return;
        }
        self.idle
            .run(&mut self.wander, view, &mut self.collaborators, &mut self.rng);
    }

    fn run_hostile(&mut self, view: &AgentView, events: &mut Vec<AgentEvent>) {
        if view.target_position.is_none() {
            self.set_state(AgentState::Idle, events);
            return;
        }

        if view.perceives_target {
            self.hostility.reset(self.anger_duration);
        } else {
            self.hostility.tick(view.delta);
        }
        if self.hostility.is_expired() {
            if self.search.is_some() {
                self.enter_search(view, events);
            } else {
                self.set_state(AgentState::Idle, events);
            }
            return;
        }

        if self.executing.is_some() {
            return;
        }
        if self.actions.is_empty() {
            behavior::run_away(view, &mut self.collaborators, FLEE_DISTANCE);
            return;
        }

        let ready: Vec<usize> = (0..self.actions.len())
            .filter(|&index| self.actions[index].is_ready())
            .collect();
        if !ready.is_empty() {
            let choice = ready[self.rng.gen_range(0..ready.len())];
            match self.start_action(choice, view, events) {
                Ok(()) => return,
                Err(error) => {
                    debug!("{}: {} refused: {}", self.name, self.actions[choice].name(), error);
                }
            }
        }

        // Nothing ready: close in using whichever action is back first as the hint.
        let hint = self
            .actions
            .iter()
            .min_by(|a, b| {
                a.cooldown()
                    .remaining_secs()
                    .total_cmp(&b.cooldown().remaining_secs())
            })
            .map(|action| action.range());
        self.reaction.apply(view, &mut self.collaborators, hint);
    }

    fn enter_search(&mut self, view: &AgentView, events: &mut Vec<AgentEvent>) {
        let Some(search) = self.search.clone() else {
            self.set_state(AgentState::Idle, events);
            return;
        };
        let Some(last_known) = view.last_known_target.or(self.last_known_target) else {
            self.set_state(AgentState::Idle, events);
            return;
        };
        self.set_state(AgentState::Searching, events);
        self.search_timer.reset(search.duration);
        self.collaborators.move_toward(last_known);
        self.collaborators.set_bool("Walking", true);
    }

    fn run_search(&mut self, view: &AgentView, events: &mut Vec<AgentEvent>) {
        if view.perceives_target {
            self.enter_hostile(events);
            return;
        }

        self.search_timer.tick(view.delta);
        if self.search_timer.is_expired() {
            self.set_state(AgentState::Idle, events);
            self.collaborators.set_bool("Walking", false);
            return;
        }

        let (Some(search), Some(center)) = (self.search.as_ref(), self.last_known_target) else {
            return;
        };
        if self.collaborators.has_arrived(ARRIVAL_TOLERANCE) {
            if let Some(point) =
                behavior::sample_around(&self.collaborators, &mut self.rng, center, search.radius)
            {
                self.collaborators.move_toward(point);
            }
        }
    }

    fn start_action(
        &mut self,
        index: usize,
        view: &AgentView,
        events: &mut Vec<AgentEvent>,
    ) -> Result<(), ActionError> {
        let mut effects = Vec::new();
        let action = &mut self.actions[index];
        let kind = action.kind();
        let status = action.execute(&mut ActionContext {
            view: *view,
            collaborators: &mut self.collaborators,
            effects: &mut effects,
            rng: &mut self.rng,
        })?;

        debug!("{} starts {}", self.name, kind.label());
        events.push(AgentEvent::ActionStarted { index, kind });
        if status == ActionStatus::Running {
            self.executing = Some(index);
        } else {
            events.push(AgentEvent::ActionFinished {
                index,
                kind,
                status,
            });
        }
        self.apply_effects(effects, events);
        Ok(())
    }

    fn step_action(&mut self, index: usize, view: &AgentView, events: &mut Vec<AgentEvent>) {
        let mut effects = Vec::new();
        let action = &mut self.actions[index];
        let kind = action.kind();
        let status = action.step(&mut ActionContext {
            view: *view,
            collaborators: &mut self.collaborators,
            effects: &mut effects,
            rng: &mut self.rng,
        });

        if status != ActionStatus::Running {
            self.executing = None;
            events.push(AgentEvent::ActionFinished {
                index,
                kind,
                status,
            });
        }
        self.apply_effects(effects, events);
    }

    fn apply_effects(&mut self, effects: Vec<ActionEffect>, events: &mut Vec<AgentEvent>) {
        for effect in effects {
            match effect {
                ActionEffect::SelfDestruct => self.self_destruct(events),
                other => events.push(AgentEvent::Effect(other)),
            }
        }
    }

    /// Dies on the spot without loot and is removed immediately.
    fn self_destruct(&mut self, events: &mut Vec<AgentEvent>) {
        if self.state == AgentState::Dead {
            return;
        }
        self.health = 0.0;
        self.die(DeathCause::SelfDestruct, events);
        self.corpse.looted = true;
        self.corpse.removed = true;
        events.push(AgentEvent::Despawn(self.despawn_mode()));
    }

    fn die(&mut self, cause: DeathCause, events: &mut Vec<AgentEvent>) {
        self.abort_all(events);
        self.collaborators.stop();
        self.collaborators.set_bool("Running", false);

        let from = self.state;
        self.state = AgentState::Dead;
        events.push(AgentEvent::StateChanged {
            from,
            to: AgentState::Dead,
        });
        self.collaborators.trigger("Death");
        events.push(AgentEvent::Died(cause));
        debug!("{} died ({:?})", self.name, cause);

        self.corpse = Corpse {
            loot: Countdown::new(self.death.loot_delay),
            despawn: Countdown::new(self.death.despawn_delay),
            looted: false,
            removed: false,
        };
    }

    fn tick_corpse(&mut self, delta: f32, events: &mut Vec<AgentEvent>) {
        self.corpse.loot.tick(delta);
        self.corpse.despawn.tick(delta);

        if !self.corpse.looted && self.corpse.loot.is_expired() {
            self.corpse.looted = true;
            let drops = self.loot.roll(&mut self.rng);
            if !drops.is_empty() {
                events.push(AgentEvent::LootDropped(drops));
            }
        }
        if !self.corpse.removed && self.corpse.despawn.is_expired() {
            self.corpse.removed = true;
            events.push(AgentEvent::Despawn(self.despawn_mode()));
        }
    }
}
