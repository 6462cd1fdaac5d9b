//! Assembles an [`Agent`] from its parts.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::agent::{Agent, AgentState, Corpse};
use super::behavior::{DeathConfig, HostileReaction, IdleBehavior, SearchConfig, WanderState};
use crate::actions::{ActionConfig, CombatAction};
use crate::combat::LootTable;
use crate::core::Countdown;
use crate::providers::Collaborators;
use crate::triggers::{AngerTrigger, TriggerConfig};

/// Seconds of hostility kept without perceiving the target.
pub const DEFAULT_ANGER_DURATION: f32 = 10.0;

/// Floor for `max_health`; an agent always starts alive.
pub const MIN_MAX_HEALTH: f32 = 1.0;

/// Builder for agents; every part is optional.
///
/// An agent with no triggers never turns hostile on its own, and one with
/// no actions runs away once it does.
pub struct AgentBuilder {
    name: String,
    archetype: String,
    max_health: f32,
    position: Vec3,
    seed: u64,
    actions: Vec<Box<dyn CombatAction>>,
    triggers: Vec<Box<dyn AngerTrigger>>,
    collaborators: Collaborators,
    reaction: HostileReaction,
    idle: IdleBehavior,
    search: Option<SearchConfig>,
    death: DeathConfig,
    loot: LootTable,
    anger_duration: f32,
}

impl AgentBuilder {
    pub fn new(name: impl Into<String>, max_health: f32) -> Self {
        let name = name.into();
        Self {
            archetype: name.clone(),
            name,
            max_health: if max_health.is_finite() {
                max_health.max(MIN_MAX_HEALTH)
            } else {
                MIN_MAX_HEALTH
            },
            position: Vec3::ZERO,
            seed: 0,
            actions: Vec::new(),
            triggers: Vec::new(),
            collaborators: Collaborators::new(),
            reaction: HostileReaction::default(),
            idle: IdleBehavior::default(),
            search: None,
            death: DeathConfig::default(),
            loot: LootTable::default(),
            anger_duration: DEFAULT_ANGER_DURATION,
        }
    }

    pub fn archetype(mut self, archetype: impl Into<String>) -> Self {
        self.archetype = archetype.into();
        self
    }

    /// Spawn position, also the point `ReturnToSpawn` walks back to.
    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_action(mut self, action: impl CombatAction + 'static) -> Self {
        self.actions.push(Box::new(action));
        self
    }

    pub fn with_actions<'a>(mut self, configs: impl IntoIterator<Item = &'a ActionConfig>) -> Self {
        self.actions.extend(configs.into_iter().map(ActionConfig::build));
        self
    }

    pub fn with_trigger(mut self, trigger: impl AngerTrigger + 'static) -> Self {
        self.triggers.push(Box::new(trigger));
        self
    }

    pub fn with_triggers<'a>(
        mut self,
        configs: impl IntoIterator<Item = &'a TriggerConfig>,
    ) -> Self {
        self.triggers
            .extend(configs.into_iter().map(TriggerConfig::build));
        self
    }

    pub fn with_collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }

    pub fn with_reaction(mut self, reaction: HostileReaction) -> Self {
        self.reaction = reaction;
        self
    }

    pub fn with_idle(mut self, idle: IdleBehavior) -> Self {
        self.idle = idle;
        self
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_death(mut self, death: DeathConfig) -> Self {
        self.death = death;
        self
    }

    pub fn with_loot(mut self, loot: LootTable) -> Self {
        self.loot = loot;
        self
    }

    pub fn with_anger_duration(mut self, seconds: f32) -> Self {
        self.anger_duration = seconds;
        self
    }

    pub fn build(self) -> Agent {
        let mut collaborators = self.collaborators;
        collaborators.warp(self.position);

        Agent {
            name: self.name,
            archetype: self.archetype,
            health: self.max_health,
            max_health: self.max_health,
            state: AgentState::Idle,
            actions: self.actions,
            triggers: self.triggers,
            collaborators,
            reaction: self.reaction,
            idle: self.idle,
            search: self.search,
            death: self.death,
            loot: self.loot,
            anger_duration: self.anger_duration,
            hostility: Countdown::ready(),
            search_timer: Countdown::ready(),
            executing: None,
            spawn_position: self.position,
            last_known_target: None,
            was_damaged: false,
            wander: WanderState::default(),
            corpse: Corpse::default(),
            pending: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(self.seed),
        }
    }
}
