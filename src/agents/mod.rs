//! Agents module - the combat agent state machine and its ECS host.

mod agent;
pub(crate) mod behavior;
mod builder;
pub mod data;
mod events;
mod plugin;
mod pool;
mod spawning;
mod systems;
mod view;

pub use agent::{
    Agent, AgentEvent, AgentState, DeathCause, DespawnMode, ExecuteError, TickReport,
};
pub use behavior::{
    DeathConfig, HostileReaction, IdleBehavior, SearchConfig, WanderConfig, WanderState,
};
pub use builder::{AgentBuilder, DEFAULT_ANGER_DURATION, MIN_MAX_HEALTH};
pub use data::{AgentDataPath, ArchetypeDefinition, ArchetypeRegistry};
pub use events::{AgentCollision, AgentStateChanged, AnimationEvent, LootDropped};
pub use plugin::AgentPlugin;
pub use pool::{AgentPool, Pooled};
pub use spawning::{ArenaLayout, SharedTarget, SpawnAgent, SummonedBy};
pub use systems::{AgentTarget, PendingDespawn};
pub use view::AgentView;
