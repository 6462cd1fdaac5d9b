//! Anger triggers - pluggable conditions that turn a calm agent hostile.
//!
//! The agent polls its triggers in list order once per tick while it is
//! not hostile. The first trigger that fires wins; later triggers are not
//! evaluated that tick.

mod damage;
mod proximity;
mod sight;

use serde::Deserialize;

use crate::agents::AgentView;

pub use damage::OnDamaged;
pub use proximity::ProximityDuration;
pub use sight::{AlwaysOnSight, SustainedSight};

/// Decides whether an agent should escalate to hostile.
pub trait AngerTrigger: Send + Sync {
    fn name(&self) -> &'static str;

    /// Called once per tick while the agent is not hostile.
    fn should_trigger(&mut self, view: &AgentView) -> bool;

    /// Forget timers and fired flags (respawn / pool return).
    fn reset(&mut self);

    /// Whether a one-shot trigger has already been spent.
    fn has_fired(&self) -> bool {
        false
    }
}

/// Trigger configuration as written in archetype files.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum TriggerConfig {
    /// Hostile the first time the target is perceived, once.
    AlwaysOnSight,
    /// Hostile the first tick after taking damage, once.
    OnDamaged,
    /// Hostile after perceiving the target continuously for `required_time`.
    SustainedSight { required_time: f32 },
    /// Hostile after the target stays within `radius` for `required_time`.
    ProximityDuration { radius: f32, required_time: f32 },
}

impl TriggerConfig {
    pub fn build(&self) -> Box<dyn AngerTrigger> {
        match *self {
            TriggerConfig::AlwaysOnSight => Box::new(AlwaysOnSight::new()),
            TriggerConfig::OnDamaged => Box::new(OnDamaged::new()),
            TriggerConfig::SustainedSight { required_time } => {
                Box::new(SustainedSight::new(required_time))
            }
            TriggerConfig::ProximityDuration {
                radius,
                required_time,
            } => Box::new(ProximityDuration::new(radius, required_time)),
        }
    }
}
