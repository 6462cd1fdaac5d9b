//! Read-only snapshot of an agent handed to its strategies each tick.

use bevy::prelude::*;

use crate::providers::Pose;

/// What triggers and actions may look at during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentView {
    /// Frame delta in seconds
    pub delta: f32,
    pub position: Vec3,
    pub forward: Vec3,
    pub spawn_position: Vec3,
    /// `None` when the target is gone or there is no perception provider
    pub target_position: Option<Vec3>,
    pub target_forward: Option<Vec3>,
    pub last_known_target: Option<Vec3>,
    pub perceives_target: bool,
    /// Damage was recorded since the previous tick
    pub was_damaged: bool,
    pub health: f32,
    pub max_health: f32,
}

impl AgentView {
    pub fn distance_to_target(&self) -> Option<f32> {
        self.target_position
            .map(|target| self.position.distance(target))
    }

    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            forward: self.forward,
        }
    }
}

impl Default for AgentView {
    fn default() -> Self {
        Self {
            delta: 0.0,
            position: Vec3::ZERO,
            forward: Vec3::Z,
            spawn_position: Vec3::ZERO,
            target_position: None,
            target_forward: None,
            last_known_target: None,
            perceives_target: false,
            was_damaged: false,
            health: 0.0,
            max_health: 0.0,
        }
    }
}
