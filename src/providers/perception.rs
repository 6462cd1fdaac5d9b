//! Vision and hearing over a shared target handle.

use std::sync::Arc;

use bevy::prelude::*;
use parking_lot::RwLock;
use serde::Deserialize;

use super::{PerceptionProvider, Pose};

/// Snapshot of the thing agents hunt (usually the player).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetState {
    pub position: Vec3,
    pub forward: Vec3,
    /// False once the target has died or been despawned.
    pub present: bool,
}

impl Default for TargetState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::Z,
            present: false,
        }
    }
}

/// Cheap, cloneable handle to the shared target state.
///
/// The host writes into it once per frame; every agent's perception reads it.
#[derive(Debug, Clone, Default)]
pub struct TargetHandle(Arc<RwLock<TargetState>>);

impl TargetHandle {
    pub fn at(position: Vec3) -> Self {
        Self(Arc::new(RwLock::new(TargetState {
            position,
            present: true,
            ..default()
        })))
    }

    pub fn get(&self) -> TargetState {
        *self.0.read()
    }

    pub fn set_position(&self, position: Vec3) {
        let mut state = self.0.write();
        state.position = position;
        state.present = true;
    }

    pub fn set_forward(&self, forward: Vec3) {
        self.0.write().forward = forward;
    }

    /// Mark the target as gone (dead or despawned).
    pub fn clear(&self) {
        self.0.write().present = false;
    }

    pub fn position(&self) -> Option<Vec3> {
        let state = self.get();
        state.present.then_some(state.position)
    }
}

/// A sphere that blocks line of sight.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Occluder {
    pub center: [f32; 3],
    pub radius: f32,
}

impl Occluder {
    /// Whether the segment `from -> to` passes through this sphere.
    fn blocks(&self, from: Vec3, to: Vec3) -> bool {
        let center = Vec3::from(self.center);
        let segment = to - from;
        let length_squared = segment.length_squared();
        if length_squared <= f32::EPSILON {
            return from.distance(center) <= self.radius;
        }
        let t = ((center - from).dot(segment) / length_squared).clamp(0.0, 1.0);
        let closest = from + segment * t;
        closest.distance(center) <= self.radius
    }
}

/// Vision and hearing tunables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// How far the agent can see
    pub vision_range: f32,
    /// Full cone angle in degrees (90 means 45 each side)
    pub vision_angle: f32,
    /// Anything closer than this is heard regardless of facing or walls
    pub hearing_radius: f32,
    /// Eye height above the agent's origin
    pub eye_height: f32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            vision_range: 10.0,
            vision_angle: 90.0,
            hearing_radius: 0.0,
            eye_height: 1.6,
        }
    }
}

/// Vision cone + line of sight + hearing radius, unioned.
#[derive(Debug, Clone)]
pub struct SightPerception {
    config: PerceptionConfig,
    target: TargetHandle,
    occluders: Vec<Occluder>,
}

impl SightPerception {
    pub fn new(config: PerceptionConfig, target: TargetHandle) -> Self {
        Self {
            config,
            target,
            occluders: Vec::new(),
        }
    }

    pub fn with_occluders(mut self, occluders: Vec<Occluder>) -> Self {
        self.occluders = occluders;
        self
    }

    fn sees(&self, observer: &Pose, target: Vec3) -> bool {
        let eye = observer.position + Vec3::Y * self.config.eye_height;
        let to_target = target - eye;
        let distance = to_target.length();

        if distance > self.config.vision_range {
            return false;
        }

        let forward = observer.forward.normalize_or_zero();
        if distance > f32::EPSILON && forward != Vec3::ZERO {
            let angle = forward.angle_between(to_target / distance).to_degrees();
            if angle > self.config.vision_angle * 0.5 {
                return false;
            }
        }

        !self.occluders.iter().any(|o| o.blocks(eye, target))
    }

    fn hears(&self, observer: &Pose, target: Vec3) -> bool {
        observer.position.distance(target) <= self.config.hearing_radius
    }
}

impl PerceptionProvider for SightPerception {
    fn can_perceive_target(&self, observer: &Pose) -> bool {
        let Some(target) = self.target.position() else {
            return false;
        };
        self.hears(observer, target) || self.sees(observer, target)
    }

    fn target_last_known_position(&self) -> Option<Vec3> {
        self.target.position()
    }

    fn target_position(&self) -> Option<Vec3> {
        self.target.position()
    }

    fn target_forward(&self) -> Option<Vec3> {
        let state = self.target.get();
        state.present.then_some(state.forward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observer() -> Pose {
        Pose {
            position: Vec3::ZERO,
            forward: Vec3::Z,
        }
    }

    #[test]
    fn sees_target_in_front_within_range() {
        let target = TargetHandle::at(Vec3::new(0.0, 1.6, 5.0));
        let perception = SightPerception::new(PerceptionConfig::default(), target);
        assert!(perception.can_perceive_target(&observer()));
    }

    #[test]
    fn does_not_see_behind_or_too_far() {
        let target = TargetHandle::at(Vec3::new(0.0, 1.6, -5.0));
        let perception = SightPerception::new(PerceptionConfig::default(), target.clone());
        assert!(!perception.can_perceive_target(&observer()));

        target.set_position(Vec3::new(0.0, 1.6, 50.0));
        assert!(!perception.can_perceive_target(&observer()));
    }

    #[test]
    fn hearing_ignores_facing() {
        let config = PerceptionConfig {
            hearing_radius: 3.0,
            ..default()
        };
        let target = TargetHandle::at(Vec3::new(0.0, 0.0, -2.0));
        let perception = SightPerception::new(config, target);
        assert!(perception.can_perceive_target(&observer()));
    }

    #[test]
    fn occluder_blocks_line_of_sight() {
        let target = TargetHandle::at(Vec3::new(0.0, 1.6, 8.0));
        let perception = SightPerception::new(PerceptionConfig::default(), target)
            .with_occluders(vec![Occluder {
                center: [0.0, 1.6, 4.0],
                radius: 1.0,
            }]);
        assert!(!perception.can_perceive_target(&observer()));
    }

    #[test]
    fn cleared_target_is_not_perceived() {
        let target = TargetHandle::at(Vec3::new(0.0, 1.6, 2.0));
        let perception = SightPerception::new(PerceptionConfig::default(), target.clone());
        target.clear();
        assert!(!perception.can_perceive_target(&observer()));
        assert_eq!(perception.target_position(), None);
    }
}
