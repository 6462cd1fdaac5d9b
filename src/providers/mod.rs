//! Collaborator interfaces an agent consumes.
//!
//! Pathing, perception and animation playback belong to the host engine.
//! Agents only see these narrow traits, injected at construction time.
//! Any of them may be missing; [`Collaborators`] turns every call on a
//! missing provider into a no-op so one misconfigured agent never stops
//! the others.

mod animation;
mod movement;
mod perception;

use bevy::prelude::*;

pub use animation::{AnimationCommand, AnimationQueue};
pub use movement::{KinematicMover, NavBounds};
pub use perception::{Occluder, PerceptionConfig, SightPerception, TargetHandle, TargetState};

/// Where an observer stands and which way it faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub forward: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::Z,
        }
    }
}

/// Waypoint-following movement (a navmesh agent in the original engine).
pub trait MovementProvider: Send + Sync {
    fn position(&self) -> Vec3;

    /// Horizontal facing direction.
    fn forward(&self) -> Vec3;

    /// Integrate one frame of motion.
    fn advance(&mut self, _delta: f32) {}

    fn move_toward(&mut self, point: Vec3);

    fn stop(&mut self);

    fn face_target(&mut self, point: Vec3);

    /// Nearest navigable point within `radius` of `origin`.
    fn sample_reachable_point_near(&self, origin: Vec3, radius: f32) -> Option<Vec3>;

    fn remaining_distance_to_destination(&self) -> f32;

    fn is_path_pending(&self) -> bool;

    /// Instantly reposition. Returns false if the point is not navigable.
    fn warp(&mut self, point: Vec3) -> bool;

    /// Leave the ground with the given velocity.
    fn launch(&mut self, _velocity: Vec3) {}

    /// Return to grounded movement at the current position.
    fn land(&mut self) {}

    fn is_airborne(&self) -> bool {
        false
    }
}

/// Vision and hearing queries about the agent's target.
pub trait PerceptionProvider: Send + Sync {
    /// Vision cone, line of sight and hearing radius, combined.
    fn can_perceive_target(&self, observer: &Pose) -> bool;

    fn target_last_known_position(&self) -> Option<Vec3>;

    /// Current target position; `None` once the target is gone.
    fn target_position(&self) -> Option<Vec3>;

    fn target_forward(&self) -> Option<Vec3> {
        None
    }
}

/// Fire-and-forget animation parameters.
///
/// Names the animation side does not know are silently ignored.
pub trait AnimationSink: Send + Sync {
    fn set_trigger(&mut self, name: &str);

    fn set_bool(&mut self, name: &str, value: bool);

    /// Buffered commands for the host to forward, if this sink buffers.
    fn take_pending(&mut self) -> Vec<AnimationCommand> {
        Vec::new()
    }
}

/// The providers injected into one agent.
#[derive(Default)]
pub struct Collaborators {
    pub movement: Option<Box<dyn MovementProvider>>,
    pub perception: Option<Box<dyn PerceptionProvider>>,
    pub animation: Option<Box<dyn AnimationSink>>,
}

impl Collaborators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_movement(mut self, movement: impl MovementProvider + 'static) -> Self {
        self.movement = Some(Box::new(movement));
        self
    }

    pub fn with_perception(mut self, perception: impl PerceptionProvider + 'static) -> Self {
        self.perception = Some(Box::new(perception));
        self
    }

    pub fn with_animation(mut self, animation: impl AnimationSink + 'static) -> Self {
        self.animation = Some(Box::new(animation));
        self
    }

    pub fn position(&self) -> Option<Vec3> {
        self.movement.as_ref().map(|m| m.position())
    }

    pub fn forward(&self) -> Option<Vec3> {
        self.movement.as_ref().map(|m| m.forward())
    }

    pub fn advance(&mut self, delta: f32) {
        if let Some(movement) = self.movement.as_mut() {
            movement.advance(delta);
        }
    }

    pub fn move_toward(&mut self, point: Vec3) {
        if let Some(movement) = self.movement.as_mut() {
            movement.move_toward(point);
        }
    }

    pub fn stop(&mut self) {
        if let Some(movement) = self.movement.as_mut() {
            movement.stop();
        }
    }

    pub fn face(&mut self, point: Vec3) {
        if let Some(movement) = self.movement.as_mut() {
            movement.face_target(point);
        }
    }

    pub fn sample_near(&self, origin: Vec3, radius: f32) -> Option<Vec3> {
        self.movement
            .as_ref()
            .and_then(|m| m.sample_reachable_point_near(origin, radius))
    }

    /// True when the provider has no path left to walk. A missing provider
    /// counts as arrived.
    pub fn has_arrived(&self, tolerance: f32) -> bool {
        self.movement.as_ref().map_or(true, |m| {
            !m.is_path_pending() && m.remaining_distance_to_destination() <= tolerance
        })
    }

    pub fn warp(&mut self, point: Vec3) -> bool {
        self.movement.as_mut().is_some_and(|m| m.warp(point))
    }

    pub fn launch(&mut self, velocity: Vec3) {
        if let Some(movement) = self.movement.as_mut() {
            movement.launch(velocity);
        }
    }

    pub fn land(&mut self) {
        if let Some(movement) = self.movement.as_mut() {
            movement.land();
        }
    }

    pub fn is_airborne(&self) -> bool {
        self.movement.as_ref().is_some_and(|m| m.is_airborne())
    }

    pub fn perceives(&self, observer: &Pose) -> bool {
        self.perception
            .as_ref()
            .is_some_and(|p| p.can_perceive_target(observer))
    }

    pub fn target_position(&self) -> Option<Vec3> {
        self.perception.as_ref().and_then(|p| p.target_position())
    }

    pub fn target_forward(&self) -> Option<Vec3> {
        self.perception.as_ref().and_then(|p| p.target_forward())
    }

    pub fn target_last_known_position(&self) -> Option<Vec3> {
        self.perception
            .as_ref()
            .and_then(|p| p.target_last_known_position())
    }

    pub fn trigger(&mut self, name: &str) {
        if let Some(animation) = self.animation.as_mut() {
            animation.set_trigger(name);
        }
    }

    pub fn set_bool(&mut self, name: &str, value: bool) {
        if let Some(animation) = self.animation.as_mut() {
            animation.set_bool(name, value);
        }
    }

    pub fn take_animation_commands(&mut self) -> Vec<AnimationCommand> {
        self.animation
            .as_mut()
            .map(|a| a.take_pending())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_providers_are_no_ops() {
        let mut collaborators = Collaborators::new();
        collaborators.move_toward(Vec3::X);
        collaborators.stop();
        collaborators.face(Vec3::X);
        collaborators.trigger("Attack");
        collaborators.set_bool("Running", true);
        collaborators.launch(Vec3::Y);
        collaborators.land();

        assert_eq!(collaborators.position(), None);
        assert_eq!(collaborators.sample_near(Vec3::ZERO, 5.0), None);
        assert!(!collaborators.warp(Vec3::ONE));
        assert!(!collaborators.perceives(&Pose::default()));
        assert!(collaborators.has_arrived(0.5));
        assert!(collaborators.take_animation_commands().is_empty());
    }
}
