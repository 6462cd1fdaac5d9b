//! Straight-line waypoint movement.

use bevy::prelude::*;

use super::MovementProvider;

/// Downward acceleration while airborne.
const GRAVITY: f32 = 9.81;

/// Axis-aligned navigable rectangle on the XZ plane at a fixed ground height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavBounds {
    pub min: Vec2,
    pub max: Vec2,
    pub ground: f32,
}

impl NavBounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
            ground: 0.0,
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.z >= self.min.y
            && point.z <= self.max.y
    }

    /// Closest navigable point to `point`.
    pub fn clamp(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min.x, self.max.x),
            self.ground,
            point.z.clamp(self.min.y, self.max.y),
        )
    }
}

/// Moves straight toward its destination at a fixed speed.
///
/// Optional [`NavBounds`] stand in for a navmesh: destinations and warps
/// outside of them are clamped or rejected. While airborne it follows a
/// ballistic arc and lands on its own when it reaches the ground.
#[derive(Debug, Clone)]
pub struct KinematicMover {
    position: Vec3,
    forward: Vec3,
    destination: Option<Vec3>,
    speed: f32,
    stopped: bool,
    velocity: Vec3,
    airborne: bool,
    bounds: Option<NavBounds>,
}

impl KinematicMover {
    pub fn new(position: Vec3, speed: f32) -> Self {
        Self {
            position,
            forward: Vec3::Z,
            destination: None,
            speed: speed.max(0.0),
            stopped: false,
            velocity: Vec3::ZERO,
            airborne: false,
            bounds: None,
        }
    }

    pub fn with_bounds(mut self, bounds: NavBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn ground(&self) -> f32 {
        self.bounds.map_or(0.0, |b| b.ground)
    }

    fn look_along(&mut self, direction: Vec3) {
        let flat = Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero();
        if flat != Vec3::ZERO {
            self.forward = flat;
        }
    }
}

impl MovementProvider for KinematicMover {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn forward(&self) -> Vec3 {
        self.forward
    }

    fn advance(&mut self, delta: f32) {
        if !(delta.is_finite() && delta > 0.0) {
            return;
        }

        if self.airborne {
            self.velocity.y -= GRAVITY * delta;
            self.position += self.velocity * delta;

            let ground = self.ground();
            if self.position.y <= ground && self.velocity.y <= 0.0 {
                self.position.y = ground;
                self.land();
            }
            return;
        }

        if self.stopped {
            return;
        }

        let Some(destination) = self.destination else {
            return;
        };

        let to_target = destination - self.position;
        let distance = to_target.length();
        let step = self.speed * delta;

        if distance <= step {
            self.position = destination;
            self.destination = None;
        } else {
            let direction = to_target / distance;
            self.position += direction * step;
            self.look_along(direction);
        }
    }

    fn move_toward(&mut self, point: Vec3) {
        if self.airborne {
            return;
        }
        let point = match self.bounds {
            Some(bounds) => bounds.clamp(point),
            None => point,
        };
        self.stopped = false;
        self.destination = Some(point);
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.destination = None;
    }

    fn face_target(&mut self, point: Vec3) {
        self.look_along(point - self.position);
    }

    fn sample_reachable_point_near(&self, origin: Vec3, radius: f32) -> Option<Vec3> {
        match self.bounds {
            None => Some(origin),
            Some(bounds) => {
                let candidate = bounds.clamp(origin);
                let offset = Vec3::new(candidate.x - origin.x, 0.0, candidate.z - origin.z);
                (offset.length() <= radius).then_some(candidate)
            }
        }
    }

    fn remaining_distance_to_destination(&self) -> f32 {
        self.destination
            .map_or(0.0, |destination| destination.distance(self.position))
    }

    fn is_path_pending(&self) -> bool {
        false
    }

    fn warp(&mut self, point: Vec3) -> bool {
        if let Some(bounds) = self.bounds {
            if !bounds.contains(point) {
                return false;
            }
        }
        self.position = point;
        self.destination = None;
        true
    }

    fn launch(&mut self, velocity: Vec3) {
        self.airborne = true;
        self.destination = None;
        self.velocity = velocity;
    }

    fn land(&mut self) {
        if self.airborne {
            self.position.y = self.ground();
        }
        self.airborne = false;
        self.velocity = Vec3::ZERO;
        self.stopped = true;
    }

    fn is_airborne(&self) -> bool {
        self.airborne
    }
}
