//! Phase bookkeeping and helpers shared by the action implementations.

use bevy::prelude::*;

use super::ActionContext;
use crate::agents::behavior;
use crate::core::Countdown;

/// The current phase of a running action and how long it may last.
#[derive(Debug, Clone)]
pub(crate) struct Task<P> {
    phase: P,
    wait: Countdown,
}

impl<P: Copy> Task<P> {
    pub fn new(phase: P, seconds: f32) -> Self {
        Self {
            phase,
            wait: Countdown::new(seconds),
        }
    }

    pub fn phase(&self) -> P {
        self.phase
    }

    pub fn enter(&mut self, phase: P, seconds: f32) {
        self.phase = phase;
        self.wait.reset(seconds);
    }

    pub fn tick(&mut self, delta: f32) {
        self.wait.tick(delta);
    }

    /// The current phase's wait has run out.
    pub fn done(&self) -> bool {
        self.wait.is_expired()
    }
}

/// Outcome of one approach tick.
pub(crate) enum Approach {
    /// Within range of the target at this position
    InRange(Vec3),
    Closing,
    /// Target vanished
    Lost,
}

/// Chase the target until within `range`.
pub(crate) fn approach(ctx: &mut ActionContext, range: f32) -> Approach {
    let Some(target) = ctx.view.target_position else {
        return Approach::Lost;
    };
    if ctx.view.position.distance(target) <= range {
        return Approach::InRange(target);
    }
    behavior::chase(&ctx.view, ctx.collaborators, range);
    Approach::Closing
}

/// Stop, face the target and fire the animation trigger.
pub(crate) fn commit(ctx: &mut ActionContext, target: Vec3, trigger: &str) {
    ctx.collaborators.stop();
    ctx.collaborators.face(target);
    ctx.collaborators.set_bool("Running", false);
    ctx.collaborators.trigger(trigger);
}

/// Leave whatever the approach started.
pub(crate) fn stand_down(ctx: &mut ActionContext) {
    ctx.collaborators.stop();
    ctx.collaborators.set_bool("Running", false);
}

/// Rotation about Y that turns +Z into `forward`.
pub(crate) fn yaw(forward: Vec3) -> Quat {
    let flat = Vec3::new(forward.x, 0.0, forward.z);
    if flat.length_squared() <= f32::EPSILON {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_y(flat.x.atan2(flat.z))
}

/// Horizontal direction from `from` to `to`, or `fallback` if they coincide.
pub(crate) fn facing(from: Vec3, to: Vec3, fallback: Vec3) -> Vec3 {
    let flat = Vec3::new(to.x - from.x, 0.0, to.z - from.z).normalize_or_zero();
    if flat == Vec3::ZERO {
        fallback
    } else {
        flat
    }
}

/// `offset` expressed in the local frame of something at `position`
/// facing `forward` (x right, y up, z forward).
pub(crate) fn local_to_world(position: Vec3, forward: Vec3, offset: Vec3) -> Vec3 {
    position + yaw(forward) * offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaw_maps_z_onto_forward() {
        for forward in [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z] {
            let rotated = yaw(forward) * Vec3::Z;
            assert!(rotated.distance(forward) < 1e-5, "{forward:?} -> {rotated:?}");
        }
    }

    #[test]
    fn local_offsets_follow_facing() {
        let world = local_to_world(Vec3::ZERO, Vec3::X, Vec3::new(0.0, 1.0, 1.0));
        assert!(world.distance(Vec3::new(1.0, 1.0, 0.0)) < 1e-5);
    }

    #[test]
    fn task_phases_wait_their_turn() {
        let mut task = Task::new(1u8, 0.5);
        task.tick(0.25);
        assert!(!task.done());
        task.tick(0.25);
        assert!(task.done());

        task.enter(2, 0.0);
        assert_eq!(task.phase(), 2);
        assert!(task.done());
    }
}
