//! What an agent does when it is not attacking: fallback reactions while
//! hostile, idle routines, searching and corpse timings.

use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;

use super::AgentView;
use crate::core::Countdown;
use crate::providers::Collaborators;

/// Close enough to a destination to count as arrived.
pub const ARRIVAL_TOLERANCE: f32 = 0.5;
/// Bounded sampling for wander and search destinations.
pub const SAMPLE_ATTEMPTS: u32 = 10;
/// How far an agent with no attacks flees.
pub const FLEE_DISTANCE: f32 = 10.0;

/// Movement while hostile and no action is ready.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum HostileReaction {
    /// Close in, stopping at `stop_distance` (default: range of the
    /// action that comes off cooldown first).
    Chase {
        #[serde(default)]
        stop_distance: Option<f32>,
    },
    /// Hover between `retreat_below` and `ideal`.
    KeepDistance { ideal: f32, retreat_below: f32 },
    /// Hold position and track the target.
    StandStill,
    RunAway { distance: f32 },
}

impl Default for HostileReaction {
    fn default() -> Self {
        HostileReaction::Chase {
            stop_distance: None,
        }
    }
}

impl HostileReaction {
    pub fn apply(&self, view: &AgentView, collaborators: &mut Collaborators, range_hint: Option<f32>) {
        match *self {
            HostileReaction::Chase { stop_distance } => {
                let stop = stop_distance.or(range_hint).unwrap_or(ARRIVAL_TOLERANCE);
                chase(view, collaborators, stop);
            }
            HostileReaction::KeepDistance {
                ideal,
                retreat_below,
            } => keep_distance(view, collaborators, ideal, retreat_below),
            HostileReaction::StandStill => stand_still(view, collaborators),
            HostileReaction::RunAway { distance } => run_away(view, collaborators, distance),
        }
    }
}

fn show_running(collaborators: &mut Collaborators, running: bool) {
    collaborators.set_bool("Running", running);
    collaborators.set_bool("Idle", !running);
}

pub(crate) fn chase(view: &AgentView, collaborators: &mut Collaborators, stop_distance: f32) {
    let Some(target) = view.target_position else {
        return;
    };
    if view.position.distance(target) > stop_distance {
        collaborators.move_toward(target);
        collaborators.face(target);
        show_running(collaborators, true);
    } else {
        collaborators.stop();
        show_running(collaborators, false);
    }
}

pub(crate) fn keep_distance(
    view: &AgentView,
    collaborators: &mut Collaborators,
    ideal: f32,
    retreat_below: f32,
) {
    let Some(distance) = view.distance_to_target() else {
        return;
    };
    if distance > ideal {
        chase(view, collaborators, ideal);
    } else if distance < retreat_below {
        run_away(view, collaborators, FLEE_DISTANCE);
    } else {
        stand_still(view, collaborators);
        show_running(collaborators, false);
    }
}

pub(crate) fn run_away(view: &AgentView, collaborators: &mut Collaborators, distance: f32) {
    let Some(threat) = view.target_position else {
        return;
    };
    let mut away = Vec3::new(view.position.x - threat.x, 0.0, view.position.z - threat.z)
        .normalize_or_zero();
    if away == Vec3::ZERO {
        away = -view.forward;
    }
    let flee_to = view.position + away * distance;
    collaborators.move_toward(flee_to);
    collaborators.face(flee_to);
    show_running(collaborators, true);
}

pub(crate) fn stand_still(view: &AgentView, collaborators: &mut Collaborators) {
    collaborators.stop();
    if let Some(target) = view.target_position {
        collaborators.face(target);
    }
}

/// Wander tunables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WanderConfig {
    pub radius: f32,
    pub min_pause: f32,
    pub max_pause: f32,
    /// Pick destinations around the spawn point rather than the current position
    pub near_spawn: bool,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            radius: 10.0,
            min_pause: 0.0,
            max_pause: 10.0,
            near_spawn: false,
        }
    }
}

/// Routine while calm.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub enum IdleBehavior {
    #[default]
    Stand,
    /// Walk back to the spawn point if pushed or lured away.
    ReturnToSpawn,
    Wander(WanderConfig),
}

/// Per-agent wander bookkeeping.
#[derive(Debug, Clone)]
pub struct WanderState {
    standing: bool,
    pause: Countdown,
}

impl Default for WanderState {
    fn default() -> Self {
        Self {
            standing: true,
            pause: Countdown::ready(),
        }
    }
}

impl IdleBehavior {
    pub fn run<R: Rng + ?Sized>(
        &self,
        state: &mut WanderState,
        view: &AgentView,
        collaborators: &mut Collaborators,
        rng: &mut R,
    ) {
        match self {
            IdleBehavior::Stand => {
                collaborators.set_bool("Idle", true);
            }
            IdleBehavior::ReturnToSpawn => {
                let away = view.position.distance(view.spawn_position) > ARRIVAL_TOLERANCE;
                if away {
                    collaborators.move_toward(view.spawn_position);
                } else {
                    collaborators.stop();
                }
                collaborators.set_bool("Idle", !away);
                collaborators.set_bool("Walking", away);
            }
            IdleBehavior::Wander(config) => wander(config, state, view, collaborators, rng),
        }
    }
}

fn wander<R: Rng + ?Sized>(
    config: &WanderConfig,
    state: &mut WanderState,
    view: &AgentView,
    collaborators: &mut Collaborators,
    rng: &mut R,
) {
    if !state.standing {
        if collaborators.has_arrived(ARRIVAL_TOLERANCE) {
            state.standing = true;
            let low = config.min_pause.min(config.max_pause).max(0.0);
            let high = config.max_pause.max(config.min_pause).max(low);
            state.pause.reset(rng.gen_range(low..=high));
        }
        return;
    }

    state.pause.tick(view.delta);
    collaborators.set_bool("Walking", false);
    collaborators.set_bool("Idle", true);
    if !state.pause.is_expired() {
        return;
    }

    let origin = if config.near_spawn {
        view.spawn_position
    } else {
        view.position
    };
    let destination = sample_around(collaborators, rng, origin, config.radius).unwrap_or(origin);
    collaborators.move_toward(destination);
    state.standing = false;
    collaborators.set_bool("Walking", true);
    collaborators.set_bool("Idle", false);
}

/// A reachable point within `radius` of `origin`, trying a bounded number
/// of random candidates.
pub(crate) fn sample_around<R: Rng + ?Sized>(
    collaborators: &Collaborators,
    rng: &mut R,
    origin: Vec3,
    radius: f32,
) -> Option<Vec3> {
    let radius = radius.max(0.0);
    (0..SAMPLE_ATTEMPTS).find_map(|_| {
        let angle: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
        let distance = rng.gen_range(0.0..=radius);
        let candidate = origin + Vec3::new(angle.cos(), 0.0, angle.sin()) * distance;
        collaborators.sample_near(candidate, radius)
    })
}

/// Investigating the last known target position after losing it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Give up after this long
    pub duration: f32,
    /// How far around the last known position to look
    pub radius: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            duration: 15.0,
            radius: 15.0,
        }
    }
}

/// Corpse timings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeathConfig {
    /// Time between death and the loot roll
    pub loot_delay: f32,
    /// Time between death and removal
    pub despawn_delay: f32,
    /// Return to the pool instead of being destroyed
    pub recycle: bool,
}

impl Default for DeathConfig {
    fn default() -> Self {
        Self {
            loot_delay: 3.0,
            despawn_delay: 10.0,
            recycle: true,
        }
    }
}
