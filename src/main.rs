//! Agent Combat - headless demo.
//!
//! Loads the archetypes in `assets/data/agents`, puts a training dummy in
//! an arena with a handful of agents and lets them fight for a while.
//! Run with `RUST_LOG=agent_combat=debug` to watch state changes.

use std::time::Duration;

use bevy::app::{AppExit, ScheduleRunnerPlugin};
use bevy::log::LogPlugin;
use bevy::prelude::*;

use agent_combat::agents::{
    AgentStateChanged, AgentTarget, ArenaLayout, LootDropped, SpawnAgent,
};
use agent_combat::combat::{CombatTarget, Health};
use agent_combat::core::{AgentSet, DeathEvent};
use agent_combat::providers::{NavBounds, Occluder};

/// Simulated seconds before the demo exits.
const DEMO_LENGTH: f32 = 60.0;

fn main() {
    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
        )
        .add_plugins(LogPlugin::default())
        .insert_resource(ArenaLayout {
            bounds: Some(NavBounds::new(Vec2::splat(-20.0), Vec2::splat(20.0))),
            occluders: vec![Occluder {
                center: [6.0, 1.0, 6.0],
                radius: 1.5,
            }],
        })
        .add_plugins(agent_combat::AgentCombatPlugin)
        .add_systems(Startup, setup_arena)
        .add_systems(
            Update,
            (strafe_dummy.before(AgentSet::Sense), report, end_demo),
        )
        .run();
}

/// Spawn the dummy and the opening wave.
fn setup_arena(
    mut commands: Commands,
    mut time: ResMut<Time<Virtual>>,
    mut spawns: EventWriter<SpawnAgent>,
) {
    time.set_relative_speed(4.0);

    commands.spawn((
        AgentTarget,
        CombatTarget::default(),
        Health::new(500.0),
        Transform::from_xyz(0.0, 0.0, 0.0),
    ));

    for (archetype, position) in [
        ("grunt", Vec3::new(4.0, 0.0, 8.0)),
        ("bell_guardian", Vec3::new(-10.0, 0.0, 10.0)),
        ("drum_caller", Vec3::new(12.0, 0.0, -6.0)),
        ("skitter", Vec3::new(-5.0, 0.0, -5.0)),
    ] {
        spawns.send(SpawnAgent {
            facing: (-position).normalize_or_zero(),
            ..SpawnAgent::new(archetype, position)
        });
    }
}

/// Walk the dummy in a slow circle so agents have to keep up.
fn strafe_dummy(time: Res<Time>, mut dummy: Query<&mut Transform, With<AgentTarget>>) {
    let Ok(mut transform) = dummy.get_single_mut() else {
        return;
    };
    let angle = time.elapsed_secs() * 0.2;
    transform.translation = Vec3::new(angle.cos(), 0.0, angle.sin()) * 3.0;
    transform.look_to(Vec3::new(-angle.sin(), 0.0, angle.cos()), Vec3::Y);
}

fn report(
    mut states: EventReader<AgentStateChanged>,
    mut loot: EventReader<LootDropped>,
    mut deaths: EventReader<DeathEvent>,
) {
    for event in states.read() {
        info!("{:?}: {:?} -> {:?}", event.entity, event.from, event.to);
    }
    for event in loot.read() {
        info!("{:?} dropped {:?} at {}", event.entity, event.drops, event.position);
    }
    for event in deaths.read() {
        info!("{:?} died (killed by {:?})", event.entity, event.killed_by);
    }
}

fn end_demo(
    time: Res<Time>,
    dummy: Query<&Health, With<AgentTarget>>,
    mut exit: EventWriter<AppExit>,
) {
    let dummy_dead = dummy.get_single().map_or(true, Health::is_dead);
    if time.elapsed_secs() >= DEMO_LENGTH || dummy_dead {
        info!(
            "Demo over after {:.1}s (dummy {})",
            time.elapsed_secs(),
            if dummy_dead { "destroyed" } else { "survived" }
        );
        exit.send(AppExit::Success);
    }
}
