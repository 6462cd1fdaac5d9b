//! End-to-end agent scenarios driven by hand with a fixed frame delta.

use bevy::prelude::*;

use agent_combat::actions::{
    ActionEffect, ActionError, ActionProfile, CombatAction, MeleeAttack, MeleeConfig,
};
use agent_combat::agents::{Agent, AgentBuilder, AgentEvent, AgentState, ExecuteError};
use agent_combat::combat::{Health, Hitbox};
use agent_combat::providers::{
    AnimationCommand, AnimationQueue, Collaborators, KinematicMover, PerceptionConfig,
    SightPerception, TargetHandle,
};
use agent_combat::triggers::{AlwaysOnSight, AngerTrigger, ProximityDuration};

const DT: f32 = 0.25;

fn collaborators(position: Vec3, target: &TargetHandle, hearing_radius: f32) -> Collaborators {
    let perception = PerceptionConfig {
        hearing_radius,
        ..default()
    };
    Collaborators::new()
        .with_movement(KinematicMover::new(position, 3.0))
        .with_perception(SightPerception::new(perception, target.clone()))
        .with_animation(AnimationQueue::new())
}

fn brawler(target: &TargetHandle) -> Agent {
    AgentBuilder::new("brawler", 100.0)
        .with_trigger(AlwaysOnSight::new())
        .with_action(MeleeAttack::new(MeleeConfig {
            profile: ActionProfile {
                range: 2.0,
                cooldown: 5.0,
                damage: 20.0,
                ..default()
            },
            ..default()
        }))
        .with_collaborators(collaborators(Vec3::ZERO, target, 5.0))
        .with_seed(11)
        .build()
}

#[test]
fn melee_strikes_then_waits_out_its_cooldown() {
    let target_position = Vec3::new(0.0, 0.0, 1.0);
    let target = TargetHandle::at(target_position);
    let mut agent = brawler(&target);
    let mut player = Health::new(100.0);

    let mut starts = Vec::new();
    let mut hitboxes = Vec::new();
    for tick in 1..=24 {
        let report = agent.tick(DT);
        if report.started_actions() > 0 {
            starts.push(tick);
        }
        for effect in report.effects() {
            if let ActionEffect::SpawnHitbox(spec) = effect {
                hitboxes.push(Hitbox::from_spec(None, spec));
            }
        }
    }

    // First swing on the tick the agent turns hostile, the next one
    // exactly one cooldown (20 ticks) later.
    assert_eq!(starts, vec![1, 21]);
    assert_eq!(agent.state(), AgentState::Hostile);

    let mut first = hitboxes.remove(0);
    let center = agent.position() + Vec3::new(0.0, 1.0, 1.0);
    if let Some(amount) = first.try_hit(center, target_position, 0.5) {
        player.take_damage(amount);
    }
    assert_eq!(player.current, 80.0);
    assert!(first.try_hit(center, target_position, 0.5).is_none());
}

#[test]
fn execution_is_refused_until_the_cooldown_runs_out() {
    let target = TargetHandle::at(Vec3::new(0.0, 0.0, 1.0));
    let mut agent = AgentBuilder::new("sparring", 100.0)
        .with_action(MeleeAttack::new(MeleeConfig {
            profile: ActionProfile {
                cooldown: 5.0,
                ..default()
            },
            ..default()
        }))
        .with_collaborators(collaborators(Vec3::ZERO, &target, 5.0))
        .build();
    agent.try_execute(0).unwrap();

    let mut elapsed = 0.0;
    loop {
        agent.tick(0.125);
        elapsed += 0.125;
        assert!(elapsed <= 10.0, "cooldown never ran out");
        if agent.is_executing() {
            continue;
        }
        let remaining = agent.actions()[0].cooldown().remaining_secs();
        match agent.try_execute(0) {
            Ok(()) => {
                assert_eq!(remaining, 0.0);
                break;
            }
            Err(error) => {
                assert!(remaining > 0.0);
                assert!(matches!(
                    error,
                    ExecuteError::Action(ActionError::CoolingDown { .. })
                ));
            }
        }
    }
    assert_eq!(elapsed, 5.0);
}

#[test]
fn lingering_in_range_provokes_after_the_required_time() {
    let target = TargetHandle::at(Vec3::new(3.0, 0.0, 0.0));
    let mut agent = AgentBuilder::new("watcher", 40.0)
        .with_trigger(ProximityDuration::new(5.0, 2.0))
        .with_collaborators(collaborators(Vec3::ZERO, &target, 0.0))
        .build();

    let mut hostile_at = None;
    for tick in 1..=12 {
        if agent.tick(DT).entered(AgentState::Hostile) {
            hostile_at = Some(tick);
            break;
        }
    }
    assert_eq!(hostile_at, Some(8));
}

#[test]
fn stepping_out_of_range_restarts_the_clock() {
    let target = TargetHandle::at(Vec3::new(3.0, 0.0, 0.0));
    let mut agent = AgentBuilder::new("watcher", 40.0)
        .with_trigger(ProximityDuration::new(5.0, 2.0))
        .with_collaborators(collaborators(Vec3::ZERO, &target, 0.0))
        .build();

    for _ in 0..6 {
        assert!(!agent.tick(DT).entered(AgentState::Hostile));
    }
    target.set_position(Vec3::new(30.0, 0.0, 0.0));
    agent.tick(DT);
    target.set_position(Vec3::new(3.0, 0.0, 0.0));

    let mut ticks = 0;
    while !agent.tick(DT).entered(AgentState::Hostile) {
        ticks += 1;
        assert!(ticks < 20, "never turned hostile");
    }
    assert_eq!(ticks + 1, 8);
}

#[test]
fn one_shot_trigger_fires_once_per_life() {
    let target = TargetHandle::at(Vec3::new(0.0, 0.0, 2.0));
    let mut agent = AgentBuilder::new("coward", 40.0)
        .with_trigger(AlwaysOnSight::new())
        .with_collaborators(collaborators(Vec3::ZERO, &target, 100.0))
        .with_anger_duration(0.5)
        .build();

    let mut hostile = 0;
    for _ in 0..40 {
        let report = agent.tick(DT);
        if report.entered(AgentState::Hostile) {
            hostile += 1;
            // Gone, so hostility lapses back to Idle.
            target.clear();
        } else if agent.state() == AgentState::Idle {
            target.set_position(Vec3::new(0.0, 0.0, 2.0));
        }
    }
    assert_eq!(hostile, 1);
    assert!(agent.triggers()[0].has_fired());
}

#[test]
fn dead_agents_ignore_further_damage() {
    let target = TargetHandle::at(Vec3::new(0.0, 0.0, 1.0));
    let mut agent = brawler(&target);
    agent.tick(DT);

    assert_eq!(agent.apply_damage(250.0), 100.0);
    assert_eq!(agent.apply_damage(10.0), 0.0);
    assert!(agent.try_execute(0).is_err());

    let report = agent.tick(DT);
    let deaths = report
        .events
        .iter()
        .filter(|event| matches!(event, AgentEvent::Died(_)))
        .count();
    assert_eq!(deaths, 1);
    assert!(!agent.is_executing());
    assert_eq!(agent.health(), 0.0);

    let animations = agent.collaborators_mut().take_animation_commands();
    assert!(animations.contains(&AnimationCommand::Trigger("Death".into())));
}

#[test]
fn health_stays_within_bounds() {
    let target = TargetHandle::at(Vec3::new(0.0, 0.0, 1.0));
    let mut agent = brawler(&target);
    for amount in [5.0, -3.0, f32::INFINITY, 0.0, 40.0, f32::NAN, 70.0] {
        agent.apply_damage(amount);
        agent.tick(DT);
        assert!(agent.health() >= 0.0 && agent.health() <= agent.max_health());
    }
    assert!(agent.is_dead());
}
