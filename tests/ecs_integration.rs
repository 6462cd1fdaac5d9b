//! Headless App tests: agents spawned from archetypes, fighting a dummy.

use std::path::PathBuf;
use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use agent_combat::agents::{
    Agent, AgentDataPath, AgentPool, AgentState, AgentTarget, ArchetypeDefinition,
    ArchetypeRegistry, LootDropped, Pooled, SpawnAgent, SummonedBy,
};
use agent_combat::combat::{CombatTarget, Health};
use agent_combat::core::{AgentSet, DamageEvent, DeathEvent, SimulationRng};
use agent_combat::AgentCombatPlugin;

const GRUNT: &str = r#"(
    name: "Grunt",
    max_health: 50.0,
    perception: (hearing_radius: 5.0),
    triggers: [AlwaysOnSight],
    actions: [Melee((profile: (cooldown: 1.0, damage: 20.0)))],
    idle: Wander((radius: 4.0, max_pause: 1.0)),
    death: (loot_delay: 0.25, despawn_delay: 0.5),
    loot: [(item_id: 5, chance: 1.0)],
)"#;

/// Summons one subordinate at a time, as often as every half second.
const CALLER: &str = r#"(
    name: "Caller",
    max_health: 40.0,
    perception: (hearing_radius: 10.0),
    triggers: [AlwaysOnSight],
    actions: [Summon((
        profile: (range: 20.0, cooldown: 0.5, pre_delay: 0.0, hitbox_duration: 0.25),
        archetype: "minion",
        max_active: 1,
    ))],
    reaction: StandStill,
)"#;

const MINION: &str = r#"(
    name: "Minion",
    max_health: 10.0,
    death: (loot_delay: 0.0, despawn_delay: 0.25, recycle: false),
)"#;

#[derive(Resource, Default)]
struct Recorded {
    deaths: Vec<Entity>,
    loot: usize,
}

fn record(
    mut recorded: ResMut<Recorded>,
    mut deaths: EventReader<DeathEvent>,
    mut loot: EventReader<LootDropped>,
) {
    recorded.deaths.extend(deaths.read().map(|event| event.entity));
    recorded.loot += loot.read().count();
}

/// Helper: headless app stepping a fixed 1/8 s per update.
fn create_app(seed: u64) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(125)))
        .insert_resource(SimulationRng::new(seed))
        .insert_resource(AgentDataPath(PathBuf::from("tests/no-archetypes-here")))
        .add_plugins(AgentCombatPlugin)
        .init_resource::<Recorded>()
        .add_systems(Update, record.after(AgentSet::Cleanup));

    let definition = ArchetypeDefinition::from_ron(GRUNT, "grunt.ron").unwrap();
    app.world_mut()
        .resource_mut::<ArchetypeRegistry>()
        .insert("grunt", definition);
    app
}

fn spawn_dummy(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((
            AgentTarget,
            CombatTarget::default(),
            Health::new(100.0),
            Transform::from_translation(position),
        ))
        .id()
}

fn spawn_grunt(app: &mut App, position: Vec3) {
    app.world_mut()
        .send_event(SpawnAgent::new("grunt", position));
}

fn register(app: &mut App, key: &str, source: &str) {
    let definition = ArchetypeDefinition::from_ron(source, key).unwrap();
    app.world_mut()
        .resource_mut::<ArchetypeRegistry>()
        .insert(key, definition);
}

fn caller_of(app: &mut App, summoned: &str) -> Entity {
    let source = CALLER.replace("\"minion\"", &format!("\"{summoned}\""));
    register(app, "caller", &source);
    app.world_mut()
        .send_event(SpawnAgent::new("caller", Vec3::ZERO));
    app.update();
    let mut query = app.world_mut().query::<(Entity, &Agent)>();
    query
        .iter(app.world())
        .find(|(_, agent)| agent.archetype() == "caller")
        .map(|(entity, _)| entity)
        .unwrap()
}

/// Live, unpooled agents of one archetype.
fn live(app: &mut App, archetype: &str) -> Vec<Entity> {
    let mut query = app
        .world_mut()
        .query_filtered::<(Entity, &Agent), Without<Pooled>>();
    let mut entities: Vec<Entity> = query
        .iter(app.world())
        .filter(|(_, agent)| agent.archetype() == archetype && !agent.is_dead())
        .map(|(entity, _)| entity)
        .collect();
    entities.sort();
    entities
}

fn agents(app: &mut App) -> Vec<Entity> {
    let mut query = app.world_mut().query_filtered::<Entity, With<Agent>>();
    let mut entities: Vec<Entity> = query.iter(app.world()).collect();
    entities.sort();
    entities
}

#[test]
fn grunt_hunts_and_hurts_the_dummy() {
    let mut app = create_app(42);
    let dummy = spawn_dummy(&mut app, Vec3::new(0.0, 0.0, 1.5));
    spawn_grunt(&mut app, Vec3::ZERO);

    // Two swings land within two seconds.
    for _ in 0..16 {
        app.update();
    }

    let agent_entity = agents(&mut app)[0];
    assert_eq!(
        app.world().get::<Agent>(agent_entity).unwrap().state(),
        AgentState::Hostile
    );
    let health = app.world().get::<Health>(dummy).unwrap();
    assert_eq!(health.current, 60.0);

    // The transform faces the dummy along +Z.
    let rotation = app.world().get::<Transform>(agent_entity).unwrap().rotation;
    assert!((rotation * Vec3::Z).distance(Vec3::Z) < 1e-4);
}

#[test]
fn dead_grunt_drops_loot_and_returns_to_the_pool() {
    let mut app = create_app(7);
    spawn_dummy(&mut app, Vec3::new(0.0, 0.0, 30.0));
    spawn_grunt(&mut app, Vec3::ZERO);
    app.update();
    app.update();

    let grunt = agents(&mut app)[0];
    app.world_mut().send_event(DamageEvent {
        target: grunt,
        source: None,
        amount: 500.0,
    });
    for _ in 0..12 {
        app.update();
    }

    assert_eq!(app.world().resource::<Recorded>().deaths, vec![grunt]);
    assert_eq!(app.world().resource::<Recorded>().loot, 1);
    assert!(app.world().get::<Pooled>(grunt).is_some());
    assert_eq!(app.world().resource::<AgentPool>().parked_count("grunt"), 1);

    spawn_grunt(&mut app, Vec3::new(5.0, 0.0, 5.0));
    app.update();

    assert_eq!(agents(&mut app), vec![grunt]);
    assert!(app.world().get::<Pooled>(grunt).is_none());
    let agent = app.world().get::<Agent>(grunt).unwrap();
    assert_eq!(agent.state(), AgentState::Idle);
    assert_eq!(agent.health(), 50.0);
    assert_eq!(app.world().resource::<AgentPool>().parked_count("grunt"), 0);
}

fn run_and_snapshot(seed: u64, updates: usize) -> Vec<(Entity, Vec3)> {
    let mut app = create_app(seed);
    spawn_dummy(&mut app, Vec3::new(0.0, 0.0, 40.0));
    for x in [-6.0, 0.0, 6.0] {
        spawn_grunt(&mut app, Vec3::new(x, 0.0, 0.0));
    }
    for _ in 0..updates {
        app.update();
    }

    let mut query = app.world_mut().query::<(Entity, &Agent)>();
    let mut snapshot: Vec<(Entity, Vec3)> = query
        .iter(app.world())
        .map(|(entity, agent)| (entity, agent.position()))
        .collect();
    snapshot.sort_by_key(|(entity, _)| *entity);
    snapshot
}

#[test]
fn same_seed_same_wandering() {
    let first = run_and_snapshot(42, 120);
    let second = run_and_snapshot(42, 120);
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[test]
fn summoner_replaces_a_fallen_summon() {
    let mut app = create_app(11);
    spawn_dummy(&mut app, Vec3::new(0.0, 0.0, 3.0));
    register(&mut app, "minion", MINION);
    let caller = caller_of(&mut app, "minion");

    for _ in 0..16 {
        app.update();
    }
    let first = live(&mut app, "minion");
    assert_eq!(first.len(), 1, "capped at one summon");
    let link = app.world().get::<SummonedBy>(first[0]).unwrap();
    assert_eq!(link.owner, caller);

    app.world_mut().send_event(DamageEvent {
        target: first[0],
        source: None,
        amount: 100.0,
    });
    for _ in 0..16 {
        app.update();
    }

    assert!(app.world().get::<Agent>(first[0]).is_none());
    let second = live(&mut app, "minion");
    assert_eq!(second.len(), 1);
    assert_ne!(second[0], first[0]);
    assert_eq!(
        app.world().get::<SummonedBy>(second[0]).unwrap().owner,
        caller
    );
}

#[test]
fn failed_summon_spawn_frees_the_slot() {
    let mut app = create_app(12);
    spawn_dummy(&mut app, Vec3::new(0.0, 0.0, 3.0));
    caller_of(&mut app, "ghost");

    // "ghost" is not registered yet, so every summon is dropped.
    for _ in 0..16 {
        app.update();
    }
    assert!(live(&mut app, "ghost").is_empty());

    register(&mut app, "ghost", MINION);
    for _ in 0..16 {
        app.update();
    }
    assert_eq!(live(&mut app, "ghost").len(), 1);
}
