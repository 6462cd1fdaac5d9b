//! Agent spawning, from the pool when possible.

use bevy::prelude::*;

use super::data::{ArchetypeDefinition, ArchetypeRegistry};
use super::pool::{AgentPool, Pooled};
use super::Agent;
use crate::actions::SummonId;
use crate::core::SimulationRng;
use crate::providers::{
    AnimationQueue, Collaborators, KinematicMover, NavBounds, Occluder, SightPerception,
    TargetHandle,
};

/// Request to bring an agent into the world.
#[derive(Event, Debug, Clone)]
pub struct SpawnAgent {
    /// Key in the [`ArchetypeRegistry`]
    pub archetype: String,
    pub position: Vec3,
    pub facing: Vec3,
    /// Set when a summon action asked for this agent.
    pub summoned_by: Option<(Entity, SummonId)>,
}

impl SpawnAgent {
    pub fn new(archetype: impl Into<String>, position: Vec3) -> Self {
        Self {
            archetype: archetype.into(),
            position,
            facing: Vec3::Z,
            summoned_by: None,
        }
    }
}

/// Links a summoned agent back to its summoner.
#[derive(Component, Debug, Clone, Copy)]
pub struct SummonedBy {
    pub owner: Entity,
    pub id: SummonId,
}

/// The target every spawned agent perceives.
#[derive(Resource, Debug, Clone, Default)]
pub struct SharedTarget(pub TargetHandle);

/// Static arena geometry handed to new agents' collaborators.
#[derive(Resource, Debug, Clone, Default)]
pub struct ArenaLayout {
    pub bounds: Option<NavBounds>,
    pub occluders: Vec<Occluder>,
}

fn collaborators_for(
    definition: &ArchetypeDefinition,
    position: Vec3,
    target: &SharedTarget,
    layout: &ArenaLayout,
) -> Collaborators {
    let mut mover = KinematicMover::new(position, definition.move_speed);
    if let Some(bounds) = layout.bounds {
        mover = mover.with_bounds(bounds);
    }
    let perception = SightPerception::new(definition.perception.clone(), target.0.clone())
        .with_occluders(layout.occluders.clone());

    Collaborators::new()
        .with_movement(mover)
        .with_perception(perception)
        .with_animation(AnimationQueue::new())
}

/// Turn [`SpawnAgent`] requests into agents.
#[allow(clippy::too_many_arguments)]
pub fn spawn_agents(
    mut commands: Commands,
    mut requests: EventReader<SpawnAgent>,
    registry: Res<ArchetypeRegistry>,
    mut pool: ResMut<AgentPool>,
    mut rng: ResMut<SimulationRng>,
    target: Res<SharedTarget>,
    layout: Res<ArenaLayout>,
    mut agents: Query<&mut Agent>,
    pooled: Query<(), With<Pooled>>,
) {
    for request in requests.read() {
        let Some(definition) = registry.get(&request.archetype) else {
            warn!("Unknown archetype '{}', not spawning", request.archetype);
            // Free the summoner's slot for the agent that never arrived.
            if let Some((owner, id)) = request.summoned_by {
                if let Ok(mut summoner) = agents.get_mut(owner) {
                    summoner.release_summon(id);
                }
            }
            continue;
        };
        let reused = pool
            .take(&request.archetype)
            .filter(|&entity| pooled.contains(entity))
            .and_then(|entity| {
                let mut agent = agents.get_mut(entity).ok()?;
                agent.reset(request.position);
                agent.collaborators_mut().face(request.position + request.facing);
                Some((entity, agent.position()))
            });

        let entity = match reused {
            Some((entity, position)) => {
                commands
                    .entity(entity)
                    .remove::<Pooled>()
                    .insert(Transform::from_translation(position));
                debug!("Reused pooled {} ({:?})", request.archetype, entity);
                entity
            }
            None => {
                let collaborators =
                    collaborators_for(definition, request.position, &target, &layout);
                let mut agent = definition
                    .builder(&request.archetype)
                    .at(request.position)
                    .with_seed(rng.next_seed())
                    .with_collaborators(collaborators)
                    .build();
                agent.collaborators_mut().face(request.position + request.facing);
                let transform = Transform::from_translation(request.position);
                let entity = commands.spawn((agent, transform)).id();
                debug!("Spawned {} ({:?})", request.archetype, entity);
                entity
            }
        };

        if let Some((owner, id)) = request.summoned_by {
            commands.entity(entity).insert(SummonedBy { owner, id });
        }
    }
}
