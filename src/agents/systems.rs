//! Systems that run agents inside the ECS.

use bevy::prelude::*;

use super::agent::{AgentEvent, DeathCause, DespawnMode};
use super::events::{AgentCollision, AgentStateChanged, AnimationEvent, LootDropped};
use super::pool::{AgentPool, Pooled};
use super::spawning::{SharedTarget, SpawnAgent, SummonedBy};
use super::Agent;
use crate::actions::{yaw, ActionEffect};
use crate::combat::{Health, Hitbox, Projectile};
use crate::core::DeathEvent;

/// The entity agents hunt (usually the player).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AgentTarget;

/// Set once an agent's corpse is done; handled in cleanup.
#[derive(Component, Debug, Clone, Copy)]
pub struct PendingDespawn(pub DespawnMode);

/// Copy the target entity's pose into the handle every agent reads.
pub fn publish_target(
    shared: Res<SharedTarget>,
    target: Query<(&Transform, Option<&Health>), With<AgentTarget>>,
) {
    match target.get_single() {
        Ok((transform, health)) if !health.is_some_and(Health::is_dead) => {
            shared.0.set_position(transform.translation);
            shared.0.set_forward(transform.forward().as_vec3());
        }
        _ => shared.0.clear(),
    }
}

/// Hand physics collisions to the agents that had them.
pub fn forward_collisions(
    mut collisions: EventReader<AgentCollision>,
    mut agents: Query<&mut Agent, Without<Pooled>>,
) {
    for collision in collisions.read() {
        if let Ok(mut agent) = agents.get_mut(collision.entity) {
            agent.notify_collision();
        }
    }
}

/// Advance every live agent and carry out what it asked for.
#[allow(clippy::too_many_arguments)]
pub fn tick_agents(
    mut commands: Commands,
    time: Res<Time>,
    mut agents: Query<(Entity, &mut Agent, &mut Transform), Without<Pooled>>,
    mut state_events: EventWriter<AgentStateChanged>,
    mut loot_events: EventWriter<LootDropped>,
    mut animation_events: EventWriter<AnimationEvent>,
    mut spawn_requests: EventWriter<SpawnAgent>,
    mut death_events: EventWriter<DeathEvent>,
) {
    let delta = time.delta_secs();

    for (entity, mut agent, mut transform) in agents.iter_mut() {
        let report = agent.tick(delta);

        transform.translation = agent.position();
        transform.rotation = yaw(agent.forward());

        for command in agent.collaborators_mut().take_animation_commands() {
            animation_events.send(AnimationEvent { entity, command });
        }

        for event in report.events {
            match event {
                AgentEvent::StateChanged { from, to } => {
                    state_events.send(AgentStateChanged { entity, from, to });
                }
                AgentEvent::Effect(ActionEffect::SpawnHitbox(spec)) => {
                    commands.spawn((
                        Hitbox::from_spec(Some(entity), &spec),
                        Transform::from_translation(spec.position),
                    ));
                }
                AgentEvent::Effect(ActionEffect::LaunchProjectile(spec)) => {
                    commands.spawn((
                        Projectile::from_spec(Some(entity), &spec),
                        Transform::from_translation(spec.origin),
                    ));
                }
                AgentEvent::Effect(ActionEffect::Summon(request)) => {
                    spawn_requests.send(SpawnAgent {
                        archetype: request.archetype,
                        position: request.position,
                        facing: request.facing,
                        summoned_by: Some((entity, request.id)),
                    });
                }
                AgentEvent::Effect(ActionEffect::SelfDestruct) => {}
                // Deaths by damage are reported by the damage system.
                AgentEvent::Died(DeathCause::SelfDestruct) => {
                    death_events.send(DeathEvent {
                        entity,
                        killed_by: None,
                    });
                }
                AgentEvent::LootDropped(drops) => {
                    loot_events.send(LootDropped {
                        entity,
                        position: transform.translation,
                        drops,
                    });
                }
                AgentEvent::Despawn(mode) => {
                    commands.entity(entity).insert(PendingDespawn(mode));
                }
                AgentEvent::Died(DeathCause::Damage)
                | AgentEvent::ActionStarted { .. }
                | AgentEvent::ActionFinished { .. } => {}
            }
        }
    }
}

/// Park or destroy finished corpses and free their summon slots.
pub fn despawn_agents(
    mut commands: Commands,
    mut pool: ResMut<AgentPool>,
    mut agents: Query<(Entity, &mut Agent, Option<&PendingDespawn>, Option<&SummonedBy>)>,
) {
    let mut released = Vec::new();

    for (entity, agent, pending, summoned_by) in agents.iter() {
        let Some(PendingDespawn(mode)) = pending else {
            continue;
        };
        if let Some(link) = summoned_by {
            released.push(*link);
        }
        match mode {
            DespawnMode::ReturnToPool => {
                pool.park(agent.archetype(), entity);
                commands
                    .entity(entity)
                    .remove::<(PendingDespawn, SummonedBy)>()
                    .insert(Pooled);
            }
            DespawnMode::Destroy => {
                commands.entity(entity).despawn_recursive();
            }
        }
    }

    for link in released {
        if let Ok((_, mut owner, _, _)) = agents.get_mut(link.owner) {
            owner.release_summon(link.id);
        }
    }
}
