//! Combat systems - hitbox and projectile resolution, damage handling.

use std::collections::HashSet;

use bevy::prelude::*;

use super::components::*;
use super::hitbox::Hitbox;
use super::projectile::Projectile;
use crate::agents::Agent;
use crate::core::AgentSet;

/// Configure combat systems.
pub fn setup_combat_systems(app: &mut App) {
    app
        // Effect systems
        .add_systems(
            Update,
            (update_hitboxes, update_projectiles).in_set(AgentSet::Effects),
        )
        // Damage systems
        .add_systems(Update, apply_damage.in_set(AgentSet::Damage));
}

/// Resolve hitbox overlaps, then age and expire hitboxes.
fn update_hitboxes(
    mut commands: Commands,
    time: Res<Time>,
    mut hitboxes: Query<(Entity, &mut Hitbox, &mut Transform)>,
    owners: Query<&Transform, Without<Hitbox>>,
    targets: Query<(Entity, &Transform, &CombatTarget), Without<Hitbox>>,
    mut damage_events: EventWriter<DamageEvent>,
) {
    for (entity, mut hitbox, mut transform) in hitboxes.iter_mut() {
        // Attached hitboxes ride along with their owner.
        if let (Some(offset), Some(owner)) = (hitbox.follow_offset, hitbox.owner) {
            if let Ok(owner_transform) = owners.get(owner) {
                transform.translation = owner_transform.transform_point(offset);
            }
        }

        let center = transform.translation;
        for (target, target_transform, body) in targets.iter() {
            if Some(target) == hitbox.owner {
                continue;
            }
            if let Some(amount) = hitbox.try_hit(center, target_transform.translation, body.radius)
            {
                damage_events.send(DamageEvent {
                    target,
                    source: hitbox.owner,
                    amount,
                });
                break;
            }
        }

        hitbox.tick(time.delta_secs());
        if hitbox.is_finished() {
            commands.entity(entity).despawn();
        }
    }
}

/// Move projectiles and resolve their hits.
fn update_projectiles(
    mut commands: Commands,
    time: Res<Time>,
    mut projectiles: Query<(Entity, &mut Projectile, &mut Transform)>,
    targets: Query<(Entity, &Transform, &CombatTarget), Without<Projectile>>,
    mut damage_events: EventWriter<DamageEvent>,
) {
    for (entity, mut projectile, mut transform) in projectiles.iter_mut() {
        projectile.advance(&mut transform.translation, time.delta_secs());

        for (target, target_transform, body) in targets.iter() {
            if Some(target) == projectile.owner {
                continue;
            }
            if let Some(amount) =
                projectile.try_hit(transform.translation, target_transform.translation, body.radius)
            {
                damage_events.send(DamageEvent {
                    target,
                    source: projectile.owner,
                    amount,
                });
                break;
            }
        }

        if projectile.is_finished() {
            commands.entity(entity).despawn();
        }
    }
}

/// Apply damage to agents and other damageable entities.
fn apply_damage(
    mut damage_events: EventReader<DamageEvent>,
    mut agents: Query<&mut Agent>,
    mut healths: Query<&mut Health, Without<Agent>>,
    mut death_events: EventWriter<DeathEvent>,
) {
    // Track entities that died this frame to avoid duplicate death events
    let mut died_this_frame = HashSet::new();

    for event in damage_events.read() {
        if died_this_frame.contains(&event.target) {
            continue;
        }

        let died = if let Ok(mut agent) = agents.get_mut(event.target) {
            let was_alive = !agent.is_dead();
            agent.apply_damage(event.amount);
            was_alive && agent.is_dead()
        } else if let Ok(mut health) = healths.get_mut(event.target) {
            let was_alive = !health.is_dead();
            health.take_damage(event.amount);
            was_alive && health.is_dead()
        } else {
            false
        };

        if died {
            died_this_frame.insert(event.target);
            death_events.send(DeathEvent {
                entity: event.target,
                killed_by: event.source,
            });
        }
    }
}
