//! Parking dead agents for reuse.

use std::collections::HashMap;

use bevy::prelude::*;

/// Marks an agent entity parked in the [`AgentPool`]. Parked agents are
/// not ticked.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Pooled;

/// Recycled agent entities, grouped by archetype.
#[derive(Resource, Debug, Default)]
pub struct AgentPool {
    parked: HashMap<String, Vec<Entity>>,
}

impl AgentPool {
    pub fn park(&mut self, archetype: &str, entity: Entity) {
        let parked = self.parked.entry(archetype.to_string()).or_default();
        if !parked.contains(&entity) {
            parked.push(entity);
        }
    }

    /// Most recently parked agent of this archetype.
    pub fn take(&mut self, archetype: &str) -> Option<Entity> {
        self.parked.get_mut(archetype).and_then(Vec::pop)
    }

    pub fn parked_count(&self, archetype: &str) -> usize {
        self.parked.get(archetype).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parks_once_and_hands_back() {
        let mut pool = AgentPool::default();
        let entity = Entity::from_raw(7);
        pool.park("grunt", entity);
        pool.park("grunt", entity);

        assert_eq!(pool.parked_count("grunt"), 1);
        assert_eq!(pool.take("skitter"), None);
        assert_eq!(pool.take("grunt"), Some(entity));
        assert_eq!(pool.take("grunt"), None);
    }
}
