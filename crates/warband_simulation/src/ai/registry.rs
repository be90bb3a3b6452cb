//! Реестр живых агентов (snapshot на тик)
//!
//! Пересобирается один раз в начале тика системой `refresh_agent_registry`;
//! все решения тика читают один и тот же снимок. Порядок обхода — по индексу
//! entity, поэтому при равных расстояниях побеждает меньший индекс.

use std::collections::BTreeMap;

use bevy::prelude::*;

use super::contract::{RegistryEntry, SpatialRegistry};
use crate::components::Faction;

#[derive(Resource, Debug, Clone, Default)]
pub struct AgentRegistry {
    entries: BTreeMap<(u32, Entity), RegistryEntry>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn insert(&mut self, entry: RegistryEntry) {
        self.entries.insert((entry.entity.index(), entry.entity), entry);
    }

    pub fn remove(&mut self, entity: Entity) -> Option<RegistryEntry> {
        self.entries.remove(&(entity.index(), entity))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    fn active(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values().filter(|entry| entry.active)
    }
}

impl SpatialRegistry for AgentRegistry {
    fn find_by_tag(&self, tag: Faction) -> Vec<RegistryEntry> {
        self.active().filter(|entry| entry.faction == tag).copied().collect()
    }

    fn find_within_radius(&self, point: Vec3, radius: f32) -> Vec<RegistryEntry> {
        let radius_sq = radius * radius;
        self.active()
            .filter(|entry| entry.position.distance_squared(point) <= radius_sq)
            .copied()
            .collect()
    }

    fn lookup(&self, entity: Entity) -> Option<RegistryEntry> {
        self.entries.get(&(entity.index(), entity)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: u32, faction: Faction, position: Vec3) -> RegistryEntry {
        RegistryEntry {
            entity: Entity::from_raw(index),
            faction,
            position,
            health: Some(100.0),
            active: true,
        }
    }

    #[test]
    fn test_find_by_tag_skips_inactive() {
        let mut registry = AgentRegistry::new();
        registry.insert(entry(1, Faction::Ally, Vec3::ZERO));
        registry.insert(RegistryEntry {
            active: false,
            ..entry(2, Faction::Ally, Vec3::X)
        });
        registry.insert(entry(3, Faction::Hostile, Vec3::X));

        let allies = registry.find_by_tag(Faction::Ally);
        assert_eq!(allies.len(), 1);
        assert_eq!(allies[0].entity, Entity::from_raw(1));

        // lookup видит и выключенных
        assert!(registry.lookup(Entity::from_raw(2)).is_some_and(|e| !e.active));
    }

    #[test]
    fn test_iteration_order_by_index() {
        let mut registry = AgentRegistry::new();
        registry.insert(entry(9, Faction::Ally, Vec3::ZERO));
        registry.insert(entry(2, Faction::Ally, Vec3::ZERO));
        registry.insert(entry(5, Faction::Ally, Vec3::ZERO));

        let order: Vec<u32> = registry.iter().map(|e| e.entity.index()).collect();
        assert_eq!(order, vec![2, 5, 9]);
    }

    #[test]
    fn test_find_within_radius() {
        let mut registry = AgentRegistry::new();
        registry.insert(entry(1, Faction::Ally, Vec3::new(3.0, 0.0, 4.0))); // 5м
        registry.insert(entry(2, Faction::Player, Vec3::new(10.0, 0.0, 0.0)));

        let near = registry.find_within_radius(Vec3::ZERO, 5.0);
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].entity.index(), 1);
    }

    #[test]
    fn test_remove() {
        let mut registry = AgentRegistry::new();
        registry.insert(entry(1, Faction::Ally, Vec3::ZERO));
        assert!(registry.remove(Entity::from_raw(1)).is_some());
        assert!(registry.lookup(Entity::from_raw(1)).is_none());
        assert!(registry.is_empty());
    }
}
