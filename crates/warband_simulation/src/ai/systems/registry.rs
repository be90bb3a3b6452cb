//! System: снимок реестра агентов на начало тика

use bevy::prelude::*;

use crate::ai::{AgentRegistry, RegistryEntry};
use crate::components::{Deactivated, Faction, Health};

/// System: пересобрать реестр из всех entity с фракцией
///
/// Выполняется в `SimulationSet::Sense`, после урона тика: решения видят
/// актуальное здоровье. Entity без Health — объекты (health = None).
pub fn refresh_agent_registry(
    mut registry: ResMut<AgentRegistry>,
    tagged: Query<(Entity, &Faction, &Transform, Option<&Health>, Has<Deactivated>)>,
) {
    registry.clear();
    for (entity, faction, transform, health, deactivated) in tagged.iter() {
        registry.insert(RegistryEntry {
            entity,
            faction: *faction,
            position: transform.translation,
            health: health.map(|health| health.current as f32),
            active: !deactivated,
        });
    }
}
