//! TargetResolver — поиск и валидация цели
//!
//! Цель хранится как `Entity` (слабая ссылка) и перепроверяется каждый тик:
//! entity могла исчезнуть, выключиться, умереть или сменить фракцию.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::contract::{RegistryEntry, SpatialRegistry};
use crate::components::Faction;

/// Запасной поиск по радиусу (босс: игроки и союзники в 50м)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiusFallback {
    pub radius: f32,
    pub tags: Vec<Faction>,
}

/// Настройки поиска цели агента
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetingProfile {
    /// Основной тег: ближайшая entity с ним становится целью
    pub default_tag: Faction,
    /// Если по основному тегу никого — поиск по радиусу
    #[serde(default)]
    pub fallback: Option<RadiusFallback>,
}

impl TargetingProfile {
    pub fn new(default_tag: Faction) -> Self {
        Self {
            default_tag,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, radius: f32, tags: Vec<Faction>) -> Self {
        self.fallback = Some(RadiusFallback { radius, tags });
        self
    }
}

/// Ближайшая живая entity с тегом (кроме `exclude`).
///
/// Равные расстояния: побеждает первая в порядке реестра.
pub fn find_nearest_of_tag(
    registry: &dyn SpatialRegistry,
    origin: Vec3,
    tag: Faction,
    exclude: Entity,
) -> Option<RegistryEntry> {
    nearest(
        registry
            .find_by_tag(tag)
            .into_iter()
            .filter(|entry| entry.entity != exclude && entry.is_alive()),
        origin,
    )
}

/// Проверка цели: существует, активна, жива и всё ещё враждебна наблюдателю
pub fn validate(registry: &dyn SpatialRegistry, observer: Faction, target: Entity) -> Option<RegistryEntry> {
    registry
        .lookup(target)
        .filter(|entry| entry.active && entry.is_alive() && observer.is_hostile_to(entry.faction))
}

/// Полный поиск: основной тег → запасной поиск по радиусу
pub fn resolve(
    registry: &dyn SpatialRegistry,
    profile: &TargetingProfile,
    observer: Faction,
    origin: Vec3,
    exclude: Entity,
) -> Option<RegistryEntry> {
    if observer.is_hostile_to(profile.default_tag) {
        if let Some(found) = find_nearest_of_tag(registry, origin, profile.default_tag, exclude) {
            return Some(found);
        }
    }

    let fallback = profile.fallback.as_ref()?;
    // Запасной поиск требует здоровья > 0: объекты без здоровья не подходят
    nearest(
        registry.find_within_radius(origin, fallback.radius).into_iter().filter(|entry| {
            entry.entity != exclude
                && fallback.tags.contains(&entry.faction)
                && observer.is_hostile_to(entry.faction)
                && entry.health.is_some_and(|hp| hp > 0.0)
        }),
        origin,
    )
}

/// Точка сбора: ближайший игрок (только для союзников)
pub fn rally_point(registry: &dyn SpatialRegistry, faction: Faction, origin: Vec3) -> Option<Vec3> {
    if faction != Faction::Ally {
        return None;
    }
    nearest(registry.find_by_tag(Faction::Player).into_iter(), origin).map(|entry| entry.position)
}

fn nearest(candidates: impl Iterator<Item = RegistryEntry>, origin: Vec3) -> Option<RegistryEntry> {
    let mut best: Option<(f32, RegistryEntry)> = None;
    for candidate in candidates {
        let distance = candidate.position.distance_squared(origin);
        // Строго меньше: при равенстве остаётся более ранний
        if best.is_none_or(|(best_distance, _)| distance < best_distance) {
            best = Some((distance, candidate));
        }
    }
    best.map(|(_, entry)| entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AgentRegistry;

    fn entry(index: u32, faction: Faction, position: Vec3, health: Option<f32>) -> RegistryEntry {
        RegistryEntry {
            entity: Entity::from_raw(index),
            faction,
            position,
            health,
            active: true,
        }
    }

    #[test]
    fn test_nearest_of_tag_excludes_self_and_dead() {
        let mut registry = AgentRegistry::new();
        registry.insert(entry(1, Faction::Ally, Vec3::ZERO, Some(50.0)));
        registry.insert(entry(2, Faction::Ally, Vec3::new(1.0, 0.0, 0.0), Some(0.0)));
        registry.insert(entry(3, Faction::Ally, Vec3::new(4.0, 0.0, 0.0), Some(50.0)));

        let found = find_nearest_of_tag(&registry, Vec3::ZERO, Faction::Ally, Entity::from_raw(1));
        assert_eq!(found.map(|e| e.entity.index()), Some(3));
    }

    #[test]
    fn test_equidistant_lowest_index_wins() {
        let mut registry = AgentRegistry::new();
        registry.insert(entry(7, Faction::Hostile, Vec3::new(5.0, 0.0, 0.0), Some(10.0)));
        registry.insert(entry(4, Faction::Hostile, Vec3::new(-5.0, 0.0, 0.0), Some(10.0)));
        registry.insert(entry(6, Faction::Hostile, Vec3::new(0.0, 0.0, 5.0), Some(10.0)));

        let found = find_nearest_of_tag(&registry, Vec3::ZERO, Faction::Hostile, Entity::PLACEHOLDER);
        assert_eq!(found.map(|e| e.entity.index()), Some(4));
    }

    #[test]
    fn test_validate_rejects_stale_targets() {
        let mut registry = AgentRegistry::new();
        registry.insert(entry(1, Faction::Hostile, Vec3::ZERO, Some(10.0)));
        registry.insert(entry(2, Faction::Neutral, Vec3::ZERO, Some(10.0)));
        registry.insert(entry(3, Faction::Hostile, Vec3::ZERO, Some(0.0)));
        registry.insert(RegistryEntry {
            active: false,
            ..entry(4, Faction::Hostile, Vec3::ZERO, Some(10.0))
        });
        registry.insert(entry(5, Faction::Ally, Vec3::ZERO, Some(10.0)));

        assert!(validate(&registry, Faction::Ally, Entity::from_raw(1)).is_some());
        assert!(validate(&registry, Faction::Ally, Entity::from_raw(2)).is_none(), "retagged");
        assert!(validate(&registry, Faction::Ally, Entity::from_raw(3)).is_none(), "dead");
        assert!(validate(&registry, Faction::Ally, Entity::from_raw(4)).is_none(), "deactivated");
        assert!(validate(&registry, Faction::Ally, Entity::from_raw(5)).is_none(), "same side");
        assert!(validate(&registry, Faction::Ally, Entity::from_raw(99)).is_none(), "despawned");
    }

    #[test]
    fn test_boss_falls_back_to_radius_scan() {
        let profile = TargetingProfile::new(Faction::Objective)
            .with_fallback(50.0, vec![Faction::Player, Faction::Ally]);

        let mut registry = AgentRegistry::new();
        registry.insert(entry(1, Faction::Player, Vec3::new(30.0, 0.0, 0.0), Some(100.0)));
        registry.insert(entry(2, Faction::Ally, Vec3::new(20.0, 0.0, 0.0), Some(0.0)));
        registry.insert(entry(3, Faction::Ally, Vec3::new(25.0, 0.0, 0.0), Some(40.0)));
        registry.insert(entry(4, Faction::Ally, Vec3::new(60.0, 0.0, 0.0), Some(40.0)));

        let found = resolve(&registry, &profile, Faction::Hostile, Vec3::ZERO, Entity::PLACEHOLDER);
        assert_eq!(found.map(|e| e.entity.index()), Some(3));

        // Появился объект по основному тегу — он важнее
        registry.insert(entry(5, Faction::Objective, Vec3::new(100.0, 0.0, 0.0), None));
        let found = resolve(&registry, &profile, Faction::Hostile, Vec3::ZERO, Entity::PLACEHOLDER);
        assert_eq!(found.map(|e| e.entity.index()), Some(5));
    }

    #[test]
    fn test_rally_point_only_for_allies() {
        let mut registry = AgentRegistry::new();
        registry.insert(entry(1, Faction::Player, Vec3::new(2.0, 0.0, 2.0), Some(100.0)));

        assert_eq!(rally_point(&registry, Faction::Ally, Vec3::ZERO), Some(Vec3::new(2.0, 0.0, 2.0)));
        assert_eq!(rally_point(&registry, Faction::Hostile, Vec3::ZERO), None);
    }
}
