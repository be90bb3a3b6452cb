//! Spawn helpers: профиль → пул действий → BehaviorMachine → компоненты
//!
//! Тела rapier здесь не добавляются: headless симуляция двигает агентов сама.
//! Хост с `RapierPhysicsPlugin` добавляет `physics::rapier_body()` к бандлу.

use bevy::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::actions;
use crate::ai::{ActionPool, BehaviorMachine, Brain};
use crate::components::{Agent, Faction, Health, NavAgent};
use crate::config::{AgentProfile, ConfigError};

/// Ошибки сборки агента из профиля
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("unknown action id '{id}'")]
    UnknownAction { id: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Собрать машину поведения по профилю
///
/// Профиль проверяется (`validate`), каждое id ищется в каталоге действий.
pub fn build_machine(profile: &AgentProfile) -> Result<BehaviorMachine, SpawnError> {
    profile.validate(&format!("{:?}", profile.kind))?;
    let tuning = profile.tuning();

    let mut pool = ActionPool::new();
    for entry in &profile.actions {
        let action = actions::build(&entry.id, &tuning).ok_or_else(|| SpawnError::UnknownAction { id: entry.id.clone() })?;
        pool.push(action, entry.weight, entry.phase);
    }
    if let Some(id) = &profile.regroup_action {
        let action = actions::build(id, &tuning).ok_or_else(|| SpawnError::UnknownAction { id: id.clone() })?;
        pool.set_regroup(action);
    }

    debug!(kind = ?profile.kind, actions = ?pool.ids(), "behavior machine assembled");

    let machine = BehaviorMachine::new(profile.kind, tuning, profile.targeting.clone(), pool);
    if profile.kind.is_boss() {
        return Ok(machine.with_phases(profile.phases.clone()));
    }
    Ok(machine)
}

/// Бандл агента с поведением
///
/// Остальное (BodyMotion, AnimationCues, MeleeHitbox) добавят Required Components `Agent`.
pub fn agent_bundle(profile: &AgentProfile, position: Vec3) -> Result<impl Bundle, SpawnError> {
    let machine = build_machine(profile)?;
    Ok((
        Agent { kind: profile.kind },
        profile.faction,
        Health::new(profile.max_health),
        NavAgent::with_speed(profile.move_speed),
        Brain::new(machine),
        Transform::from_translation(position),
    ))
}

/// Игрок: точка сбора союзников и цель врагов (управление — вне симуляции)
pub fn player_bundle(position: Vec3, max_health: u32) -> impl Bundle {
    (Faction::Player, Health::new(max_health), Transform::from_translation(position))
}

/// Объект, который атакует босс (без здоровья: жив, пока существует)
pub fn objective_bundle(position: Vec3) -> impl Bundle {
    (Faction::Objective, Transform::from_translation(position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AgentKind, BehaviorState};
    use crate::components::{AnimationCues, BodyMotion, MeleeHitbox};
    use crate::config::{ActionConfig, ProfileSet};

    #[test]
    fn test_build_machine_from_builtin_profiles() {
        let profiles = ProfileSet::default();

        let ally = build_machine(profiles.get("ally").unwrap()).unwrap();
        assert_eq!(ally.kind(), AgentKind::Ally);
        assert_eq!(ally.state(), BehaviorState::Idle);
        assert_eq!(ally.pool().ids(), vec!["pursue", "melee", "ranged_burst"]);
        assert!(ally.pool().has_regroup());

        let boss = build_machine(profiles.get("boss").unwrap()).unwrap();
        assert_eq!(boss.state(), BehaviorState::Chasing);
        assert_eq!(boss.phase(), 1);
        assert!(!boss.pool().has_regroup());
        assert_eq!(boss.pool().len(), 4);
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let mut profile = AgentProfile::enemy();
        profile.actions.push(ActionConfig::new("teleport"));
        assert!(matches!(build_machine(&profile), Err(SpawnError::UnknownAction { id }) if id == "teleport"));

        let mut profile = AgentProfile::ally();
        profile.regroup_action = Some("wander".to_string());
        assert!(matches!(build_machine(&profile), Err(SpawnError::UnknownAction { .. })));
    }

    #[test]
    fn test_invalid_profile_is_config_error() {
        let mut profile = AgentProfile::enemy();
        profile.move_speed = -1.0;
        assert!(matches!(build_machine(&profile), Err(SpawnError::Config(_))));
    }

    #[test]
    fn test_agent_bundle_pulls_required_components() {
        let mut world = World::new();
        let profile = AgentProfile::ally();
        let entity = world.spawn(agent_bundle(&profile, Vec3::new(1.0, 0.0, 2.0)).unwrap()).id();

        assert_eq!(world.get::<Faction>(entity), Some(&Faction::Ally));
        assert_eq!(world.get::<Health>(entity).unwrap().max, profile.max_health);
        assert_eq!(world.get::<NavAgent>(entity).unwrap().speed, profile.move_speed);
        assert_eq!(world.get::<Transform>(entity).unwrap().translation, Vec3::new(1.0, 0.0, 2.0));
        assert!(world.get::<BodyMotion>(entity).unwrap().kinematic);
        assert!(world.get::<AnimationCues>(entity).is_some());
        assert!(world.get::<MeleeHitbox>(entity).is_some());
        assert_eq!(world.get::<Brain>(entity).unwrap().state(), BehaviorState::Idle);
    }

    #[test]
    fn test_objective_has_no_health() {
        let mut world = World::new();
        let entity = world.spawn(objective_bundle(Vec3::ZERO)).id();
        assert_eq!(world.get::<Faction>(entity), Some(&Faction::Objective));
        assert!(world.get::<Health>(entity).is_none());
    }
}
