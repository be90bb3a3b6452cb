//! Сборка BehaviorContext из компонентов агента
//!
//! `AgentParts` — все компоненты агента, которые трогает ядро.
//! `BehaviorServices` — общие ресурсы тика (реестр, RNG, время, выходные события).
//! Снаряды и эффекты копятся в batch и уходят событиями после прохода по агентам.

use bevy::ecs::query::QueryData;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use rand::RngCore;

use crate::ai::{targeting, AgentRegistry, BehaviorContext, BehaviorMachine, Brain, HealthReading, StepClock};
use crate::combat::{AreaKnockback, EffectBatch, ProjectileBatch, ProjectileIds, ProjectileSpawned};
use crate::components::{AnimationCues, BodyMotion, Faction, Health, MeleeHitbox, NavAgent};
use crate::DeterministicRng;

#[derive(QueryData)]
#[query_data(mutable)]
pub struct AgentParts {
    pub entity: Entity,
    pub faction: &'static Faction,
    pub health: &'static mut Health,
    pub brain: &'static mut Brain,
    pub transform: &'static mut Transform,
    pub nav: &'static mut NavAgent,
    pub body: &'static mut BodyMotion,
    pub cues: &'static mut AnimationCues,
    pub hitbox: &'static mut MeleeHitbox,
}

/// Ресурсы, общие для всех агентов тика
#[derive(SystemParam)]
pub struct BehaviorServices<'w> {
    registry: Res<'w, AgentRegistry>,
    projectile_ids: ResMut<'w, ProjectileIds>,
    rng: ResMut<'w, DeterministicRng>,
    time: Res<'w, Time<Fixed>>,
    projectile_events: EventWriter<'w, ProjectileSpawned>,
    knockback_events: EventWriter<'w, AreaKnockback>,
}

/// Заимствованные на один проход сервисы
pub struct TickServices<'a> {
    pub registry: &'a AgentRegistry,
    pub projectiles: &'a mut ProjectileBatch,
    pub effects: &'a mut EffectBatch,
    pub rng: &'a mut dyn RngCore,
    pub clock: StepClock,
}

impl BehaviorServices<'_> {
    /// Выполнить проход по агентам и отправить накопленные снаряды/эффекты
    pub fn run<R>(&mut self, pass: impl FnOnce(&mut TickServices) -> R) -> R {
        let mut projectiles = ProjectileBatch::new(&self.projectile_ids);
        let mut effects = EffectBatch::default();
        let clock = StepClock {
            delta: self.time.delta_secs(),
            elapsed: self.time.elapsed_secs(),
        };

        let result = {
            let mut services = TickServices {
                registry: &self.registry,
                projectiles: &mut projectiles,
                effects: &mut effects,
                rng: &mut self.rng.rng,
                clock,
            };
            pass(&mut services)
        };

        projectiles.commit(&mut self.projectile_ids, &mut self.projectile_events);
        effects.commit(&mut self.knockback_events);
        result
    }
}

/// Собрать контекст агента и вызвать `f` с его машиной и здоровьем
pub fn drive<R>(
    agent: &mut AgentPartsItem,
    services: &mut TickServices,
    f: impl FnOnce(&mut BehaviorMachine, &mut Health, &mut BehaviorContext) -> R,
) -> R {
    let faction = *agent.faction;
    let rally_point = targeting::rally_point(services.registry, faction, agent.transform.translation);
    let health = HealthReading::of(&*agent.health);

    let mut ctx = BehaviorContext {
        agent: agent.entity,
        faction,
        transform: &mut *agent.transform,
        health,
        navigator: &mut *agent.nav,
        body: &mut *agent.body,
        animation: &mut *agent.cues,
        attack: &mut *agent.hitbox,
        registry: services.registry,
        projectiles: &mut *services.projectiles,
        effects: &mut *services.effects,
        rng: &mut *services.rng,
        clock: services.clock,
        target: None,
        rally_point,
    };
    f(&mut agent.brain.machine, &mut *agent.health, &mut ctx)
}

/// Агенты в порядке индекса entity (детерминированный обход)
pub fn ordered(entities: impl Iterator<Item = Entity>) -> Vec<Entity> {
    let mut order: Vec<Entity> = entities.collect();
    order.sort_by_key(|entity| entity.index());
    order
}
