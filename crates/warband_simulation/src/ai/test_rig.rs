//! Стенд для unit тестов ядра: контекст агента без ECS мира

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::{
    Action, ActionStatus, AgentRegistry, BehaviorContext, BehaviorMachine, HealthReading, RegistryEntry, SpatialRegistry,
    StepClock,
};
use crate::combat::{EffectBatch, ProjectileBatch};
use crate::components::{AnimationCues, BodyMotion, Faction, Health, MeleeHitbox, NavAgent};
use crate::physics::step_navigation;

pub const DT: f32 = 1.0 / 60.0;

pub struct TestRig {
    pub agent: Entity,
    pub faction: Faction,
    pub transform: Transform,
    pub health: Health,
    pub nav: NavAgent,
    pub body: BodyMotion,
    pub cues: AnimationCues,
    pub hitbox: MeleeHitbox,
    pub registry: AgentRegistry,
    pub rng: ChaCha8Rng,
    pub projectiles: ProjectileBatch,
    pub effects: EffectBatch,
    pub clock: StepClock,
}

impl TestRig {
    pub fn new(faction: Faction) -> Self {
        Self {
            agent: Entity::from_raw(100),
            faction,
            transform: Transform::default(),
            health: Health::new(100),
            nav: NavAgent::default(),
            body: BodyMotion::default(),
            cues: AnimationCues::default(),
            hitbox: MeleeHitbox::default(),
            registry: AgentRegistry::new(),
            rng: ChaCha8Rng::seed_from_u64(42),
            projectiles: ProjectileBatch::default(),
            effects: EffectBatch::default(),
            clock: StepClock { delta: DT, elapsed: 0.0 },
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.translation = position;
        self
    }

    /// Добавить entity в реестр
    pub fn put(&mut self, index: u32, faction: Faction, position: Vec3, health: Option<f32>) -> Entity {
        let entity = Entity::from_raw(index);
        self.registry.insert(RegistryEntry {
            entity,
            faction,
            position,
            health,
            active: true,
        });
        entity
    }

    pub fn move_entity(&mut self, entity: Entity, position: Vec3) {
        if let Some(mut entry) = self.registry.remove(entity) {
            entry.position = position;
            self.registry.insert(entry);
        }
    }

    pub fn kill(&mut self, entity: Entity) {
        if let Some(mut entry) = self.registry.remove(entity) {
            entry.health = Some(0.0);
            self.registry.insert(entry);
        }
    }

    pub fn ctx(&mut self) -> BehaviorContext<'_> {
        self.split().1
    }

    /// Здоровье отдельно от контекста (для подъёма)
    pub fn split(&mut self) -> (&mut Health, BehaviorContext<'_>) {
        let rally_point = super::targeting::rally_point(&self.registry, self.faction, self.transform.translation);
        let health = HealthReading::of(&self.health);
        let ctx = BehaviorContext {
            agent: self.agent,
            faction: self.faction,
            transform: &mut self.transform,
            health,
            navigator: &mut self.nav,
            body: &mut self.body,
            animation: &mut self.cues,
            attack: &mut self.hitbox,
            registry: &self.registry,
            projectiles: &mut self.projectiles,
            effects: &mut self.effects,
            rng: &mut self.rng,
            clock: self.clock,
            target: None,
            rally_point,
        };
        (&mut self.health, ctx)
    }

    /// Выставить здоровье агента
    pub fn set_health(&mut self, current: u32) {
        self.health.current = current.min(self.health.max);
    }

    /// Тик машины + шаг навигации, как в FixedUpdate
    pub fn tick(&mut self, machine: &mut BehaviorMachine) {
        {
            let mut ctx = self.ctx();
            machine.tick(&mut ctx);
        }
        step_navigation(&mut self.transform, &self.nav, &self.body, self.clock.delta);
        self.clock.elapsed += self.clock.delta;
    }

    pub fn run(&mut self, machine: &mut BehaviorMachine, ticks: usize) {
        for _ in 0..ticks {
            self.tick(machine);
        }
    }

    /// Тикать, пока условие не выполнится; None — не дождались
    pub fn run_until(
        &mut self,
        machine: &mut BehaviorMachine,
        limit: usize,
        done: impl Fn(&BehaviorMachine, &TestRig) -> bool,
    ) -> Option<usize> {
        for tick in 0..limit {
            if done(machine, self) {
                return Some(tick);
            }
            self.tick(machine);
        }
        done(machine, self).then_some(limit)
    }

    /// Снимок entity из реестра стенда
    pub fn entry(&self, entity: Entity) -> Option<RegistryEntry> {
        self.registry.lookup(entity)
    }

    /// Один вызов `execute` действия с заданной целью + шаг навигации
    pub fn execute(&mut self, action: &mut dyn Action, target: Option<RegistryEntry>) -> ActionStatus {
        let status = {
            let mut ctx = self.ctx();
            ctx.target = target;
            action.execute(&mut ctx)
        };
        step_navigation(&mut self.transform, &self.nav, &self.body, self.clock.delta);
        self.clock.elapsed += self.clock.delta;
        status
    }

    /// Выполнять действие до завершения; None — не завершилось за `limit` тиков
    pub fn run_action(
        &mut self,
        action: &mut dyn Action,
        target: Option<RegistryEntry>,
        limit: usize,
    ) -> Option<ActionStatus> {
        for _ in 0..limit {
            let status = self.execute(&mut *action, target);
            if status.is_finished() {
                return Some(status);
            }
        }
        None
    }

    pub fn stop(&mut self, action: &mut dyn Action) {
        let mut ctx = self.ctx();
        action.stop(&mut ctx);
    }
}
