//! Warband Simulation Core
//!
//! Headless ECS-симуляция поведения NPC на Bevy 0.16: союзники, враги, босс.
//!
//! Слои:
//! - ai: ядро поведения (автомат, прерывания, фазы, подъём) + ECS обвязка
//! - actions: каталог конкретных действий (погоня, удар, залп, прыжок, ...)
//! - combat / physics: здоровье, урон, хитбоксы, исполнение движения
//! - config / spawn: профили агентов и сборка entity

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod actions;
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod logger;
pub mod physics;
pub mod spawn;

// Re-export для удобства
pub use ai::{AIPlugin, BehaviorMachine, BehaviorState, Brain, CommandScope, RegroupCommand, ReviveRequest};
pub use combat::{AgentDied, CombatPlugin, DamageRequest, DamageTaken, ProjectileSpawned};
pub use components::*;
pub use config::{AgentProfile, ConfigError, ProfileSet, SimulationConfig};
pub use logger::init_logger;
pub use physics::MotionPlugin;
pub use spawn::{agent_bundle, build_machine, objective_bundle, player_bundle, SpawnError};

/// Порядок шага симуляции в FixedUpdate
///
/// Intake → Sense → React → Decide → Resolve → Motion
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Урон, скорости тел после физики
    Intake,
    /// Снимок агентов (реестр)
    Sense,
    /// Команды и прерывания
    React,
    /// Тик машин поведения
    Decide,
    /// Хитбоксы, отбрасывание, уборка трупов
    Resolve,
    /// Навигация и тела
    Motion,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = SimulationConfig::default();

        // RNG мог поставить create_headless_app с нужным seed
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(config.seed));
        }

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(config.tick_hz))
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Intake,
                    SimulationSet::Sense,
                    SimulationSet::React,
                    SimulationSet::Decide,
                    SimulationSet::Resolve,
                    SimulationSet::Motion,
                )
                    .chain(),
            )
            .add_plugins((CombatPlugin, AIPlugin, MotionPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время двигается вручную: один `app.update()` = ровно один fixed tick.
pub fn create_headless_app(seed: u64) -> App {
    let config = SimulationConfig::with_seed(seed);
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(config.seed))
        .insert_resource(Time::<Fixed>::from_hz(config.tick_hz))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(config.timestep())));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
