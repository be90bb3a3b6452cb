//! AI module: оркестрация поведения агентов (союзники, враги, босс)
//!
//! Ядро (без ECS):
//! - contract: контракт действия + узкие trait-коллабораторы + BehaviorContext
//! - task: возобновляемый курсор шага (кооперативная задача действия)
//! - pool / targeting / phase: выбор действия, поиск цели, фазы босса
//! - state_machine + interrupts + lifecycle: автомат, прерывания, подъём
//!
//! ECS обвязка: components (Brain), systems (реестр, реакции, тик), events.

use bevy::prelude::*;

use crate::SimulationSet;

pub mod components;
pub mod contract;
pub mod events;
pub mod interrupts;
pub mod lifecycle;
pub mod phase;
pub mod pool;
pub mod registry;
pub mod state_machine;
pub mod systems;
pub mod targeting;
pub mod task;

#[cfg(test)]
mod state_machine_tests;
#[cfg(test)]
pub(crate) mod test_rig;

// Re-export основных типов
pub use components::Brain;
pub use contract::{
    yaw_towards, Action, ActionKind, ActionStatus, AnimationSignal, AttackCollider, BehaviorContext, CombatEffects,
    HealthProvider, HealthReading, MotionAuthority, Navigator, PhysicsImpulse, ProjectileAim, ProjectileFactory,
    ProjectileHandle, RegistryEntry, SpatialRegistry, StepClock,
};
pub use events::{CommandScope, RegroupCommand, ReviveRequest};
pub use interrupts::{knockback_impulse, InterruptOutcome};
pub use phase::{PhaseChange, PhaseController, PhaseThreshold};
pub use pool::{ActionPool, ActionSlot, PoolEntry};
pub use registry::AgentRegistry;
pub use state_machine::{BehaviorMachine, BehaviorState, BehaviorTuning};
pub use targeting::{RadiusFallback, TargetingProfile};
pub use task::TaskCursor;

pub use crate::components::AgentKind;

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate для детерминизма:
/// 1. refresh_agent_registry (Sense) — снимок агентов
/// 2. handle_revive_requests → handle_regroup_commands → route_combat_interrupts (React)
/// 3. tick_behavior (Decide) — шаг машины каждого агента
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ReviveRequest>()
            .add_event::<RegroupCommand>()
            .init_resource::<AgentRegistry>()
            .register_type::<BehaviorState>();

        app.add_systems(FixedUpdate, systems::refresh_agent_registry.in_set(SimulationSet::Sense));
        app.add_systems(
            FixedUpdate,
            (
                systems::handle_revive_requests,
                systems::handle_regroup_commands,
                systems::route_combat_interrupts,
            )
                .chain() // Последовательное выполнение для детерминизма
                .in_set(SimulationSet::React),
        );
        app.add_systems(FixedUpdate, systems::tick_behavior.in_set(SimulationSet::Decide));
    }
}
