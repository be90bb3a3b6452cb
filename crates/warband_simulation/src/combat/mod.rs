//! Combat module: здоровье, урон, хитбоксы, отбрасывание, снаряды
//!
//! ECS ответственность:
//! - DamageRequest → Health → DamageTaken / AgentDied (их слушает ai::systems::reactions)
//! - Хитбокс ближнего боя → DamageRequest
//! - AreaKnockback → импульсы телам
//! - ProjectileSpawned — запросы наружу (баллистика вне симуляции)
//! - DespawnAfter — уборка трупов босса

use bevy::prelude::*;

use crate::SimulationSet;

pub mod damage;
pub mod knockback;
pub mod melee;
pub mod projectile;


pub use damage::{apply_damage, despawn_after_timeout, AgentDied, DamageRequest, DamageTaken, DespawnAfter};
pub use knockback::{apply_area_knockback, area_impulse, AreaKnockback, EffectBatch};
pub use melee::resolve_melee_hits;
pub use projectile::{ProjectileBatch, ProjectileIds, ProjectileSpawned};

/// Combat Plugin
///
/// Порядок в FixedUpdate:
/// 1. apply_damage (Intake) — урон прошлого тика и внешние запросы
/// 2. resolve_melee_hits → apply_area_knockback → despawn_after_timeout (Resolve)
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DamageRequest>()
            .add_event::<DamageTaken>()
            .add_event::<AgentDied>()
            .add_event::<AreaKnockback>()
            .add_event::<ProjectileSpawned>()
            .init_resource::<ProjectileIds>();

        app.add_systems(FixedUpdate, apply_damage.in_set(SimulationSet::Intake));
        app.add_systems(
            FixedUpdate,
            (resolve_melee_hits, apply_area_knockback, despawn_after_timeout)
                .chain()
                .in_set(SimulationSet::Resolve),
        );
    }
}
