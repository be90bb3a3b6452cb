//! Урон и смерть: DamageRequest → Health → DamageTaken / AgentDied

use bevy::prelude::*;
use tracing::{debug, info};

use crate::components::{Deactivated, Health};

/// Запрос урона (от хитбокса, снаряда, внешней системы)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageRequest {
    pub target: Entity,
    pub amount: u32,
    /// Откуда пришёл удар (для направления отбрасывания)
    pub impact_point: Vec3,
    pub attacker: Option<Entity>,
}

/// Событие: урон применён
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageTaken {
    pub entity: Entity,
    pub amount: u32,
    pub impact_point: Vec3,
    pub attacker: Option<Entity>,
    /// Этот удар добил
    pub lethal: bool,
}

/// Событие: здоровье агента дошло до 0
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AgentDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Компонент-маркер: деспавн entity после указанного времени
#[derive(Component, Debug, Clone, Copy)]
pub struct DespawnAfter {
    /// Время деспавна (в секундах от старта симуляции)
    pub despawn_time: f32,
}

/// Система: применить запросы урона
///
/// Мёртвые (health == 0) и выключенные урон не получают — выведенный из строя
/// агент игнорирует удары до подъёма.
pub fn apply_damage(
    mut requests: EventReader<DamageRequest>,
    mut taken_events: EventWriter<DamageTaken>,
    mut died_events: EventWriter<AgentDied>,
    mut targets: Query<&mut Health, Without<Deactivated>>,
) {
    for request in requests.read() {
        let Ok(mut health) = targets.get_mut(request.target) else {
            debug!(target = ?request.target, "damage request: no health, skipped");
            continue;
        };
        if !health.is_alive() {
            continue;
        }

        health.take_damage(request.amount);
        let lethal = !health.is_alive();

        taken_events.write(DamageTaken {
            entity: request.target,
            amount: request.amount,
            impact_point: request.impact_point,
            attacker: request.attacker,
            lethal,
        });

        if lethal {
            died_events.write(AgentDied {
                entity: request.target,
                killer: request.attacker,
            });
            info!(entity = ?request.target, killer = ?request.attacker, "agent health depleted");
        }
    }
}

/// Система: деспавн entities с истёкшим DespawnAfter
pub fn despawn_after_timeout(mut commands: Commands, query: Query<(Entity, &DespawnAfter)>, time: Res<Time>) {
    let current_time = time.elapsed_secs();

    for (entity, despawn_after) in query.iter() {
        if current_time >= despawn_after.despawn_time {
            info!(entity = ?entity, "despawning corpse (timeout)");
            commands.entity(entity).despawn();
        }
    }
}
