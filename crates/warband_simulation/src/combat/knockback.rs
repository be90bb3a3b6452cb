//! Отбрасывание по площади (ударная волна приземления)

use bevy::prelude::*;
use tracing::debug;

use crate::ai::{Brain, CombatEffects, PhysicsImpulse};
use crate::components::{BodyMotion, Faction};

/// Запрос: отбросить всех (кроме фракции источника) в радиусе
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AreaKnockback {
    pub source: Entity,
    pub center: Vec3,
    pub radius: f32,
    pub force: f32,
}

/// Накопитель эффектов за тик (реализация CombatEffects для BehaviorContext)
#[derive(Debug, Default)]
pub struct EffectBatch {
    pub knockbacks: Vec<AreaKnockback>,
}

impl EffectBatch {
    pub fn commit(self, writer: &mut EventWriter<AreaKnockback>) {
        for knockback in self.knockbacks {
            writer.write(knockback);
        }
    }
}

impl CombatEffects for EffectBatch {
    fn area_knockback(&mut self, source: Entity, center: Vec3, radius: f32, force: f32) {
        self.knockbacks.push(AreaKnockback {
            source,
            center,
            radius,
            force,
        });
    }
}

/// Импульс взрыва: линейно слабеет к краю радиуса, подбрасывает вверх
pub fn area_impulse(center: Vec3, position: Vec3, radius: f32, force: f32) -> Option<Vec3> {
    let distance = center.distance(position);
    if radius <= 0.0 || distance > radius {
        return None;
    }
    let falloff = 1.0 - distance / radius;
    let away = Vec3::new(position.x - center.x, 0.0, position.z - center.z).normalize_or_zero();
    Some((away + Vec3::Y) * force * falloff)
}

/// Система: применить отбрасывания к телам
///
/// Кинематические тела импульсы игнорируют (как в физике);
/// выведенные из строя агенты не отбрасываются.
pub fn apply_area_knockback(
    mut events: EventReader<AreaKnockback>,
    mut bodies: Query<(Entity, &Faction, &Transform, &mut BodyMotion, Option<&Brain>)>,
) {
    for event in events.read() {
        let source_faction = bodies.get(event.source).ok().map(|(_, faction, ..)| *faction);

        for (entity, faction, transform, mut body, brain) in bodies.iter_mut() {
            if entity == event.source || Some(*faction) == source_faction {
                continue;
            }
            if brain.is_some_and(|brain| brain.machine.is_incapacitated()) {
                continue;
            }
            let Some(impulse) = area_impulse(event.center, transform.translation, event.radius, event.force) else {
                continue;
            };
            body.apply_impulse(impulse);
            debug!(source = ?event.source, target = ?entity, ?impulse, "area knockback");
        }
    }
}
