//! Хитбокс ближнего боя → DamageRequest

use bevy::prelude::*;
use tracing::debug;

use crate::ai::{AgentRegistry, SpatialRegistry};
use crate::combat::DamageRequest;
use crate::components::{Faction, MeleeHitbox};

/// Система: активные хитбоксы бьют враждебных агентов в сфере
///
/// Каждая цель получает удар один раз за активацию хитбокса.
/// Точка удара — позиция атакующего (отбрасывание направлено от него).
pub fn resolve_melee_hits(
    mut attackers: Query<(Entity, &Faction, &Transform, &mut MeleeHitbox)>,
    registry: Res<AgentRegistry>,
    mut damage_events: EventWriter<DamageRequest>,
) {
    for (attacker, faction, transform, mut hitbox) in attackers.iter_mut() {
        if !hitbox.active {
            continue;
        }

        let center = hitbox.center(transform);
        for victim in registry.find_within_radius(center, hitbox.radius) {
            if victim.entity == attacker
                || !faction.is_hostile_to(victim.faction)
                || !victim.is_alive()
                || hitbox.struck.contains(&victim.entity)
            {
                continue;
            }

            hitbox.struck.push(victim.entity);
            damage_events.write(DamageRequest {
                target: victim.entity,
                amount: hitbox.damage,
                impact_point: transform.translation,
                attacker: Some(attacker),
            });
            debug!(attacker = ?attacker, victim = ?victim.entity, damage = hitbox.damage, "melee hit");
        }
    }
}
