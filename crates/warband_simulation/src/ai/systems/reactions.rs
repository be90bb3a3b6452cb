//! AI reaction systems (команды, урон, смерть)
//!
//! Всё здесь выполняется в `SimulationSet::React`: после обновления реестра,
//! до `tick_behavior`. Поэтому прерывание, пришедшее в тике, видно решениям
//! этого же тика.

use bevy::prelude::*;
use tracing::{debug, info};

use super::context::{drive, ordered, AgentParts, BehaviorServices};
use crate::ai::{AgentKind, CommandScope, InterruptOutcome, RegroupCommand, ReviveRequest};
use crate::combat::{AgentDied, DamageTaken, DespawnAfter};
use crate::components::Deactivated;

/// Адресаты команды в детерминированном порядке
fn recipients(scope: CommandScope, agents: &Query<AgentParts, Without<Deactivated>>) -> Vec<Entity> {
    match scope {
        CommandScope::Agent(entity) => vec![entity],
        CommandScope::AllAllies => ordered(
            agents
                .iter()
                .filter(|agent| agent.brain.machine.kind() == AgentKind::Ally)
                .map(|agent| agent.entity),
        ),
    }
}

/// System: подъём выведенных из строя
pub fn handle_revive_requests(
    mut requests: EventReader<ReviveRequest>,
    mut agents: Query<AgentParts, Without<Deactivated>>,
    mut services: BehaviorServices,
) {
    if requests.is_empty() {
        return;
    }
    let requests: Vec<ReviveRequest> = requests.read().copied().collect();

    services.run(|tick| {
        for request in requests {
            let mut revived = 0;
            for entity in recipients(request.scope, &agents) {
                let Ok(mut agent) = agents.get_mut(entity) else {
                    continue;
                };
                if drive(&mut agent, tick, |machine, health, ctx| machine.revive(health, ctx)) {
                    revived += 1;
                }
            }
            debug!(scope = ?request.scope, revived, "revive request handled");
        }
    });
}

/// System: команды перегруппировки
pub fn handle_regroup_commands(
    mut commands_in: EventReader<RegroupCommand>,
    mut agents: Query<AgentParts, Without<Deactivated>>,
    mut services: BehaviorServices,
) {
    if commands_in.is_empty() {
        return;
    }
    let orders: Vec<RegroupCommand> = commands_in.read().copied().collect();

    services.run(|tick| {
        for order in orders {
            for entity in recipients(order.scope, &agents) {
                let Ok(mut agent) = agents.get_mut(entity) else {
                    continue;
                };
                if order.start {
                    drive(&mut agent, tick, |machine, _, ctx| machine.command_regroup(ctx));
                } else {
                    agent.brain.machine.release_regroup();
                }
            }
        }
    });
}

/// System: урон и смерть → InterruptController
///
/// Сначала весь урон тика (оглушение, смена цели), затем смерти: смерть
/// перекрывает оглушение того же тика. Летальный урон не оглушает.
pub fn route_combat_interrupts(
    mut damage: EventReader<DamageTaken>,
    mut deaths: EventReader<AgentDied>,
    mut agents: Query<AgentParts, Without<Deactivated>>,
    mut services: BehaviorServices,
    mut commands: Commands,
) {
    if damage.is_empty() && deaths.is_empty() {
        return;
    }
    let hits: Vec<DamageTaken> = damage.read().copied().collect();
    let deaths: Vec<AgentDied> = deaths.read().copied().collect();

    services.run(|tick| {
        for hit in hits.iter().filter(|hit| !hit.lethal) {
            let Ok(mut agent) = agents.get_mut(hit.entity) else {
                continue;
            };
            let outcome = drive(&mut agent, tick, |machine, _, ctx| {
                machine.on_damage(ctx, hit.impact_point, hit.attacker)
            });
            if outcome != InterruptOutcome::Ignored {
                debug!(agent = ?hit.entity, amount = hit.amount, ?outcome, "damage interrupt");
            }
        }

        for death in &deaths {
            let Ok(mut agent) = agents.get_mut(death.entity) else {
                continue;
            };
            let outcome = drive(&mut agent, tick, |machine, _, ctx| machine.on_death(ctx));
            if outcome != InterruptOutcome::Incapacitated {
                continue;
            }

            if let Some(linger) = agent.brain.machine.tuning().corpse_linger {
                let despawn_time = tick.clock.elapsed + linger;
                commands.entity(death.entity).insert(DespawnAfter { despawn_time });
                info!(agent = ?death.entity, killer = ?death.killer, despawn_time, "corpse scheduled for removal");
            }
        }
    });
}
