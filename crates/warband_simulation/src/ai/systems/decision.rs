//! System: шаг машины поведения каждого агента

use bevy::prelude::*;

use super::context::{drive, ordered, AgentParts, BehaviorServices};
use crate::components::Deactivated;

/// System: один тик кооперативной задачи каждого агента
///
/// Агенты обходятся по индексу entity; все читают один снимок реестра.
/// Выпущенные за тик снаряды и отбрасывания уходят событиями в конце.
pub fn tick_behavior(mut agents: Query<AgentParts, Without<Deactivated>>, mut services: BehaviorServices) {
    let order = ordered(agents.iter().map(|agent| agent.entity));

    services.run(|tick| {
        for entity in order {
            let Ok(mut agent) = agents.get_mut(entity) else {
                continue;
            };
            drive(&mut agent, tick, |machine, _, ctx| machine.tick(ctx));
        }
    });
}
