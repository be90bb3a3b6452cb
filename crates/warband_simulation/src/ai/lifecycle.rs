//! LifecycleController — подъём после Incapacitated и окончательное удаление

use tracing::{debug, info};

use super::contract::{BehaviorContext, HealthProvider, HealthReading};
use super::state_machine::{BehaviorMachine, BehaviorState};
use crate::components::ANIM_REVIVE;

impl BehaviorMachine {
    /// Поднять агента. false — агент не выведен из строя, не поднимается или удалён.
    ///
    /// После подъёма агент в Idle без цели; на следующем тике цикл решений
    /// стартует заново (как у только что заспавненного).
    pub fn revive(&mut self, health: &mut dyn HealthProvider, ctx: &mut BehaviorContext) -> bool {
        if self.retired || self.state != BehaviorState::Incapacitated || !self.kind.is_revivable() {
            debug!(agent = ?ctx.agent, state = ?self.state, retired = self.retired, "revive ignored");
            return false;
        }

        health.resurrect();
        ctx.health = HealthReading::of(health);

        self.state = BehaviorState::Idle;
        self.target = None;
        self.running = None;
        self.resume = None;
        self.wait = 0.0;
        self.regroup_command = false;
        self.started = false;
        ctx.target = None;

        ctx.claim_navigation();
        ctx.navigator.stop();
        ctx.animation.trigger(ANIM_REVIVE);

        info!(agent = ?ctx.agent, health = ctx.health.current, "agent revived");
        true
    }

    /// Агент окончательно удалён из мира: больше не тикает и не поднимается
    pub fn retire(&mut self) {
        self.retired = true;
    }
}

impl BehaviorMachine {
    /// Команда перегруппировки: бросить бой и идти к точке сбора.
    /// false — команда не принята (босс, выведен из строя, удалён).
    pub fn command_regroup(&mut self, ctx: &mut BehaviorContext) -> bool {
        if self.retired || self.kind.is_boss() || self.state == BehaviorState::Incapacitated {
            return false;
        }

        self.regroup_command = true;
        if let Some(id) = self.cancel_running(ctx) {
            debug!(agent = ?ctx.agent, action = id, "action stopped: regroup ordered");
            self.ensure_navigation_authority(ctx, id);
        }
        self.target = None;
        ctx.target = None;

        // Оглушённый дождётся конца отбрасывания, дальше решит политика
        if self.state != BehaviorState::Stunned {
            self.resume = None;
            self.wait = 0.0;
            self.enter(BehaviorState::Regrouping, ctx);
        }
        info!(agent = ?ctx.agent, "regroup ordered");
        true
    }

    /// Снять команду перегруппировки (текущий шаг доигрывается)
    pub fn release_regroup(&mut self) {
        self.regroup_command = false;
    }
}
