//! InterruptController — реакция на урон и смерть
//!
//! Вызывается системой `route_combat_interrupts` в том же тике, где пришло
//! событие, до решений машины состояний. Приоритет: Incapacitated > Stunned.

use bevy::prelude::*;
use tracing::{debug, info};

use super::contract::BehaviorContext;
use super::state_machine::{BehaviorMachine, BehaviorState, Resume};
use crate::components::ANIM_KNOCKOUT;

/// Итог обработки прерывания
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptOutcome {
    /// Прерывание отброшено (уже оглушён / выведен из строя)
    Ignored,
    /// Действие остановлено, агент оглушён и отброшен
    Stunned,
    /// Босс сменил цель на атакующего (без оглушения)
    Retargeted,
    Incapacitated,
}

/// Импульс отбрасывания: от точки удара по горизонтали + вверх той же силой
pub fn knockback_impulse(position: Vec3, impact_point: Vec3, power: f32) -> Vec3 {
    let away = Vec3::new(position.x - impact_point.x, 0.0, position.z - impact_point.z).normalize_or_zero();
    away * power + Vec3::Y * power
}

impl BehaviorMachine {
    /// Урон получен
    pub fn on_damage(
        &mut self,
        ctx: &mut BehaviorContext,
        impact_point: Vec3,
        attacker: Option<Entity>,
    ) -> InterruptOutcome {
        if self.retired || self.state == BehaviorState::Incapacitated {
            return InterruptOutcome::Ignored;
        }

        if self.kind.is_boss() {
            // Босс не оглушается и не прерывает действие, только меняет цель
            return if self.redirect_threat(ctx, attacker) {
                InterruptOutcome::Retargeted
            } else {
                InterruptOutcome::Ignored
            };
        }

        if self.state == BehaviorState::Stunned {
            debug!(agent = ?ctx.agent, "hit while stunned, ignored");
            return InterruptOutcome::Ignored;
        }

        if let Some(id) = self.cancel_running(ctx) {
            debug!(agent = ?ctx.agent, action = id, "action interrupted by damage");
        }
        ctx.attack.set_active(false);

        self.enter(BehaviorState::Stunned, ctx);
        self.schedule(self.tuning.knockback_duration, Resume::Evaluate);

        let impulse = knockback_impulse(ctx.position(), impact_point, self.tuning.knockback_power);
        ctx.claim_physics();
        ctx.body.set_velocity(Vec3::ZERO);
        ctx.body.apply_impulse(impulse);

        let retargeted = self.redirect_threat(ctx, attacker);
        debug!(agent = ?ctx.agent, ?impulse, ?attacker, retargeted, "stunned by hit");
        InterruptOutcome::Stunned
    }

    /// Здоровье кончилось
    pub fn on_death(&mut self, ctx: &mut BehaviorContext) -> InterruptOutcome {
        if self.state == BehaviorState::Incapacitated {
            return InterruptOutcome::Ignored;
        }

        if let Some(id) = self.cancel_running(ctx) {
            debug!(agent = ?ctx.agent, action = id, "action interrupted by death");
        }
        self.resume = None;
        self.wait = 0.0;
        self.regroup_command = false;
        self.target = None;
        ctx.target = None;

        ctx.attack.set_active(false);
        ctx.hold();
        ctx.animation.trigger(ANIM_KNOCKOUT);

        self.state = BehaviorState::Incapacitated;
        if !self.kind.is_revivable() {
            self.retire();
        }
        info!(agent = ?ctx.agent, kind = ?self.kind, revivable = !self.retired, "agent incapacitated");
        InterruptOutcome::Incapacitated
    }

    /// Атакующий враждебен и ещё не цель — он становится целью
    fn redirect_threat(&mut self, ctx: &mut BehaviorContext, attacker: Option<Entity>) -> bool {
        let Some(attacker) = attacker else {
            return false;
        };
        if attacker == ctx.agent || self.target == Some(attacker) {
            return false;
        }
        match ctx.registry.lookup(attacker) {
            Some(entry) if entry.active && entry.is_alive() && ctx.faction.is_hostile_to(entry.faction) => {
                self.target = Some(attacker);
                ctx.target = Some(entry);
                debug!(agent = ?ctx.agent, target = ?attacker, "threat redirected to attacker");
                true
            }
            _ => false,
        }
    }
}
