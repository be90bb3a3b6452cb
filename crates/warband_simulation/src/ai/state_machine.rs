//! StateMachine — автомат поведения агента
//!
//! Один `tick` = один шаг кооперативной задачи агента:
//! 1. обновить цель (валидировать, при необходимости найти новую)
//! 2. продолжить текущее действие ИЛИ отсчитать паузу
//! 3. решить по политике состояния: двигаться, запустить действие, ждать
//!
//! Инвариант: в полёте не больше одного действия (`running`).
//! Прерывания (урон, смерть) и жизненный цикл — в `interrupts.rs` / `lifecycle.rs`.

use bevy::prelude::*;
use tracing::{debug, info, warn};

use super::contract::{ActionKind, ActionStatus, BehaviorContext, MotionAuthority};
use super::phase::{PhaseController, PhaseThreshold};
use super::pool::{ActionPool, ActionSlot};
use super::targeting::{self, TargetingProfile};
use crate::components::AgentKind;

/// Допуск при отсчёте пауз (float накопление dt)
const WAIT_EPSILON: f32 = 1e-4;

/// Состояние агента
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum BehaviorState {
    /// Ищем цель, стоим рядом с точкой сбора
    #[default]
    Idle,
    /// Сближаемся с целью (Movement действия)
    Chasing,
    /// Цель в радиусе атаки (Offensive действия)
    Engaging,
    /// Оглушён отбрасыванием, действий нет
    Stunned,
    /// Выведен из строя (здоровье 0), ждёт подъёма
    Incapacitated,
    /// Идём к точке сбора
    Regrouping,
}

/// Числовые параметры поведения
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorTuning {
    pub move_speed: f32,
    pub attack_range: f32,
    /// Дальше этого от точки сбора (без цели) — перегруппировка
    pub follow_range: f32,
    /// Ближе этого к точке сбора — перегруппировка закончена
    pub stop_follow_range: f32,
    pub knockback_power: f32,
    pub knockback_duration: f32,
    /// Пауза после каждого действия
    pub action_settle: f32,
    /// Период поиска цели в Idle
    pub idle_scan_interval: f32,
    /// Пауза, когда для состояния нет действия
    pub no_action_wait: f32,
    /// Босс: пауза, если цели нет
    pub boss_retarget_wait: f32,
    /// Босс: период обновления пути к цели
    pub boss_repath_interval: f32,
    /// Нашли цель во время перегруппировки — команда снимается
    pub clear_regroup_on_contact: bool,
    /// Через сколько секунд убрать труп (None — агент остаётся до подъёма)
    pub corpse_linger: Option<f32>,
}

impl Default for BehaviorTuning {
    fn default() -> Self {
        Self {
            move_speed: 3.5,
            attack_range: 7.0,
            follow_range: 10.0,
            stop_follow_range: 3.0,
            knockback_power: 10.0,
            knockback_duration: 0.5,
            action_settle: 0.2,
            idle_scan_interval: 0.1,
            no_action_wait: 1.0,
            boss_retarget_wait: 0.5,
            boss_repath_interval: 0.2,
            clear_regroup_on_contact: true,
            corpse_linger: None,
        }
    }
}

impl BehaviorTuning {
    pub fn boss() -> Self {
        Self {
            attack_range: 10.0,
            action_settle: 0.5,
            corpse_linger: Some(5.0),
            ..Self::default()
        }
    }
}

/// Что сделать, когда истечёт пауза
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Resume {
    /// Просто продолжить политику текущего состояния
    Continue,
    /// Пересчитать состояние по цели и дистанции
    Evaluate,
    /// Решение после шага перегруппировки
    RegroupDecision,
    /// Перейти в состояние
    Enter(BehaviorState),
}

/// Действие в полёте
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct RunningAction {
    pub slot: ActionSlot,
    /// Состояние, из которого действие запущено
    pub from: BehaviorState,
}

pub struct BehaviorMachine {
    pub(super) kind: AgentKind,
    pub(super) tuning: BehaviorTuning,
    pub(super) targeting: TargetingProfile,
    pub(super) pool: ActionPool,
    pub(super) phase: Option<PhaseController>,
    pub(super) state: BehaviorState,
    pub(super) target: Option<Entity>,
    pub(super) running: Option<RunningAction>,
    pub(super) wait: f32,
    pub(super) resume: Option<Resume>,
    pub(super) regroup_command: bool,
    pub(super) started: bool,
    pub(super) retired: bool,
}

impl BehaviorMachine {
    pub fn new(kind: AgentKind, tuning: BehaviorTuning, targeting: TargetingProfile, pool: ActionPool) -> Self {
        let state = if kind.is_boss() {
            BehaviorState::Chasing
        } else {
            BehaviorState::Idle
        };
        Self {
            kind,
            tuning,
            targeting,
            pool,
            phase: None,
            state,
            target: None,
            running: None,
            wait: 0.0,
            resume: None,
            regroup_command: false,
            started: false,
            retired: false,
        }
    }

    /// Пороги фаз (только босс)
    pub fn with_phases(mut self, thresholds: Vec<PhaseThreshold>) -> Self {
        self.phase = Some(PhaseController::new(thresholds));
        self
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn state(&self) -> BehaviorState {
        self.state
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn tuning(&self) -> &BehaviorTuning {
        &self.tuning
    }

    pub fn pool(&self) -> &ActionPool {
        &self.pool
    }

    /// Текущая фаза (1 для агентов без фаз)
    pub fn phase(&self) -> u32 {
        self.phase.as_ref().map_or(1, PhaseController::phase)
    }

    pub fn is_incapacitated(&self) -> bool {
        self.state == BehaviorState::Incapacitated
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    pub fn regroup_active(&self) -> bool {
        self.regroup_command
    }

    /// Id действия в полёте
    pub fn running_action(&self) -> Option<&'static str> {
        self.running
            .and_then(|running| self.pool.get(running.slot))
            .map(|action| action.id())
    }

    /// Один шаг задачи агента
    pub fn tick(&mut self, ctx: &mut BehaviorContext) {
        if self.retired || self.state == BehaviorState::Incapacitated {
            return;
        }
        if !self.started {
            self.start(ctx);
        }

        self.escalate_phase(ctx);
        self.refresh_target(ctx);

        if let Some(running) = self.running {
            let status = match self.pool.get_mut(running.slot) {
                Some(action) => action.execute(ctx),
                None => ActionStatus::Skipped,
            };
            if status.is_finished() {
                self.running = None;
                self.after_action(running, status, ctx);
            }
            return;
        }

        if let Some(resume) = self.resume {
            self.wait -= ctx.clock.delta;
            if self.wait > WAIT_EPSILON {
                return;
            }
            self.wait = 0.0;
            self.resume = None;
            self.apply_resume(resume, ctx);
        }

        self.decide(ctx);
    }

    /// Пересчитать состояние по цели и дистанции (CheckNextState)
    pub fn evaluate(&mut self, ctx: &mut BehaviorContext) -> BehaviorState {
        if self.state == BehaviorState::Incapacitated {
            return self.state;
        }
        self.sync_target(ctx);

        let next = if self.kind.is_boss() {
            match ctx.target_distance() {
                Some(distance) if distance < self.tuning.attack_range => BehaviorState::Engaging,
                _ => BehaviorState::Chasing,
            }
        } else {
            match ctx.target_distance() {
                Some(distance) if distance > self.tuning.attack_range => BehaviorState::Chasing,
                Some(_) => BehaviorState::Engaging,
                None if self.needs_regroup(ctx) => BehaviorState::Regrouping,
                None => BehaviorState::Idle,
            }
        };
        self.enter(next, ctx);
        next
    }

    fn start(&mut self, ctx: &mut BehaviorContext) {
        self.started = true;
        let multiplier = self.phase.as_ref().map_or(1.0, PhaseController::speed_multiplier);
        ctx.navigator.set_speed(self.tuning.move_speed * multiplier);
        ctx.claim_navigation();
        self.sync_target(ctx);
        debug!(agent = ?ctx.agent, kind = ?self.kind, target = ?self.target, "behavior started");
    }

    fn escalate_phase(&mut self, ctx: &mut BehaviorContext) {
        let Some(controller) = self.phase.as_mut() else {
            return;
        };
        if let Some(change) = controller.update(ctx.health.ratio()) {
            ctx.navigator.set_speed(self.tuning.move_speed * change.speed_multiplier);
            info!(
                agent = ?ctx.agent,
                from = change.from,
                to = change.to,
                health_ratio = ctx.health.ratio(),
                unlocked = ?self.pool.ids(),
                "boss phase escalated"
            );
        }
    }

    /// Валидировать цель, при отсутствии найти новую. true — цель была, но устарела.
    pub(super) fn sync_target(&mut self, ctx: &mut BehaviorContext) -> bool {
        let mut stale = false;
        if let Some(target) = self.target {
            match targeting::validate(ctx.registry, ctx.faction, target) {
                Some(entry) => {
                    ctx.target = Some(entry);
                    return false;
                }
                None => {
                    debug!(agent = ?ctx.agent, target = ?target, "target invalid, cleared");
                    self.target = None;
                    stale = true;
                }
            }
        }

        ctx.target = targeting::resolve(ctx.registry, &self.targeting, ctx.faction, ctx.position(), ctx.agent);
        self.target = ctx.target.map(|entry| entry.entity);
        if let Some(found) = self.target {
            debug!(agent = ?ctx.agent, target = ?found, "target acquired");
        }
        stale
    }

    fn refresh_target(&mut self, ctx: &mut BehaviorContext) {
        let stale = self.sync_target(ctx);

        // Цель исчезла посреди боя и замены нет: бросаем действие и пересчитываем сразу
        let in_combat = matches!(self.state, BehaviorState::Chasing | BehaviorState::Engaging);
        if stale && self.target.is_none() && in_combat && !self.kind.is_boss() {
            if let Some(id) = self.cancel_running(ctx) {
                debug!(agent = ?ctx.agent, action = id, "action stopped: target lost");
                self.ensure_navigation_authority(ctx, id);
            }
            self.resume = None;
            self.wait = 0.0;
            self.evaluate(ctx);
        }
    }

    fn apply_resume(&mut self, resume: Resume, ctx: &mut BehaviorContext) {
        match resume {
            Resume::Continue => {}
            Resume::Evaluate => {
                self.evaluate(ctx);
            }
            Resume::RegroupDecision => self.regroup_decision(ctx),
            Resume::Enter(state) => self.enter(state, ctx),
        }
    }

    fn decide(&mut self, ctx: &mut BehaviorContext) {
        if self.kind.is_boss() {
            self.decide_boss(ctx);
            return;
        }

        if matches!(self.state, BehaviorState::Chasing | BehaviorState::Engaging) && ctx.target.is_none() {
            self.evaluate(ctx);
        }

        match self.state {
            BehaviorState::Idle => self.decide_idle(ctx),
            BehaviorState::Chasing => self.decide_chasing(ctx),
            BehaviorState::Engaging => self.decide_engaging(ctx),
            BehaviorState::Regrouping => self.decide_regrouping(ctx),
            // Оглушение без паузы (например, после внешнего сброса) — просто пересчёт
            BehaviorState::Stunned => {
                self.evaluate(ctx);
            }
            BehaviorState::Incapacitated => {}
        }
    }

    fn decide_idle(&mut self, ctx: &mut BehaviorContext) {
        if ctx.target.is_some() {
            self.enter(BehaviorState::Chasing, ctx);
            self.decide_chasing(ctx);
        } else if self.needs_regroup(ctx) {
            self.enter(BehaviorState::Regrouping, ctx);
            self.decide_regrouping(ctx);
        } else {
            self.schedule(self.tuning.idle_scan_interval, Resume::Continue);
        }
    }

    fn decide_chasing(&mut self, ctx: &mut BehaviorContext) {
        if self.regroup_command {
            self.enter(BehaviorState::Regrouping, ctx);
            self.decide_regrouping(ctx);
            return;
        }
        if !self.dispatch(ActionKind::Movement, ctx) {
            self.schedule(self.tuning.no_action_wait, Resume::Evaluate);
        }
    }

    fn decide_engaging(&mut self, ctx: &mut BehaviorContext) {
        if !self.dispatch(ActionKind::Offensive, ctx) {
            self.enter(BehaviorState::Chasing, ctx);
            self.schedule(self.tuning.no_action_wait, Resume::Evaluate);
        }
    }

    fn decide_regrouping(&mut self, ctx: &mut BehaviorContext) {
        if self.pool.has_regroup() {
            self.start_action(ActionSlot::Regroup, ctx);
        } else {
            self.schedule(self.tuning.no_action_wait, Resume::RegroupDecision);
        }
    }

    fn regroup_decision(&mut self, ctx: &mut BehaviorContext) {
        if ctx.target.is_some() {
            if self.tuning.clear_regroup_on_contact && self.regroup_command {
                self.regroup_command = false;
                debug!(agent = ?ctx.agent, "regroup command cleared: contact");
            }
            self.enter(BehaviorState::Chasing, ctx);
            return;
        }
        if self.regroup_command {
            self.enter(BehaviorState::Regrouping, ctx);
            return;
        }
        let arrived = ctx
            .rally_point
            .is_none_or(|rally| ctx.distance_to(rally) <= self.tuning.stop_follow_range);
        let next = if arrived {
            BehaviorState::Idle
        } else {
            BehaviorState::Regrouping
        };
        self.enter(next, ctx);
    }

    fn decide_boss(&mut self, ctx: &mut BehaviorContext) {
        if self.state == BehaviorState::Engaging {
            if ctx.target.is_some() && self.dispatch(ActionKind::Offensive, ctx) {
                return;
            }
            self.enter(BehaviorState::Chasing, ctx);
            if ctx.target.is_some() {
                // Нет открытых действий — не крутиться каждый тик
                self.schedule(self.tuning.no_action_wait, Resume::Continue);
                return;
            }
        }
        self.boss_chase(ctx);
    }

    fn boss_chase(&mut self, ctx: &mut BehaviorContext) {
        self.enter(BehaviorState::Chasing, ctx);
        let Some(target) = ctx.target else {
            self.schedule(self.tuning.boss_retarget_wait, Resume::Continue);
            return;
        };

        if ctx.distance_to(target.position) < self.tuning.attack_range {
            ctx.navigator.stop();
            self.enter(BehaviorState::Engaging, ctx);
            return;
        }

        if ctx.authority() != MotionAuthority::Navigation {
            ctx.claim_navigation();
        }
        ctx.navigator.set_destination(target.position);
        self.schedule(self.tuning.boss_repath_interval, Resume::Continue);
    }

    fn needs_regroup(&self, ctx: &BehaviorContext) -> bool {
        self.regroup_command
            || ctx
                .rally_point
                .is_some_and(|rally| ctx.distance_to(rally) > self.tuning.follow_range)
    }

    /// Выбрать и запустить действие вида `kind`; false — подходящих нет
    fn dispatch(&mut self, kind: ActionKind, ctx: &mut BehaviorContext) -> bool {
        let phase = self.phase();
        let slot = if self.kind.is_boss() {
            self.pool.choose_weighted(kind, phase, ctx.rng)
        } else {
            self.pool.choose_uniform(kind, phase, ctx.rng)
        };
        match slot {
            Some(slot) => {
                self.start_action(slot, ctx);
                true
            }
            None => false,
        }
    }

    fn start_action(&mut self, slot: ActionSlot, ctx: &mut BehaviorContext) {
        // Инвариант одного действия: новый запуск только при пустом слоте
        if let Some(id) = self.cancel_running(ctx) {
            warn!(agent = ?ctx.agent, action = id, "action still running on dispatch, stopped");
        }

        let running = RunningAction { slot, from: self.state };
        let Some(action) = self.pool.get_mut(slot) else {
            return;
        };
        let id = action.id();
        let status = action.execute(ctx);
        debug!(agent = ?ctx.agent, state = ?running.from, action = id, ?status, "action dispatched");

        if status.is_finished() {
            self.after_action(running, status, ctx);
        } else {
            self.running = Some(running);
        }
    }

    fn after_action(&mut self, running: RunningAction, status: ActionStatus, ctx: &mut BehaviorContext) {
        let id = self.pool.get(running.slot).map_or("?", |action| action.id());
        self.ensure_navigation_authority(ctx, id);
        debug!(agent = ?ctx.agent, action = id, ?status, "action finished");

        let resume = if self.kind.is_boss() {
            Resume::Enter(BehaviorState::Chasing)
        } else if running.from == BehaviorState::Regrouping {
            Resume::RegroupDecision
        } else {
            Resume::Evaluate
        };
        self.schedule(self.tuning.action_settle, resume);
    }

    /// Остановить действие в полёте; возвращает его id
    pub(super) fn cancel_running(&mut self, ctx: &mut BehaviorContext) -> Option<&'static str> {
        let running = self.running.take()?;
        let action = self.pool.get_mut(running.slot)?;
        action.stop(ctx);
        Some(action.id())
    }

    /// Контракт: после действия движением управляет навигация
    pub(super) fn ensure_navigation_authority(&self, ctx: &mut BehaviorContext, action: &str) {
        let authority = ctx.authority();
        if authority != MotionAuthority::Navigation {
            warn!(agent = ?ctx.agent, action, ?authority, "movement authority not handed back, restoring navigation");
            ctx.claim_navigation();
        }
    }

    pub(super) fn schedule(&mut self, seconds: f32, resume: Resume) {
        self.wait = seconds.max(0.0);
        self.resume = Some(resume);
    }

    pub(super) fn enter(&mut self, next: BehaviorState, ctx: &mut BehaviorContext) {
        if self.state == next {
            return;
        }
        debug!(agent = ?ctx.agent, from = ?self.state, to = ?next, "state transition");
        let leaving_stun = self.state == BehaviorState::Stunned;
        self.state = next;
        if leaving_stun {
            ctx.claim_navigation();
        }
    }
}

impl std::fmt::Debug for BehaviorMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorMachine")
            .field("kind", &self.kind)
            .field("state", &self.state)
            .field("target", &self.target)
            .field("phase", &self.phase())
            .field("running", &self.running_action())
            .field("regroup", &self.regroup_command)
            .finish()
    }
}
