//! RangedBurst — прицеливание, очередь, восстановление

use bevy::prelude::*;
use tracing::debug;

use crate::ai::{Action, ActionKind, ActionStatus, BehaviorContext, ProjectileAim, TaskCursor};
use crate::components::ANIM_ATTACK;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Aim,
    Fire { shot: u32 },
    Recover,
}

#[derive(Debug, Clone)]
pub struct RangedBurst {
    pub aim_duration: f32,
    /// Скорость доворота к цели при прицеливании (доля за секунду)
    pub turn_speed: f32,
    pub burst_count: u32,
    pub burst_interval: f32,
    pub recovery: f32,
    /// Ствол относительно агента (локальные координаты)
    pub muzzle_offset: Vec3,
    task: TaskCursor<Step>,
    aimed_for: f32,
}

impl Default for RangedBurst {
    fn default() -> Self {
        Self {
            aim_duration: 0.5,
            turn_speed: 5.0,
            burst_count: 3,
            burst_interval: 0.2,
            recovery: 2.0,
            muzzle_offset: Vec3::new(0.0, 1.5, -0.5),
            task: TaskCursor::default(),
            aimed_for: 0.0,
        }
    }
}

impl RangedBurst {
    fn fire(&self, ctx: &mut BehaviorContext) {
        let origin = ctx.position() + ctx.transform.rotation * self.muzzle_offset;
        let direction = ctx.forward();
        ctx.animation.trigger(ANIM_ATTACK);
        let handle = ctx.projectiles.spawn(origin, ProjectileAim::Direction(direction), ctx.agent);
        debug!(agent = ?ctx.agent, projectile = handle.0, "ranged shot");
    }
}

impl Action for RangedBurst {
    fn id(&self) -> &'static str {
        "ranged_burst"
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Offensive
    }

    fn execute(&mut self, ctx: &mut BehaviorContext) -> ActionStatus {
        if !self.task.is_running() {
            if ctx.target.is_none() {
                return ActionStatus::Skipped;
            }
            ctx.navigator.stop();
            self.aimed_for = 0.0;
            self.task.begin(Step::Aim);
        }

        if self.task.waiting(ctx.clock.delta) {
            return ActionStatus::Running;
        }

        let Some(step) = self.task.step() else {
            return ActionStatus::Completed;
        };
        match step {
            Step::Aim => {
                let Some(target) = ctx.target else {
                    // Цель пропала до выстрела — очередь не начинаем
                    self.task.finish();
                    return ActionStatus::Completed;
                };
                ctx.turn_towards(target.position, ctx.clock.delta * self.turn_speed);
                self.aimed_for += ctx.clock.delta;
                if self.aimed_for >= self.aim_duration {
                    self.task.advance(Step::Fire { shot: 0 });
                }
                ActionStatus::Running
            }
            Step::Fire { shot } => {
                self.fire(ctx);
                if shot + 1 < self.burst_count {
                    self.task.advance_after(Step::Fire { shot: shot + 1 }, self.burst_interval);
                } else {
                    self.task.advance_after(Step::Recover, self.recovery);
                }
                ActionStatus::Running
            }
            Step::Recover => {
                self.task.finish();
                ActionStatus::Completed
            }
        }
    }

    fn stop(&mut self, _ctx: &mut BehaviorContext) {
        // Навигация не отбиралась (только сброшен путь): отменяем очередь
        self.task.cancel();
    }

    fn is_running(&self) -> bool {
        self.task.is_running()
    }
}
