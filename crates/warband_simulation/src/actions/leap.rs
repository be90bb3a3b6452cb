//! Leap — баллистический прыжок к цели с ударной волной при приземлении
//!
//! Шаги: присесть → прыжок (физика) → полёт → приземление (отбрасывание
//! всех чужих в радиусе) → пауза → движение снова у навигации.

use bevy::prelude::*;
use tracing::debug;

use crate::ai::{Action, ActionKind, ActionStatus, BehaviorContext, TaskCursor};
use crate::components::ANIM_JUMP;
use crate::physics::GRAVITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Squat,
    Land,
    Settle,
}

#[derive(Debug, Clone)]
pub struct Leap {
    pub min_distance: f32,
    pub max_distance: f32,
    pub jump_height: f32,
    /// Подготовка к прыжку (сек)
    pub squash_time: f32,
    pub impact_radius: f32,
    pub impact_force: f32,
    pub settle_time: f32,
    task: TaskCursor<Step>,
}

impl Default for Leap {
    fn default() -> Self {
        Self {
            min_distance: 1.0,
            max_distance: 6.0,
            jump_height: 3.0,
            squash_time: 0.15,
            impact_radius: 2.5,
            impact_force: 8.0,
            settle_time: 0.5,
            task: TaskCursor::default(),
        }
    }
}

/// Начальная скорость и время полёта прыжка из `from` к `to`
///
/// Вертикаль — из высоты: v0y = √(2gh), полёт t = 2·v0y/g.
/// Горизонтальная дальность зажата в [min, max].
pub fn ballistic_jump(from: Vec3, to: Vec3, height: f32, min: f32, max: f32, gravity: f32) -> (Vec3, f32) {
    let vertical = (2.0 * gravity * height.max(0.0)).sqrt();
    let flight_time = if gravity > 0.0 { 2.0 * vertical / gravity } else { 0.0 };

    let flat = Vec3::new(to.x - from.x, 0.0, to.z - from.z);
    let distance = flat.length();
    let horizontal = if distance < 1e-4 || flight_time <= 0.0 {
        Vec3::ZERO
    } else {
        flat / distance * (distance.clamp(min, max) / flight_time)
    };

    (horizontal + Vec3::Y * vertical, flight_time)
}

impl Leap {
    fn land(&self, ctx: &mut BehaviorContext) {
        ctx.body.set_velocity(Vec3::ZERO);
        let center = ctx.position();
        ctx.effects.area_knockback(ctx.agent, center, self.impact_radius, self.impact_force);
        debug!(agent = ?ctx.agent, ?center, "leap landed");
    }
}

impl Action for Leap {
    fn id(&self) -> &'static str {
        "leap"
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Offensive
    }

    fn execute(&mut self, ctx: &mut BehaviorContext) -> ActionStatus {
        if !self.task.is_running() {
            let Some(target) = ctx.target else {
                return ActionStatus::Skipped;
            };
            ctx.face_towards(target.position);
            ctx.claim_physics();
            self.task.begin_after(Step::Squat, self.squash_time);
            return ActionStatus::Running;
        }

        if self.task.waiting(ctx.clock.delta) {
            return ActionStatus::Running;
        }

        let Some(step) = self.task.step() else {
            return ActionStatus::Completed;
        };
        match step {
            Step::Squat => {
                // Цель могла сместиться за время подготовки; без цели — прыжок вперёд
                let landing = ctx
                    .target
                    .map_or_else(|| ctx.position() + ctx.forward() * self.max_distance, |target| target.position);
                let (velocity, flight_time) = ballistic_jump(
                    ctx.position(),
                    landing,
                    self.jump_height,
                    self.min_distance,
                    self.max_distance,
                    GRAVITY,
                );
                ctx.animation.trigger(ANIM_JUMP);
                ctx.body.set_velocity(velocity);
                self.task.advance_after(Step::Land, flight_time);
                ActionStatus::Running
            }
            Step::Land => {
                self.land(ctx);
                self.task.advance_after(Step::Settle, self.settle_time);
                ActionStatus::Running
            }
            Step::Settle => {
                ctx.claim_navigation();
                self.task.finish();
                ActionStatus::Completed
            }
        }
    }

    fn stop(&mut self, ctx: &mut BehaviorContext) {
        if self.task.cancel() {
            ctx.body.set_velocity(Vec3::ZERO);
            ctx.claim_navigation();
        }
    }

    fn is_running(&self) -> bool {
        self.task.is_running()
    }
}
