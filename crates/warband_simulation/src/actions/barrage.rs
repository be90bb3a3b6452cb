//! MissileBarrage — залп навесных ракет с разбросом вокруг цели

use bevy::prelude::*;
use rand::Rng;

use crate::ai::{Action, ActionKind, ActionStatus, BehaviorContext, ProjectileAim, TaskCursor};
use crate::components::ANIM_ATTACK;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Launch { shot: u32 },
    Recover,
}

#[derive(Debug, Clone)]
pub struct MissileBarrage {
    pub pre_delay: f32,
    pub missile_count: u32,
    pub launch_interval: f32,
    /// Радиус разброса точек падения
    pub dispersion: f32,
    pub recovery: f32,
    task: TaskCursor<Step>,
    /// Центр залпа, зафиксированный при старте
    aim_point: Vec3,
}

impl Default for MissileBarrage {
    fn default() -> Self {
        Self {
            pre_delay: 1.0,
            missile_count: 5,
            launch_interval: 0.2,
            dispersion: 3.0,
            recovery: 1.0,
            task: TaskCursor::default(),
            aim_point: Vec3::ZERO,
        }
    }
}

impl Action for MissileBarrage {
    fn id(&self) -> &'static str {
        "missile_barrage"
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Offensive
    }

    fn execute(&mut self, ctx: &mut BehaviorContext) -> ActionStatus {
        if !self.task.is_running() {
            let Some(target) = ctx.target else {
                return ActionStatus::Skipped;
            };
            ctx.navigator.stop();
            ctx.face_towards(target.position);
            self.aim_point = target.position;
            self.task.begin_after(Step::Launch { shot: 0 }, self.pre_delay);
            return ActionStatus::Running;
        }

        if self.task.waiting(ctx.clock.delta) {
            return ActionStatus::Running;
        }

        let Some(step) = self.task.step() else {
            return ActionStatus::Completed;
        };
        match step {
            Step::Launch { shot } => {
                // Цель ещё жива — наводимся на её текущую позицию
                if let Some(target) = ctx.target {
                    self.aim_point = target.position;
                }
                let angle = ctx.rng.gen_range(0.0..std::f32::consts::TAU);
                let radius = self.dispersion * ctx.rng.gen::<f32>().sqrt();
                let landing = self.aim_point + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);

                let origin = ctx.position() + Vec3::Y * 2.0;
                ctx.animation.trigger(ANIM_ATTACK);
                ctx.projectiles.spawn(origin, ProjectileAim::Lob { target: landing }, ctx.agent);

                if shot + 1 < self.missile_count {
                    self.task.advance_after(Step::Launch { shot: shot + 1 }, self.launch_interval);
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
        self.task.cancel();
    }

    fn is_running(&self) -> bool {
        self.task.is_running()
    }
}
