//! SpinFire — вращение на месте с огнём из двух стволов (вперёд и назад)
//!
//! Цель не нужна: это атака по площади.

use bevy::prelude::*;

use crate::ai::{Action, ActionKind, ActionStatus, BehaviorContext, ProjectileAim, TaskCursor};
use crate::components::ANIM_ATTACK;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Spinning,
}

#[derive(Debug, Clone)]
pub struct SpinFire {
    /// Градусы в секунду
    pub spin_speed: f32,
    pub duration: f32,
    pub fire_interval: f32,
    task: TaskCursor<Step>,
    elapsed: f32,
    fire_in: f32,
}

impl Default for SpinFire {
    fn default() -> Self {
        Self {
            spin_speed: 180.0,
            duration: 5.0,
            fire_interval: 0.2,
            task: TaskCursor::default(),
            elapsed: 0.0,
            fire_in: 0.0,
        }
    }
}

impl SpinFire {
    fn fire_twin(&self, ctx: &mut BehaviorContext) {
        let forward = ctx.forward();
        let base = ctx.position() + Vec3::Y * 1.5;
        ctx.animation.trigger(ANIM_ATTACK);
        for direction in [forward, -forward] {
            ctx.projectiles.spawn(base + direction * 0.5, ProjectileAim::Direction(direction), ctx.agent);
        }
    }
}

impl Action for SpinFire {
    fn id(&self) -> &'static str {
        "spin_fire"
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Offensive
    }

    fn execute(&mut self, ctx: &mut BehaviorContext) -> ActionStatus {
        if !self.task.is_running() {
            ctx.navigator.stop();
            self.elapsed = 0.0;
            self.fire_in = 0.0;
            self.task.begin(Step::Spinning);
        }

        if self.elapsed >= self.duration {
            self.task.finish();
            return ActionStatus::Completed;
        }

        let angle = self.spin_speed.to_radians() * ctx.clock.delta;
        ctx.transform.rotate_y(angle);

        self.fire_in -= ctx.clock.delta;
        if self.fire_in <= 0.0 {
            self.fire_twin(ctx);
            self.fire_in = self.fire_interval;
        }

        self.elapsed += ctx.clock.delta;
        ActionStatus::Running
    }

    fn stop(&mut self, _ctx: &mut BehaviorContext) {
        self.task.cancel();
    }

    fn is_running(&self) -> bool {
        self.task.is_running()
    }
}
