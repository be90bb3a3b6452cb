//! OrbitFire — кружить вокруг цели на идеальной дистанции и стрелять

use bevy::prelude::*;

use crate::ai::{Action, ActionKind, ActionStatus, BehaviorContext, ProjectileAim, TaskCursor};
use crate::components::{ANIM_ATTACK, ANIM_RUN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Strafing,
}

#[derive(Debug, Clone)]
pub struct OrbitFire {
    pub orbit_speed: f32,
    pub ideal_distance: f32,
    /// Допуск дистанции, внутри которого радиальной коррекции нет
    pub distance_threshold: f32,
    pub duration: f32,
    pub fire_interval: f32,
    task: TaskCursor<Step>,
    elapsed: f32,
    fire_in: f32,
}

impl Default for OrbitFire {
    fn default() -> Self {
        Self {
            orbit_speed: 3.0,
            ideal_distance: 10.0,
            distance_threshold: 1.0,
            duration: 5.0,
            fire_interval: 0.5,
            task: TaskCursor::default(),
            elapsed: 0.0,
            fire_in: 0.0,
        }
    }
}

/// Скорость облёта: по касательной + коррекция к идеальной дистанции
pub fn strafe_velocity(position: Vec3, center: Vec3, speed: f32, ideal: f32, threshold: f32) -> Vec3 {
    let offset = Vec3::new(position.x - center.x, 0.0, position.z - center.z);
    let distance = offset.length();
    if distance < 1e-4 {
        return Vec3::X * speed;
    }
    let outward = offset / distance;
    // Облёт против часовой стрелки (вид сверху)
    let tangent = Vec3::new(-outward.z, 0.0, outward.x);

    let error = distance - ideal;
    let radial = if error.abs() > threshold {
        -outward * error.signum()
    } else {
        Vec3::ZERO
    };
    (tangent + radial).normalize_or_zero() * speed
}

impl OrbitFire {
    fn release(&mut self, ctx: &mut BehaviorContext) {
        ctx.animation.set_flag(ANIM_RUN, false);
        ctx.claim_navigation();
    }
}

impl Action for OrbitFire {
    fn id(&self) -> &'static str {
        "orbit_fire"
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Offensive
    }

    fn execute(&mut self, ctx: &mut BehaviorContext) -> ActionStatus {
        if !self.task.is_running() {
            if ctx.target.is_none() {
                return ActionStatus::Skipped;
            }
            ctx.claim_physics();
            ctx.animation.set_flag(ANIM_RUN, true);
            self.elapsed = 0.0;
            self.fire_in = self.fire_interval;
            self.task.begin(Step::Strafing);
        }

        let Some(target) = ctx.target else {
            self.release(ctx);
            self.task.finish();
            return ActionStatus::Completed;
        };
        if self.elapsed >= self.duration {
            self.release(ctx);
            self.task.finish();
            return ActionStatus::Completed;
        }

        let velocity = strafe_velocity(
            ctx.position(),
            target.position,
            self.orbit_speed,
            self.ideal_distance,
            self.distance_threshold,
        );
        ctx.body.set_velocity(velocity);
        ctx.face_towards(target.position);

        self.fire_in -= ctx.clock.delta;
        if self.fire_in <= 0.0 {
            let origin = ctx.position() + Vec3::Y * 1.5;
            let direction = (target.position - ctx.position()).normalize_or_zero();
            ctx.animation.trigger(ANIM_ATTACK);
            ctx.projectiles.spawn(origin, ProjectileAim::Direction(direction), ctx.agent);
            self.fire_in = self.fire_interval;
        }

        self.elapsed += ctx.clock.delta;
        ActionStatus::Running
    }

    fn stop(&mut self, ctx: &mut BehaviorContext) {
        if self.task.cancel() {
            self.release(ctx);
        }
    }

    fn is_running(&self) -> bool {
        self.task.is_running()
    }
}
