//! Pursue — сближение с целью через навигацию

use tracing::trace;

use crate::ai::{Action, ActionKind, ActionStatus, BehaviorContext, MotionAuthority, TaskCursor};
use crate::components::ANIM_RUN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Moving,
}

/// Идём к цели, пока не окажемся в `stop_distance` или не выйдет `max_duration`
#[derive(Debug, Clone)]
pub struct Pursue {
    pub stop_distance: f32,
    pub repath_interval: f32,
    /// Отрезок погони, после которого машина пересчитывает состояние
    pub max_duration: f32,
    task: TaskCursor<Step>,
    elapsed: f32,
    repath_in: f32,
}

impl Pursue {
    pub fn new(stop_distance: f32) -> Self {
        Self {
            stop_distance,
            repath_interval: 0.25,
            max_duration: 2.0,
            task: TaskCursor::default(),
            elapsed: 0.0,
            repath_in: 0.0,
        }
    }

    fn release(&mut self, ctx: &mut BehaviorContext) {
        ctx.navigator.stop();
        ctx.animation.set_flag(ANIM_RUN, false);
    }
}

impl Action for Pursue {
    fn id(&self) -> &'static str {
        "pursue"
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Movement
    }

    fn execute(&mut self, ctx: &mut BehaviorContext) -> ActionStatus {
        if !self.task.is_running() {
            if ctx.target.is_none() {
                return ActionStatus::Skipped;
            }
            if ctx.authority() != MotionAuthority::Navigation {
                ctx.claim_navigation();
            }
            ctx.animation.set_flag(ANIM_RUN, true);
            self.elapsed = 0.0;
            self.repath_in = 0.0;
            self.task.begin(Step::Moving);
        }

        let Some(target) = ctx.target else {
            self.release(ctx);
            self.task.finish();
            return ActionStatus::Completed;
        };

        if ctx.distance_to(target.position) <= self.stop_distance || self.elapsed >= self.max_duration {
            self.release(ctx);
            self.task.finish();
            return ActionStatus::Completed;
        }

        self.repath_in -= ctx.clock.delta;
        if self.repath_in <= 0.0 {
            ctx.navigator.set_destination(target.position);
            self.repath_in = self.repath_interval;
            trace!(agent = ?ctx.agent, destination = ?target.position, "pursue repath");
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
