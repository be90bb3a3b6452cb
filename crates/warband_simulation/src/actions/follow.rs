//! Follow — идти к точке сбора (действие перегруппировки)

use crate::ai::{Action, ActionKind, ActionStatus, BehaviorContext, MotionAuthority, TaskCursor};
use crate::components::ANIM_RUN;

/// Навигация останавливается чуть ближе порога, чтобы проверка прибытия срабатывала
const ARRIVAL_MARGIN: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Walking,
}

#[derive(Debug, Clone)]
pub struct Follow {
    /// Ближе этого к точке сбора — пришли
    pub stop_distance: f32,
    pub update_interval: f32,
    task: TaskCursor<Step>,
}

impl Follow {
    pub fn new(stop_distance: f32) -> Self {
        Self {
            stop_distance,
            update_interval: 0.5,
            task: TaskCursor::default(),
        }
    }

    fn release(&mut self, ctx: &mut BehaviorContext) {
        ctx.navigator.stop();
        ctx.navigator.set_stopping_distance(0.0);
        ctx.animation.set_flag(ANIM_RUN, false);
    }
}

impl Action for Follow {
    fn id(&self) -> &'static str {
        "follow"
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Movement
    }

    fn execute(&mut self, ctx: &mut BehaviorContext) -> ActionStatus {
        if !self.task.is_running() {
            if ctx.rally_point.is_none() {
                return ActionStatus::Skipped;
            }
            if ctx.authority() != MotionAuthority::Navigation {
                ctx.claim_navigation();
            }
            ctx.navigator.set_stopping_distance((self.stop_distance - ARRIVAL_MARGIN).max(0.0));
            ctx.animation.set_flag(ANIM_RUN, true);
            self.task.begin(Step::Walking);
        }

        if self.task.waiting(ctx.clock.delta) {
            return ActionStatus::Running;
        }

        let Some(rally) = ctx.rally_point else {
            self.release(ctx);
            self.task.finish();
            return ActionStatus::Completed;
        };

        ctx.navigator.set_destination(rally);
        if ctx.distance_to(rally) <= self.stop_distance {
            self.release(ctx);
            self.task.finish();
            return ActionStatus::Completed;
        }

        self.task.advance_after(Step::Walking, self.update_interval);
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
