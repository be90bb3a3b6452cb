//! MeleeStrike — удар ближнего боя с кулдауном
//!
//! Остановиться, развернуться к цели, включить хитбокс на `attack_duration`,
//! выключить. Урон наносит `combat::resolve_melee_hits` по активному хитбоксу.

use crate::ai::{Action, ActionKind, ActionStatus, BehaviorContext, TaskCursor};
use crate::components::ANIM_ATTACK;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Swing,
}

#[derive(Debug, Clone)]
pub struct MeleeStrike {
    pub cooldown: f32,
    pub attack_duration: f32,
    task: TaskCursor<Step>,
    last_attack: Option<f32>,
}

impl Default for MeleeStrike {
    fn default() -> Self {
        Self {
            cooldown: 2.0,
            attack_duration: 0.5,
            task: TaskCursor::default(),
            last_attack: None,
        }
    }
}

impl MeleeStrike {
    pub fn on_cooldown(&self, now: f32) -> bool {
        self.last_attack.is_some_and(|last| now < last + self.cooldown)
    }
}

impl Action for MeleeStrike {
    fn id(&self) -> &'static str {
        "melee"
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Offensive
    }

    fn execute(&mut self, ctx: &mut BehaviorContext) -> ActionStatus {
        if !self.task.is_running() {
            let Some(target) = ctx.target else {
                return ActionStatus::Skipped;
            };
            if self.on_cooldown(ctx.clock.elapsed) {
                return ActionStatus::Skipped;
            }

            ctx.navigator.stop();
            ctx.face_towards(target.position);
            ctx.animation.trigger(ANIM_ATTACK);
            ctx.attack.set_active(true);
            self.task.begin_after(Step::Swing, self.attack_duration);
            return ActionStatus::Running;
        }

        if self.task.waiting(ctx.clock.delta) {
            return ActionStatus::Running;
        }

        ctx.attack.set_active(false);
        self.last_attack = Some(ctx.clock.elapsed);
        self.task.finish();
        ActionStatus::Completed
    }

    fn stop(&mut self, ctx: &mut BehaviorContext) {
        if self.task.cancel() {
            ctx.attack.set_active(false);
        }
    }

    fn is_running(&self) -> bool {
        self.task.is_running()
    }
}
