//! Анимационные сигналы (флаги + одноразовые триггеры)
//!
//! Симуляция только выставляет сигналы; клиент забирает триггеры через `drain_triggers`.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::ai::AnimationSignal;

pub const ANIM_RUN: &str = "Run";
pub const ANIM_JUMP: &str = "Jump";
pub const ANIM_ATTACK: &str = "CrossRangeAttack";
pub const ANIM_KNOCKOUT: &str = "Knockout";
pub const ANIM_REVIVE: &str = "Revive";

#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct AnimationCues {
    flags: BTreeMap<&'static str, bool>,
    triggers: Vec<&'static str>,
}

impl AnimationCues {
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Триггеры, выставленные с последнего drain
    pub fn pending_triggers(&self) -> &[&'static str] {
        &self.triggers
    }

    pub fn drain_triggers(&mut self) -> Vec<&'static str> {
        std::mem::take(&mut self.triggers)
    }
}

impl AnimationSignal for AnimationCues {
    fn set_flag(&mut self, name: &'static str, value: bool) {
        self.flags.insert(name, value);
    }

    fn trigger(&mut self, name: &'static str) {
        self.triggers.push(name);
    }
}
