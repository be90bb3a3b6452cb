//! Боевые компоненты

use bevy::prelude::*;

use crate::ai::AttackCollider;

/// Хитбокс ближнего боя (сфера перед агентом)
///
/// Активен только во время замаха; каждую цель бьёт один раз за активацию.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct MeleeHitbox {
    pub active: bool,
    /// Радиус сферы хитбокса
    pub radius: f32,
    /// Смещение центра вперёд от агента
    pub reach: f32,
    pub damage: u32,
    /// Кого уже задели за текущую активацию
    pub struck: Vec<Entity>,
}

impl Default for MeleeHitbox {
    fn default() -> Self {
        Self {
            active: false,
            radius: 1.0,
            reach: 1.2,
            damage: 10,
            struck: Vec::new(),
        }
    }
}

impl MeleeHitbox {
    /// Центр хитбокса в мировых координатах
    pub fn center(&self, transform: &Transform) -> Vec3 {
        transform.translation + transform.forward() * self.reach
    }
}

impl AttackCollider for MeleeHitbox {
    fn set_active(&mut self, active: bool) {
        if active && !self.active {
            self.struck.clear();
        }
        self.active = active;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
