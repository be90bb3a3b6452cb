//! Movement компоненты: навигационный агент и физическое тело
//!
//! Два источника движения, и в каждый момент правит ровно один:
//! - NavAgent (enabled) + BodyMotion (kinematic) → навигация
//! - NavAgent (disabled) + BodyMotion (dynamic) → физика (импульсы, прыжки)
//!
//! Переключение делает `BehaviorContext::claim_navigation` / `claim_physics`.

use bevy::prelude::*;

use crate::ai::{Navigator, PhysicsImpulse};

/// Навигационный агент (pathfinding заменён прямой линией в headless режиме)
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct NavAgent {
    pub enabled: bool,
    /// Текущая цель пути (None = стоим)
    pub destination: Option<Vec3>,
    /// Скорость (м/с)
    pub speed: f32,
    /// На каком расстоянии от цели считаем, что пришли
    pub stopping_distance: f32,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self::with_speed(3.5)
    }
}

impl NavAgent {
    pub fn with_speed(speed: f32) -> Self {
        Self {
            enabled: true,
            destination: None,
            speed,
            stopping_distance: 0.0,
        }
    }

    /// Достигнута ли цель (или цели нет)
    pub fn has_arrived(&self, position: Vec3) -> bool {
        match self.destination {
            Some(destination) => position.distance(destination) <= self.stopping_distance.max(0.05),
            None => true,
        }
    }
}

impl Navigator for NavAgent {
    fn set_destination(&mut self, point: Vec3) {
        // Выключенный агент путь не строит
        if self.enabled {
            self.destination = Some(point);
        }
    }

    fn stop(&mut self) {
        self.destination = None;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.destination = None;
        }
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    fn set_stopping_distance(&mut self, distance: f32) {
        self.stopping_distance = distance.max(0.0);
    }

    fn destination(&self) -> Option<Vec3> {
        self.destination
    }
}

/// Физическое тело агента
///
/// `kinematic == true` — тело двигает навигация, импульсы игнорируются.
/// `kinematic == false` — тело динамическое: скорость и импульсы применяет физика
/// (rapier, если есть RigidBody, иначе headless интегратор).
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct BodyMotion {
    pub kinematic: bool,
    pub velocity: Vec3,
    /// Импульсы, накопленные за тик (обнуляются физикой)
    pub pending_impulse: Vec3,
    /// Скорость задана явно в этом тике (перезаписывает физическую)
    pub velocity_dirty: bool,
}

impl Default for BodyMotion {
    fn default() -> Self {
        Self {
            kinematic: true,
            velocity: Vec3::ZERO,
            pending_impulse: Vec3::ZERO,
            velocity_dirty: false,
        }
    }
}

impl PhysicsImpulse for BodyMotion {
    fn apply_impulse(&mut self, impulse: Vec3) {
        self.pending_impulse += impulse;
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
        self.velocity_dirty = true;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_kinematic(&mut self, kinematic: bool) {
        self.kinematic = kinematic;
    }

    fn is_kinematic(&self) -> bool {
        self.kinematic
    }
}
