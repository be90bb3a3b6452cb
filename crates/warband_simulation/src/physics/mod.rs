//! Physics module: исполнение движения агентов
//!
//! Ядро поведения только переключает владельца движения (NavAgent / BodyMotion).
//! Здесь это превращается в перемещение:
//! - movement: headless навигация по прямой + интеграция динамических тел
//! - rapier_sync: тип тела, скорость и импульсы для bevy_rapier3d

use bevy::prelude::*;

use crate::SimulationSet;

pub mod movement;
pub mod rapier_sync;

pub use movement::{advance_navigation, integrate_bodies, step_navigation, GRAVITY, GROUND_DRAG};
pub use rapier_sync::{pull_rapier_velocity, push_motion_to_rapier, rapier_body};

/// Motion Plugin
///
/// Intake: скорость из rapier → BodyMotion.
/// Motion (после решений): BodyMotion → rapier, затем headless навигация и интеграция.
pub struct MotionPlugin;

impl Plugin for MotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, pull_rapier_velocity.in_set(SimulationSet::Intake));
        app.add_systems(
            FixedUpdate,
            (push_motion_to_rapier, advance_navigation, integrate_bodies)
                .chain()
                .in_set(SimulationSet::Motion),
        );
    }
}
