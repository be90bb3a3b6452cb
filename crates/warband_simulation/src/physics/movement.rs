//! Headless движение: навигация по прямой + интеграция динамических тел
//!
//! Заменяет pathfinding и rigid-body физику, когда их нет (тесты, бинарник):
//! - NavAgent включён и тело кинематическое → идём к destination со скоростью speed
//! - Тело динамическое и без RigidBody → velocity + импульсы + гравитация
//!
//! Детерминизм: только Time<Fixed>, никакого RNG.

use bevy::prelude::*;
use bevy_rapier3d::prelude::RigidBody;

use crate::ai::yaw_towards;
use crate::components::{BodyMotion, NavAgent};

/// Гравитация (м/с²), та же, что в расчёте прыжка
pub const GRAVITY: f32 = 9.81;

/// Затухание горизонтальной скорости на земле (1/с)
pub const GROUND_DRAG: f32 = 6.0;

/// Система: шаг навигации к destination (кинематические тела)
///
/// Для тел с RigidBody::KinematicPositionBased rapier подхватывает Transform сам.
pub fn advance_navigation(mut agents: Query<(&mut Transform, &NavAgent, &BodyMotion)>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for (mut transform, nav, body) in agents.iter_mut() {
        step_navigation(&mut transform, nav, body, delta);
    }
}

/// Один шаг по прямой к destination; ничего не делает, если навигация не владеет движением
///
/// Кинематическое тело стоит на полу: если физику отобрали в воздухе
/// (прыжок прерван), тело ставится на y = 0, как агент навмеша при включении.
pub fn step_navigation(transform: &mut Transform, nav: &NavAgent, body: &BodyMotion, delta: f32) {
    if !body.kinematic {
        return;
    }
    if transform.translation.y > 0.0 {
        transform.translation.y = 0.0;
    }
    if !nav.enabled {
        return;
    }
    let Some(destination) = nav.destination else {
        return;
    };

    let to = Vec3::new(
        destination.x - transform.translation.x,
        0.0,
        destination.z - transform.translation.z,
    );
    let distance = to.length();
    let remaining = distance - nav.stopping_distance;
    if distance < 1e-4 || remaining <= 0.0 {
        return;
    }

    let direction = to / distance;
    transform.translation += direction * (nav.speed * delta).min(remaining);
    if let Some(rotation) = yaw_towards(Vec3::ZERO, direction) {
        transform.rotation = rotation;
    }
}

/// Система: интеграция динамических тел без rapier
///
/// Импульс применяется к единичной массе. Пол — плоскость y = 0.
pub fn integrate_bodies(mut bodies: Query<(&mut Transform, &mut BodyMotion), Without<RigidBody>>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for (mut transform, mut body) in bodies.iter_mut() {
        if body.kinematic {
            // Кинематическое тело импульсы не принимает
            body.pending_impulse = Vec3::ZERO;
            body.velocity_dirty = false;
            continue;
        }

        let impulse = std::mem::take(&mut body.pending_impulse);
        body.velocity += impulse;
        body.velocity.y -= GRAVITY * delta;
        transform.translation += body.velocity * delta;

        if transform.translation.y <= 0.0 {
            transform.translation.y = 0.0;
            if body.velocity.y < 0.0 {
                body.velocity.y = 0.0;
            }
            if !body.velocity_dirty {
                let damping = (1.0 - GROUND_DRAG * delta).max(0.0);
                body.velocity.x *= damping;
                body.velocity.z *= damping;
            }
        }
        body.velocity_dirty = false;
    }
}
