//! Синхронизация BodyMotion ↔ bevy_rapier3d
//!
//! Владелец движения определяет тип тела:
//! - kinematic → RigidBody::KinematicPositionBased (Transform двигает навигация)
//! - dynamic → RigidBody::Dynamic (скорость и импульсы применяет rapier)
//!
//! Скорость в rapier пишем только когда её задали явно (`velocity_dirty`),
//! иначе забираем обратно результат шага физики.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::components::BodyMotion;

/// Компоненты rapier для агента (капсула 1.8м)
pub fn rapier_body() -> impl Bundle {
    (
        RigidBody::KinematicPositionBased,
        Collider::capsule_y(0.5, 0.4),
        Velocity::default(),
        ExternalImpulse::default(),
    )
}

/// Система: скорость после шага физики → BodyMotion
pub fn pull_rapier_velocity(mut bodies: Query<(&mut BodyMotion, &Velocity), With<RigidBody>>) {
    for (mut body, velocity) in bodies.iter_mut() {
        if !body.kinematic && !body.velocity_dirty {
            body.velocity = velocity.linvel;
        }
    }
}

/// Система: BodyMotion → тип тела, скорость, импульсы rapier
pub fn push_motion_to_rapier(
    mut bodies: Query<(
        &mut BodyMotion,
        &mut RigidBody,
        Option<&mut Velocity>,
        Option<&mut ExternalImpulse>,
    )>,
) {
    for (mut body, mut rigid_body, velocity, external_impulse) in bodies.iter_mut() {
        let desired = if body.kinematic {
            RigidBody::KinematicPositionBased
        } else {
            RigidBody::Dynamic
        };
        if *rigid_body != desired {
            *rigid_body = desired;
        }

        if body.velocity_dirty {
            if let Some(mut velocity) = velocity {
                velocity.linvel = body.velocity;
            }
            body.velocity_dirty = false;
        }

        let pending = std::mem::take(&mut body.pending_impulse);
        if !body.kinematic && pending != Vec3::ZERO {
            if let Some(mut external_impulse) = external_impulse {
                external_impulse.impulse += pending;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::system::RunSystemOnce;

    use super::*;
    use crate::ai::PhysicsImpulse;

    #[test]
    fn test_dynamic_body_switches_rigid_body_and_forwards_impulse() {
        let mut world = World::new();
        let mut body = BodyMotion::default();
        body.set_kinematic(false);
        body.set_velocity(Vec3::ZERO);
        body.apply_impulse(Vec3::new(10.0, 10.0, 0.0));
        let entity = world
            .spawn((
                body,
                RigidBody::KinematicPositionBased,
                Velocity::linear(Vec3::X),
                ExternalImpulse::default(),
            ))
            .id();

        world.run_system_once(push_motion_to_rapier).unwrap();

        assert_eq!(*world.get::<RigidBody>(entity).unwrap(), RigidBody::Dynamic);
        assert_eq!(world.get::<Velocity>(entity).unwrap().linvel, Vec3::ZERO);
        assert_eq!(world.get::<ExternalImpulse>(entity).unwrap().impulse, Vec3::new(10.0, 10.0, 0.0));
        let body = world.get::<BodyMotion>(entity).unwrap();
        assert!(!body.velocity_dirty);
        assert_eq!(body.pending_impulse, Vec3::ZERO);
    }

    #[test]
    fn test_physics_velocity_pulled_back_when_not_overridden() {
        let mut world = World::new();
        let mut body = BodyMotion::default();
        body.set_kinematic(false);
        body.velocity_dirty = false;
        let entity = world
            .spawn((body, RigidBody::Dynamic, Velocity::linear(Vec3::new(1.0, 2.0, 3.0))))
            .id();

        world.run_system_once(pull_rapier_velocity).unwrap();

        assert_eq!(world.get::<BodyMotion>(entity).unwrap().velocity, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_kinematic_body_stays_position_based() {
        let mut world = World::new();
        let entity = world.spawn((BodyMotion::default(), RigidBody::Dynamic)).id();

        world.run_system_once(push_motion_to_rapier).unwrap();

        assert_eq!(*world.get::<RigidBody>(entity).unwrap(), RigidBody::KinematicPositionBased);
    }
}
