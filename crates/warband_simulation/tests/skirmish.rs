//! Skirmish integration test
//!
//! Игрок + 3 союзника против 4 врагов и босса у объекта, 2000 тиков headless.
//!
//! Проверяем:
//! - не больше одного действия в полёте у каждого агента
//! - Health инварианты
//! - фаза босса не падает
//! - выведенные из строя стоят на месте и ничего не делают
//! - нет паники/крашей

use std::collections::HashMap;

use bevy::prelude::*;
use warband_simulation::*;

fn create_skirmish_app(seed: u64) -> (App, Vec<Entity>) {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);

    let profiles = ProfileSet::default();
    let world = app.world_mut();
    world.spawn(player_bundle(Vec3::new(-20.0, 0.0, 0.0), 200));
    world.spawn(objective_bundle(Vec3::new(0.0, 0.0, 30.0)));

    let mut agents = Vec::new();
    for z in [-4.0, 0.0, 4.0] {
        let bundle = agent_bundle(profiles.get("ally").unwrap(), Vec3::new(-16.0, 0.0, z)).unwrap();
        agents.push(world.spawn(bundle).id());
    }
    for z in [-6.0, -2.0, 2.0, 6.0] {
        let bundle = agent_bundle(profiles.get("enemy").unwrap(), Vec3::new(12.0, 0.0, z)).unwrap();
        agents.push(world.spawn(bundle).id());
    }
    let boss = agent_bundle(profiles.get("boss").unwrap(), Vec3::new(20.0, 0.0, 40.0)).unwrap();
    agents.push(world.spawn(boss).id());

    (app, agents)
}

#[test]
fn test_skirmish_2000_ticks_keeps_invariants() {
    let (mut app, agents) = create_skirmish_app(42);
    let mut boss_phase = 1;
    let mut fallen_at: HashMap<Entity, Vec3> = HashMap::new();

    for tick in 0..2000 {
        app.update();
        let world = app.world();

        for &entity in &agents {
            // Босс мог быть убран после смерти
            let Some(brain) = world.get::<Brain>(entity) else {
                continue;
            };
            let health = world.get::<Health>(entity).unwrap();
            let position = world.get::<Transform>(entity).unwrap().translation;

            assert!(
                brain.machine.pool().running_count() <= 1,
                "tick {tick}: {entity:?} runs {} actions",
                brain.machine.pool().running_count()
            );
            assert!(health.current <= health.max, "tick {tick}: {entity:?} health over max");

            if brain.machine.kind().is_boss() {
                assert!(brain.machine.phase() >= boss_phase, "tick {tick}: boss phase went down");
                boss_phase = brain.machine.phase();
            }

            if brain.state() == BehaviorState::Incapacitated {
                assert_eq!(health.current, 0, "tick {tick}: {entity:?} incapacitated with health");
                assert_eq!(brain.machine.running_action(), None);
                assert!(!world.get::<MeleeHitbox>(entity).unwrap().active);
                let first = *fallen_at.entry(entity).or_insert(position);
                assert!(position.distance(first) < 1e-3, "tick {tick}: {entity:?} moved while down");
            }
        }
    }
}

#[test]
fn test_skirmish_agents_engage() {
    let (mut app, agents) = create_skirmish_app(7);
    let mut engaged: HashMap<Entity, bool> = HashMap::new();

    for _ in 0..900 {
        app.update();
        for &entity in &agents {
            if let Some(brain) = app.world().get::<Brain>(entity) {
                if brain.state() == BehaviorState::Engaging {
                    engaged.insert(entity, true);
                }
            }
        }
    }

    // Союзники и враги сошлись: хотя бы по одному с каждой стороны дошли до боя
    let allies_engaged = agents[..3].iter().any(|entity| engaged.contains_key(entity));
    let enemies_engaged = agents[3..7].iter().any(|entity| engaged.contains_key(entity));
    assert!(allies_engaged, "no ally reached attack range");
    assert!(enemies_engaged, "no enemy reached attack range");
}

#[test]
fn test_regroup_all_allies_mid_fight() {
    let (mut app, agents) = create_skirmish_app(42);
    for _ in 0..200 {
        app.update();
    }

    app.world_mut().send_event(RegroupCommand {
        scope: CommandScope::AllAllies,
        start: true,
    });
    app.update();

    for &ally in &agents[..3] {
        let brain = app.world().get::<Brain>(ally).unwrap();
        if brain.state() == BehaviorState::Incapacitated {
            assert!(!brain.machine.regroup_active());
            continue;
        }
        assert!(brain.machine.regroup_active() || brain.state() == BehaviorState::Chasing);
    }

    // Враги команду не получают
    for &enemy in &agents[3..] {
        if let Some(brain) = app.world().get::<Brain>(enemy) {
            assert!(!brain.machine.regroup_active());
        }
    }
}
