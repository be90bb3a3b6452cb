//! Tests for BehaviorMachine (автомат + прерывания + подъём) на стенде без ECS.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use crate::actions::{Follow, Leap, MeleeStrike, MissileBarrage, OrbitFire, Pursue};
    use crate::ai::test_rig::TestRig;
    use crate::ai::{
        knockback_impulse, ActionPool, AgentKind, BehaviorMachine, BehaviorState, BehaviorTuning, InterruptOutcome,
        MotionAuthority, PhaseThreshold, TargetingProfile,
    };
    use crate::components::{Faction, ANIM_KNOCKOUT, ANIM_REVIVE, ANIM_RUN};

    fn ally_machine() -> BehaviorMachine {
        let tuning = BehaviorTuning::default();
        let pool = ActionPool::new()
            .with(Pursue::new(tuning.attack_range))
            .with(MeleeStrike::default())
            .with_regroup(Follow::new(tuning.stop_follow_range));
        BehaviorMachine::new(AgentKind::Ally, tuning, TargetingProfile::new(Faction::Hostile), pool)
    }

    fn boss_machine() -> BehaviorMachine {
        let mut pool = ActionPool::new();
        pool.push(Box::new(Leap::default()), 1.0, 1);
        pool.push(Box::new(OrbitFire::default()), 1.0, 2);
        pool.push(Box::new(MissileBarrage::default()), 1.0, 3);
        let targeting =
            TargetingProfile::new(Faction::Objective).with_fallback(50.0, vec![Faction::Player, Faction::Ally]);
        BehaviorMachine::new(AgentKind::Boss, BehaviorTuning::boss(), targeting, pool).with_phases(vec![
            PhaseThreshold {
                health_ratio: 0.7,
                phase: 2,
                speed_multiplier: 1.0,
            },
            PhaseThreshold {
                health_ratio: 0.3,
                phase: 3,
                speed_multiplier: 6.0 / 3.5,
            },
        ])
    }

    /// Союзник в начале координат, враг на расстоянии `distance` по X
    fn ally_vs_enemy(distance: f32) -> (TestRig, Entity) {
        let mut rig = TestRig::new(Faction::Ally);
        let enemy = rig.put(1, Faction::Hostile, Vec3::new(distance, 0.0, 0.0), Some(50.0));
        (rig, enemy)
    }

    // ========================================================================
    // Scenario A: дистанция → Chasing / Engaging
    // ========================================================================

    #[test]
    fn test_evaluate_by_attack_range() {
        let mut machine = ally_machine();
        let (mut rig, enemy) = ally_vs_enemy(10.0);

        assert_eq!(machine.evaluate(&mut rig.ctx()), BehaviorState::Chasing);
        assert_eq!(machine.target(), Some(enemy));

        rig.move_entity(enemy, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(machine.evaluate(&mut rig.ctx()), BehaviorState::Engaging);
    }

    #[test]
    fn test_evaluate_without_target_is_idle() {
        let mut machine = ally_machine();
        let mut rig = TestRig::new(Faction::Ally);
        assert_eq!(machine.evaluate(&mut rig.ctx()), BehaviorState::Idle);
    }

    #[test]
    fn test_first_tick_starts_pursuit() {
        let mut machine = ally_machine();
        let (mut rig, enemy) = ally_vs_enemy(10.0);

        rig.tick(&mut machine);

        assert_eq!(machine.state(), BehaviorState::Chasing);
        assert_eq!(machine.running_action(), Some("pursue"));
        assert_eq!(rig.nav.destination, Some(Vec3::new(10.0, 0.0, 0.0)));
        assert!(rig.cues.flag(ANIM_RUN));
        assert_eq!(machine.target(), Some(enemy));
    }

    #[test]
    fn test_chase_closes_distance_then_engages() {
        let mut machine = ally_machine();
        let (mut rig, _) = ally_vs_enemy(10.0);

        let ticks = rig.run_until(&mut machine, 180, |machine, _| machine.state() == BehaviorState::Engaging);

        assert!(ticks.is_some(), "never engaged: {machine:?}");
        assert!(rig.transform.translation.distance(Vec3::new(10.0, 0.0, 0.0)) <= 7.0 + 1e-3);
        assert!(!rig.cues.flag(ANIM_RUN));
        assert_eq!(rig.nav.destination, None);
    }

    #[test]
    fn test_melee_window_opens_and_closes() {
        let mut machine = ally_machine();
        let (mut rig, _) = ally_vs_enemy(5.0);

        let opened = rig.run_until(&mut machine, 60, |machine, _| machine.running_action() == Some("melee"));
        assert!(opened.is_some());
        assert!(rig.hitbox.active);

        let closed = rig.run_until(&mut machine, 60, |machine, _| machine.running_action().is_none());
        assert!(closed.is_some());
        assert!(!rig.hitbox.active);
        assert_eq!(machine.pool().running_count(), 0);
    }

    // ========================================================================
    // Scenario B: урон во время боя → Stunned → пересчёт
    // ========================================================================

    fn engaged_ally() -> (BehaviorMachine, TestRig, Entity) {
        let mut machine = ally_machine();
        let (mut rig, enemy) = ally_vs_enemy(5.0);
        rig.run_until(&mut machine, 60, |machine, _| machine.running_action() == Some("melee"));
        assert_eq!(machine.state(), BehaviorState::Engaging);
        (machine, rig, enemy)
    }

    #[test]
    fn test_damage_stuns_and_knocks_back() {
        let (mut machine, mut rig, enemy) = engaged_ally();
        let impact = Vec3::new(5.0, 0.0, 0.0);

        let outcome = machine.on_damage(&mut rig.ctx(), impact, Some(enemy));

        assert_eq!(outcome, InterruptOutcome::Stunned);
        assert_eq!(machine.state(), BehaviorState::Stunned);
        assert_eq!(machine.running_action(), None);
        assert_eq!(machine.pool().running_count(), 0);
        assert!(!rig.hitbox.active);
        assert_eq!(rig.ctx().authority(), MotionAuthority::Physics);

        let expected = knockback_impulse(Vec3::ZERO, impact, 10.0);
        assert!((rig.body.pending_impulse - expected).length() < 1e-5);
        // От точки удара, а не к ней
        assert!(rig.body.pending_impulse.x < 0.0);
        assert!(rig.body.pending_impulse.y > 0.0);
    }

    #[test]
    fn test_stun_resolves_after_knockback_duration() {
        let (mut machine, mut rig, enemy) = engaged_ally();
        machine.on_damage(&mut rig.ctx(), Vec3::new(5.0, 0.0, 0.0), Some(enemy));

        // 0.5 сек при 60Hz: 29 тиков оглушения, на 30-м пересчёт
        rig.run(&mut machine, 29);
        assert_eq!(machine.state(), BehaviorState::Stunned);

        rig.tick(&mut machine);
        assert_eq!(machine.state(), BehaviorState::Engaging);
        assert_eq!(rig.ctx().authority(), MotionAuthority::Navigation);
    }

    #[test]
    fn test_second_hit_while_stunned_is_dropped() {
        let (mut machine, mut rig, enemy) = engaged_ally();
        machine.on_damage(&mut rig.ctx(), Vec3::new(5.0, 0.0, 0.0), Some(enemy));
        rig.run(&mut machine, 20);

        let impulse_before = rig.body.pending_impulse;
        let outcome = machine.on_damage(&mut rig.ctx(), Vec3::new(-5.0, 0.0, 0.0), Some(enemy));
        assert_eq!(outcome, InterruptOutcome::Ignored);
        assert_eq!(rig.body.pending_impulse, impulse_before);

        // Таймер не продлён: пересчёт по исходному расписанию
        rig.run(&mut machine, 10);
        assert_eq!(machine.state(), BehaviorState::Engaging);
    }

    #[test]
    fn test_damage_redirects_to_new_attacker() {
        let (mut machine, mut rig, enemy) = engaged_ally();
        let flanker = rig.put(2, Faction::Hostile, Vec3::new(0.0, 0.0, 8.0), Some(50.0));

        machine.on_damage(&mut rig.ctx(), Vec3::new(0.0, 0.0, 8.0), Some(flanker));

        assert_ne!(machine.target(), Some(enemy));
        assert_eq!(machine.target(), Some(flanker));
    }

    #[test]
    fn test_damage_from_friendly_keeps_target() {
        let (mut machine, mut rig, enemy) = engaged_ally();
        let friend = rig.put(3, Faction::Ally, Vec3::new(1.0, 0.0, 0.0), Some(50.0));

        machine.on_damage(&mut rig.ctx(), Vec3::new(1.0, 0.0, 0.0), Some(friend));

        assert_eq!(machine.target(), Some(enemy));
        assert_eq!(machine.state(), BehaviorState::Stunned);
    }

    // ========================================================================
    // Scenario D: смерть → Incapacitated → подъём
    // ========================================================================

    #[test]
    fn test_death_halts_everything() {
        let (mut machine, mut rig, _) = engaged_ally();
        rig.set_health(0);

        let outcome = machine.on_death(&mut rig.ctx());

        assert_eq!(outcome, InterruptOutcome::Incapacitated);
        assert!(machine.is_incapacitated());
        assert!(!machine.is_retired());
        assert_eq!(machine.running_action(), None);
        assert_eq!(machine.target(), None);
        assert!(!rig.hitbox.active);
        assert_eq!(rig.ctx().authority(), MotionAuthority::Held);
        assert!(rig.cues.pending_triggers().contains(&ANIM_KNOCKOUT));

        // Выведенный из строя не тикает и не реагирует на урон
        rig.run(&mut machine, 120);
        assert!(machine.is_incapacitated());
        assert_eq!(rig.nav.destination, None);
        let again = machine.on_damage(&mut rig.ctx(), Vec3::X, None);
        assert_eq!(again, InterruptOutcome::Ignored);
        assert_eq!(machine.on_death(&mut rig.ctx()), InterruptOutcome::Ignored);
    }

    #[test]
    fn test_revive_restores_and_resumes_search() {
        let (mut machine, mut rig, enemy) = engaged_ally();
        rig.set_health(0);
        machine.on_death(&mut rig.ctx());
        rig.run(&mut machine, 10);

        let revived = {
            let (health, mut ctx) = rig.split();
            machine.revive(health, &mut ctx)
        };

        assert!(revived);
        assert_eq!(machine.state(), BehaviorState::Idle);
        assert_eq!(rig.health.current, rig.health.max);
        assert_eq!(rig.ctx().authority(), MotionAuthority::Navigation);
        assert!(rig.cues.pending_triggers().contains(&ANIM_REVIVE));

        rig.tick(&mut machine);
        assert_eq!(machine.target(), Some(enemy));
        assert_ne!(machine.state(), BehaviorState::Idle);
    }

    #[test]
    fn test_revive_ignored_when_not_incapacitated() {
        let (mut machine, mut rig, _) = engaged_ally();
        rig.set_health(40);

        let (health, mut ctx) = rig.split();
        assert!(!machine.revive(health, &mut ctx));
        assert_eq!(health.current, 40);
    }

    // ========================================================================
    // Scenario E: цель пропала посреди погони
    // ========================================================================

    #[test]
    fn test_despawned_target_falls_back_within_one_tick() {
        let mut machine = ally_machine();
        let (mut rig, enemy) = ally_vs_enemy(20.0);
        rig.run(&mut machine, 5);
        assert_eq!(machine.running_action(), Some("pursue"));

        rig.registry.remove(enemy);
        rig.tick(&mut machine);

        assert_eq!(machine.target(), None);
        assert_eq!(machine.state(), BehaviorState::Idle);
        assert_eq!(machine.running_action(), None);
        assert_eq!(rig.nav.destination, None);
        assert!(!rig.cues.flag(ANIM_RUN));
        assert_eq!(rig.ctx().authority(), MotionAuthority::Navigation);
    }

    #[test]
    fn test_dead_target_replaced_by_next_nearest() {
        let mut machine = ally_machine();
        let (mut rig, first) = ally_vs_enemy(20.0);
        let second = rig.put(2, Faction::Hostile, Vec3::new(0.0, 0.0, 25.0), Some(50.0));
        rig.run(&mut machine, 5);
        assert_eq!(machine.target(), Some(first));

        rig.kill(first);
        rig.tick(&mut machine);

        assert_eq!(machine.target(), Some(second));
        assert_eq!(machine.state(), BehaviorState::Chasing);
    }

    #[test]
    fn test_equidistant_targets_pick_lowest_index() {
        let mut machine = ally_machine();
        let mut rig = TestRig::new(Faction::Ally);
        rig.put(7, Faction::Hostile, Vec3::new(0.0, 0.0, 12.0), Some(10.0));
        let low = rig.put(4, Faction::Hostile, Vec3::new(12.0, 0.0, 0.0), Some(10.0));

        machine.evaluate(&mut rig.ctx());
        assert_eq!(machine.target(), Some(low));
    }

    // ========================================================================
    // Перегруппировка
    // ========================================================================

    #[test]
    fn test_far_from_player_regroups_then_idles() {
        let mut machine = ally_machine();
        let mut rig = TestRig::new(Faction::Ally);
        let player_at = Vec3::new(30.0, 0.0, 0.0);
        rig.put(5, Faction::Player, player_at, Some(100.0));

        rig.tick(&mut machine);
        assert_eq!(machine.state(), BehaviorState::Regrouping);
        assert_eq!(machine.running_action(), Some("follow"));

        let ticks = rig.run_until(&mut machine, 900, |machine, _| machine.state() == BehaviorState::Idle);
        assert!(ticks.is_some(), "never arrived: {machine:?}");
        assert!(rig.transform.translation.distance(player_at) <= 3.0);
    }

    #[test]
    fn test_near_player_stays_idle() {
        let mut machine = ally_machine();
        let mut rig = TestRig::new(Faction::Ally);
        rig.put(5, Faction::Player, Vec3::new(4.0, 0.0, 0.0), Some(100.0));

        rig.run(&mut machine, 30);
        assert_eq!(machine.state(), BehaviorState::Idle);
        assert_eq!(machine.running_action(), None);
    }

    #[test]
    fn test_regroup_command_abandons_fight() {
        let (mut machine, mut rig, _) = engaged_ally();
        rig.put(5, Faction::Player, Vec3::new(-20.0, 0.0, 0.0), Some(100.0));

        assert!(machine.command_regroup(&mut rig.ctx()));
        assert!(machine.regroup_active());
        assert_eq!(machine.state(), BehaviorState::Regrouping);
        assert_eq!(machine.target(), None);
        assert!(!rig.hitbox.active);

        rig.tick(&mut machine);
        assert_eq!(machine.running_action(), Some("follow"));

        machine.release_regroup();
        assert!(!machine.regroup_active());
    }

    #[test]
    fn test_regroup_command_ignored_when_incapacitated() {
        let (mut machine, mut rig, _) = engaged_ally();
        machine.on_death(&mut rig.ctx());
        assert!(!machine.command_regroup(&mut rig.ctx()));
        assert!(!machine.regroup_active());
    }

    // ========================================================================
    // Босс
    // ========================================================================

    fn boss_rig() -> (TestRig, Entity) {
        let mut rig = TestRig::new(Faction::Hostile);
        let cargo = rig.put(1, Faction::Objective, Vec3::new(0.0, 0.0, -30.0), None);
        (rig, cargo)
    }

    #[test]
    fn test_boss_starts_chasing_objective() {
        let mut machine = boss_machine();
        let (mut rig, cargo) = boss_rig();
        assert_eq!(machine.state(), BehaviorState::Chasing);

        rig.tick(&mut machine);

        assert_eq!(machine.target(), Some(cargo));
        assert_eq!(machine.state(), BehaviorState::Chasing);
        assert_eq!(rig.nav.destination, Some(Vec3::new(0.0, 0.0, -30.0)));
    }

    #[test]
    fn test_boss_engages_in_range() {
        let mut machine = boss_machine();
        let (mut rig, _) = boss_rig();
        rig.move_entity(Entity::from_raw(1), Vec3::new(0.0, 0.0, -8.0));

        rig.run(&mut machine, 2);

        assert_eq!(machine.state(), BehaviorState::Engaging);
        // В фазе 1 открыт только прыжок
        assert_eq!(machine.running_action(), Some("leap"));
    }

    #[test]
    fn test_boss_phase_escalation() {
        let mut machine = boss_machine();
        let (mut rig, _) = boss_rig();
        rig.tick(&mut machine);
        assert_eq!(machine.phase(), 1);

        rig.set_health(65);
        rig.tick(&mut machine);
        assert_eq!(machine.phase(), 2);
        assert!((rig.nav.speed - 3.5).abs() < 1e-5);

        // Лечение фазу не откатывает
        rig.set_health(80);
        rig.run(&mut machine, 3);
        assert_eq!(machine.phase(), 2);

        rig.set_health(25);
        rig.tick(&mut machine);
        assert_eq!(machine.phase(), 3);
        assert!((rig.nav.speed - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_boss_not_stunned_but_retargets() {
        let mut machine = boss_machine();
        let (mut rig, cargo) = boss_rig();
        let ally = rig.put(2, Faction::Ally, Vec3::new(5.0, 0.0, 0.0), Some(50.0));
        rig.tick(&mut machine);
        assert_eq!(machine.target(), Some(cargo));

        let outcome = machine.on_damage(&mut rig.ctx(), Vec3::new(5.0, 0.0, 0.0), Some(ally));

        assert_eq!(outcome, InterruptOutcome::Retargeted);
        assert_eq!(machine.target(), Some(ally));
        assert_ne!(machine.state(), BehaviorState::Stunned);
        assert_eq!(rig.body.pending_impulse, Vec3::ZERO);
    }

    #[test]
    fn test_boss_fallback_when_objective_gone() {
        let mut machine = boss_machine();
        let (mut rig, cargo) = boss_rig();
        let player = rig.put(3, Faction::Player, Vec3::new(20.0, 0.0, 0.0), Some(100.0));
        rig.registry.remove(cargo);

        rig.tick(&mut machine);
        assert_eq!(machine.target(), Some(player));
    }

    #[test]
    fn test_boss_death_is_final() {
        let mut machine = boss_machine();
        let (mut rig, _) = boss_rig();
        rig.tick(&mut machine);
        rig.set_health(0);

        machine.on_death(&mut rig.ctx());
        assert!(machine.is_retired());

        let (health, mut ctx) = rig.split();
        assert!(!machine.revive(health, &mut ctx));
        assert_eq!(health.current, 0);
    }
}
