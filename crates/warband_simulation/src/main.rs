//! Headless симуляция Warband
//!
//! Стычка без рендера: игрок, союзники, враги, босс и объект.
//! Использование: `warband_simulation [seed] [profiles.ron]`

use std::collections::BTreeMap;

use anyhow::Context;
use bevy::prelude::*;
use tracing::info;
use warband_simulation::*;

const TICKS: u32 = 3000;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(raw) => raw.parse::<u64>().with_context(|| format!("seed must be an integer, got '{raw}'"))?,
        None => SimulationConfig::default().seed,
    };
    let profiles = match args.next() {
        Some(path) => ProfileSet::load(&path).with_context(|| format!("loading profiles from {path}"))?,
        None => ProfileSet::default(),
    };

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);
    spawn_skirmish(app.world_mut(), &profiles)?;

    info!(seed, ticks = TICKS, "starting headless skirmish");

    for tick in 0..TICKS {
        app.update();

        if tick % 100 == 0 {
            log_summary(app.world_mut(), tick);
        }
    }

    log_summary(app.world_mut(), TICKS);
    info!("simulation complete");
    Ok(())
}

fn profile<'a>(profiles: &'a ProfileSet, name: &str) -> anyhow::Result<&'a AgentProfile> {
    profiles.get(name).with_context(|| format!("profile '{name}' is missing"))
}

/// Игрок и союзники слева, враги справа, босс у объекта
fn spawn_skirmish(world: &mut World, profiles: &ProfileSet) -> anyhow::Result<()> {
    world.spawn(player_bundle(Vec3::new(-20.0, 0.0, 0.0), 200));
    world.spawn(objective_bundle(Vec3::new(0.0, 0.0, 30.0)));

    let ally = profile(profiles, "ally")?;
    for z in [-4.0, 0.0, 4.0] {
        world.spawn(agent_bundle(ally, Vec3::new(-16.0, 0.0, z))?);
    }

    let enemy = profile(profiles, "enemy")?;
    for z in [-6.0, -2.0, 2.0, 6.0] {
        world.spawn(agent_bundle(enemy, Vec3::new(12.0, 0.0, z))?);
    }

    world.spawn(agent_bundle(profile(profiles, "boss")?, Vec3::new(20.0, 0.0, 40.0))?);
    Ok(())
}

fn log_summary(world: &mut World, tick: u32) {
    let mut states: BTreeMap<String, usize> = BTreeMap::new();
    let mut boss_phase = None;

    let mut agents = world.query::<(&Agent, &Brain, &Health)>();
    for (agent, brain, health) in agents.iter(world) {
        *states.entry(format!("{:?}", brain.state())).or_default() += 1;
        if agent.kind.is_boss() {
            boss_phase = Some((brain.machine.phase(), health.current));
        }
    }

    let entity_count = world.entities().len();
    info!(tick, entity_count, ?states, ?boss_phase, "skirmish summary");
}
