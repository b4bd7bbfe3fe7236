//! Headless Ironclad arena
//!
//! Runs a scenario (built-in skirmish or a JSON file) for a fixed number of
//! 60 Hz ticks and prints what happened.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use bevy::prelude::*;
use clap::Parser;

use ironclad_simulation::logger::{self, LogLevel};
use ironclad_simulation::{
    create_headless_app, spawn_scenario, ArenaScenario, BehaviorChanged, BehaviorState, Dead, EntityDied, Health,
    ShellFired,
};

#[derive(Parser, Debug)]
#[command(name = "ironclad_simulation", about = "Headless autonomous combat vehicle arena")]
struct Args {
    /// RNG seed (same seed, same run)
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of 60 Hz ticks to simulate
    #[arg(long, default_value_t = 3600)]
    ticks: u32,

    /// Scenario JSON; the built-in skirmish when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// debug | info | warning | error
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Running totals collected from events.
#[derive(Resource, Default)]
struct RunStats {
    shots: usize,
    transitions: usize,
    kills: usize,
}

fn count_events(
    mut stats: ResMut<RunStats>,
    mut shots: EventReader<ShellFired>,
    mut transitions: EventReader<BehaviorChanged>,
    mut deaths: EventReader<EntityDied>,
) {
    stats.shots += shots.read().count();
    stats.transitions += transitions.read().count();
    stats.kills += deaths.read().count();
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = LogLevel::parse(&args.log_level).ok_or_else(|| anyhow!("unknown log level '{}'", args.log_level))?;
    logger::set_log_level(level);

    let scenario = match &args.scenario {
        Some(path) => {
            ArenaScenario::load(path).with_context(|| format!("loading scenario {}", path.display()))?
        }
        None => ArenaScenario::skirmish(),
    };

    let mut app = create_headless_app(args.seed);
    app.init_resource::<RunStats>().add_systems(Last, count_events);
    let vehicles = spawn_scenario(app.world_mut(), &scenario);

    logger::log_info(&format!(
        "Ironclad: seed {}, {} vehicle(s), {} obstacle(s), {} ticks",
        args.seed,
        vehicles.len(),
        scenario.obstacles.len(),
        args.ticks
    ));

    for tick in 0..args.ticks {
        app.update();

        if tick % 600 == 0 {
            let engaging = app
                .world_mut()
                .query::<&BehaviorState>()
                .iter(app.world())
                .filter(|state| state.target().is_some())
                .count();
            logger::log_info(&format!("Tick {}: {} vehicle(s) engaging", tick, engaging));
        }
    }

    let stats = app.world().resource::<RunStats>();
    logger::log_info(&format!(
        "Done: {} shot(s), {} behavior change(s), {} kill(s)",
        stats.shots, stats.transitions, stats.kills
    ));

    for entity in vehicles {
        let world = app.world();
        let status = if world.get::<Dead>(entity).is_some() { "destroyed" } else { "alive" };
        let (health, percent) = world
            .get::<Health>(entity)
            .map_or((0.0, 0.0), |health| (health.current, health.percent() * 100.0));
        logger::log_info(&format!("  {:?}: {} ({:.0} hp, {:.0}%)", entity, status, health, percent));
    }

    Ok(())
}
