//! Determinism tests
//!
//! Same seed → identical runs, down to every transform and behavior state.

use bevy::prelude::*;
use ironclad_simulation::components::VehicleTelemetry;
use ironclad_simulation::config::{ArenaConfig, VehicleSpec};
use ironclad_simulation::*;

fn run_simulation(seed: u64, scenario: &ArenaScenario, tick_count: usize) -> Vec<u8> {
    let mut app = create_headless_app(seed);
    spawn_scenario(app.world_mut(), scenario);

    for _ in 0..tick_count {
        app.update();
    }

    let world = app.world_mut();
    let mut snapshot = world_snapshot::<Transform>(world);
    snapshot.extend(world_snapshot::<BehaviorState>(world));
    snapshot.extend(world_snapshot::<VehicleTelemetry>(world));
    snapshot.extend(world_snapshot::<CombatController>(world));
    snapshot
}

fn lone_roamer() -> ArenaScenario {
    let mut scenario = ArenaScenario {
        arena: ArenaConfig {
            half_extent: 100.0,
            cell_size: 2.0,
        },
        ..Default::default()
    };
    scenario.agent.path.roam_half_extent = 80.0;
    scenario.vehicles.push(VehicleSpec {
        faction_id: 1,
        position: [0.0, 0.0, 0.0],
        yaw_degrees: 0.0,
        control: ControlSource::Ai,
        config: None,
    });
    scenario
}

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;
    const TICK_COUNT: usize = 600;

    let scenario = ArenaScenario::skirmish();
    let snapshot1 = run_simulation(SEED, &scenario, TICK_COUNT);
    let snapshot2 = run_simulation(SEED, &scenario, TICK_COUNT);

    assert_eq!(snapshot1, snapshot2, "two runs with seed {} diverged", SEED);
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;
    const TICK_COUNT: usize = 300;

    let scenario = ArenaScenario::skirmish();
    let snapshots: Vec<_> = (0..3).map(|_| run_simulation(SEED, &scenario, TICK_COUNT)).collect();

    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(snapshots[0], *snapshot, "run {} differs from run 0", i);
    }
}

#[test]
fn test_seed_changes_roaming() {
    let scenario = lone_roamer();
    let a = run_simulation(1, &scenario, 300);
    let b = run_simulation(2, &scenario, 300);

    // Different roam destinations, different tracks
    assert_ne!(a, b);
}
