//! Ironclad simulation core
//!
//! Autonomous combat vehicles on Bevy 0.16 ECS, headless by default.
//!
//! Each vehicle runs the same loop every tick:
//! perception → behavior (Roaming / Engaging) → path planning → drive
//! (path steering blended with sensor avoidance and stuck recovery) → wheels,
//! with combat (aim, fire cadence, reload) running while Engaging.
//!
//! Collaborators (navigation, spatial queries, ray casts, wheel actuation,
//! projectiles) are traits in `services`; `HeadlessArena` implements them for
//! engine-free runs and tests.

use std::marker::PhantomData;
use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod drive;
pub mod error;
pub mod layers;
pub mod logger;
pub mod math;
pub mod navigation;
pub mod perception;
pub mod physics;
pub mod sensors;
pub mod services;
pub mod spawn;

pub use ai::{BehaviorChanged, BehaviorConfig, BehaviorState, TransitionReason, Turret};
pub use combat::{
    CombatController, CombatPlugin, DamageDealt, Dead, EntityDied, ReloadCompleted, ReloadStarted, ShellFired,
    ShellHit, WeaponConfig,
};
pub use components::*;
pub use config::{AgentConfig, ArenaScenario};
pub use drive::{DriveController, DriveIntent, WheelSet};
pub use error::{ConfigError, ScenarioError};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use navigation::PathPlanner;
pub use perception::PerceptionModule;
pub use physics::{HeadlessArena, HeadlessPhysicsPlugin, Obstacle};
pub use sensors::SteeringSensorArray;
pub use services::{DrivetrainActuator, NavigationOracle, RayCaster, SpatialQuery, WeaponSink};
pub use spawn::{spawn_scenario, VehicleDisabled};

/// Logic tick order (Update).
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicSet {
    /// Backend snapshots
    Sync,
    Perceive,
    Decide,
    Plan,
    /// Aim, fire, reload
    Act,
    /// Shells, damage, deaths
    Resolve,
}

/// Physics tick order (FixedUpdate, 60 Hz).
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicsSet {
    Sync,
    /// Steering sensor casts
    Sense,
    /// Intent → wheel commands
    Drive,
    Integrate,
}

/// Chain both set orders. Safe to call from several plugins.
pub(crate) fn configure_sets(app: &mut App) {
    app.configure_sets(
        Update,
        (
            LogicSet::Sync,
            LogicSet::Perceive,
            LogicSet::Decide,
            LogicSet::Plan,
            LogicSet::Act,
            LogicSet::Resolve,
        )
            .chain(),
    )
    .configure_sets(
        FixedUpdate,
        (PhysicsSet::Sync, PhysicsSet::Sense, PhysicsSet::Drive, PhysicsSet::Integrate).chain(),
    );
}

/// Agent controller systems wired to backend `B`.
///
/// ```ignore
/// app.add_plugins(AgentControlPlugin::<MyEngineBackend>::default());
/// ```
pub struct AgentControlPlugin<B> {
    _backend: PhantomData<fn() -> B>,
}

impl<B> Default for AgentControlPlugin<B> {
    fn default() -> Self {
        Self { _backend: PhantomData }
    }
}

impl<B> Plugin for AgentControlPlugin<B>
where
    B: Resource + NavigationOracle + SpatialQuery + RayCaster,
{
    fn build(&self, app: &mut App) {
        configure_sets(app);

        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.add_event::<BehaviorChanged>()
            .add_event::<VehicleDisabled>()
            .add_event::<ShellFired>()
            .add_event::<ReloadStarted>()
            .add_event::<ReloadCompleted>()
            .register_type::<Vehicle>()
            .register_type::<VehicleControls>()
            .register_type::<VehicleTelemetry>()
            .register_type::<Health>()
            .register_type::<BehaviorState>()
            .register_type::<DriveController>()
            .register_type::<CombatController>();

        app.add_systems(PreUpdate, spawn::validate_new_vehicles)
            // Physics tick
            .add_systems(
                FixedUpdate,
                sensors::cast_steering_sensors::<B>.in_set(PhysicsSet::Sense),
            )
            .add_systems(
                FixedUpdate,
                (drive::follow_path, drive::player_intent, drive::apply_drive)
                    .chain()
                    .in_set(PhysicsSet::Drive),
            )
            // Logic tick
            .add_systems(Update, perception::scan_perimeter::<B>.in_set(LogicSet::Perceive))
            .add_systems(
                Update,
                (ai::update_behavior_state, ai::aim_turrets)
                    .chain()
                    .in_set(LogicSet::Decide),
            )
            .add_systems(Update, navigation::plan_paths::<B>.in_set(LogicSet::Plan))
            .add_systems(
                Update,
                (
                    combat::aim_player_turrets,
                    combat::tick_weapons,
                    combat::engage_targets,
                    combat::player_fire::<B>,
                )
                    .chain()
                    .in_set(LogicSet::Act),
            );
    }
}

/// Full headless simulation: agents + headless arena backend + combat.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(60.0)).add_plugins((
            AgentControlPlugin::<HeadlessArena>::default(),
            HeadlessPhysicsPlugin,
            CombatPlugin,
        ));
    }
}

/// Seeded RNG, the only randomness source of the simulation.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Headless app: MinimalPlugins, 60 Hz fixed tick, one fixed step per update.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)))
        .add_plugins(SimulationPlugin);

    app
}

/// Debug-formatted snapshot of every `T`, ordered by entity index.
pub fn world_snapshot<T>(world: &mut World) -> Vec<u8>
where
    T: Component + std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
