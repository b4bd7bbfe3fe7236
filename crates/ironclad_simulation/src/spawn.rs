//! Spawn helpers and add-time validation.
//!
//! `ai_vehicle_bundle` / `player_vehicle_bundle` assemble a full vehicle from
//! an `AgentConfig`. Whatever way a vehicle enters the world,
//! `validate_new_vehicles` checks it once; a broken one gets `Disabled` and
//! every controller system skips it.

use bevy::prelude::*;

use crate::ai::{BehaviorConfig, BehaviorState, Turret};
use crate::combat::CombatController;
use crate::components::{ControlSource, Disabled, Health, PlayerCommand, Vehicle};
use crate::config::{AgentConfig, ArenaScenario};
use crate::drive::{DriveController, DriveIntent, WheelSet};
use crate::error::{ensure_positive, ConfigError};
use crate::math::yaw_towards;
use crate::navigation::PathPlanner;
use crate::perception::PerceptionModule;
use crate::physics::{obstacle_body, vehicle_body, HeadlessArena, Obstacle};
use crate::sensors::SteeringSensorArray;

/// Hull box half extents (width, height, length).
pub const HULL_HALF_EXTENTS: Vec3 = Vec3::new(1.5, 1.0, 3.0);

/// Height of spawned obstacle colliders.
pub const OBSTACLE_HEIGHT: f32 = 4.0;

/// Event: машина не прошла валидацию и отключена.
#[derive(Event, Debug, Clone)]
pub struct VehicleDisabled {
    pub entity: Entity,
    pub error: ConfigError,
}

fn turret_for(transform: &Transform) -> Turret {
    Turret {
        yaw: yaw_towards(transform.forward().as_vec3()),
        ..Default::default()
    }
}

pub fn ai_vehicle_bundle(config: &AgentConfig, faction_id: u64, transform: Transform) -> impl Bundle {
    (
        (
            Vehicle { faction_id },
            ControlSource::Ai,
            transform,
            config.hull.health(),
        ),
        (
            BehaviorState::default(),
            config.behavior.clone(),
            PerceptionModule::new(config.perception.clone()),
            PathPlanner::new(config.path.clone()),
            SteeringSensorArray::from_config(&config.sensors, HULL_HALF_EXTENTS),
        ),
        (
            DriveController::new(config.drive.clone()),
            DriveIntent::default(),
            WheelSet::four_wheel(HULL_HALF_EXTENTS),
        ),
        (CombatController::new(config.weapon.clone()), turret_for(&transform)),
        vehicle_body(HULL_HALF_EXTENTS),
    )
}

/// Player vehicle: manual drive (no avoidance, no auto-reverse), hull-locked turret.
pub fn player_vehicle_bundle(config: &AgentConfig, faction_id: u64, transform: Transform) -> impl Bundle {
    (
        (
            Vehicle { faction_id },
            ControlSource::Player,
            PlayerCommand::default(),
            transform,
            config.hull.health(),
        ),
        (
            DriveController::new(config.drive.clone()).without_recovery(),
            DriveIntent::default(),
            WheelSet::four_wheel(HULL_HALF_EXTENTS),
        ),
        (CombatController::new(config.weapon.clone()), turret_for(&transform)),
        vehicle_body(HULL_HALF_EXTENTS),
    )
}

pub fn obstacle_bundle(position: Vec3, radius: f32) -> impl Bundle {
    (
        Obstacle { radius },
        Transform::from_translation(position),
        obstacle_body(radius, OBSTACLE_HEIGHT),
    )
}

/// Build the arena and spawn everything a scenario lists.
///
/// Returns the vehicle entities in scenario order.
pub fn spawn_scenario(world: &mut World, scenario: &ArenaScenario) -> Vec<Entity> {
    world.insert_resource(HeadlessArena::new(scenario.arena.half_extent, scenario.arena.cell_size));

    for obstacle in &scenario.obstacles {
        world.spawn(obstacle_bundle(Vec3::from_array(obstacle.position), obstacle.radius));
    }

    scenario
        .vehicles
        .iter()
        .map(|vehicle| {
            let config = scenario.config_for(vehicle);
            let transform = vehicle.transform();
            match vehicle.control {
                ControlSource::Ai => world.spawn(ai_vehicle_bundle(config, vehicle.faction_id, transform)).id(),
                ControlSource::Player => world
                    .spawn(player_vehicle_bundle(config, vehicle.faction_id, transform))
                    .id(),
            }
        })
        .collect()
}

/// Borrowed view of the parts a vehicle is checked for.
#[derive(Default, Clone, Copy)]
pub struct VehicleParts<'a> {
    pub health: Option<&'a Health>,
    pub wheels: Option<&'a WheelSet>,
    pub drive: Option<&'a DriveController>,
    pub weapon: Option<&'a CombatController>,
    pub sensors: Option<&'a SteeringSensorArray>,
    pub perception: Option<&'a PerceptionModule>,
    pub planner: Option<&'a PathPlanner>,
    pub behavior: Option<&'a BehaviorConfig>,
    pub state: Option<&'a BehaviorState>,
}

/// Проверка одной машины. Возвращается первая найденная проблема.
pub fn validate_vehicle(source: ControlSource, parts: VehicleParts) -> Result<(), ConfigError> {
    if let Some(health) = parts.health {
        ensure_positive("hull.max_health", health.max)?;
    }

    let wheels = parts.wheels.filter(|wheels| !wheels.wheels.is_empty()).ok_or(ConfigError::NoWheels)?;
    if !wheels.has_steering_wheel() {
        return Err(ConfigError::NoSteeringWheel);
    }

    parts
        .drive
        .ok_or(ConfigError::MissingComponent("DriveController"))?
        .config
        .validate()?;
    parts
        .weapon
        .ok_or(ConfigError::MissingComponent("CombatController"))?
        .config
        .validate()?;

    if source == ControlSource::Player {
        return Ok(());
    }

    let sensors = parts.sensors.ok_or(ConfigError::MissingSensorArray)?;
    if sensors.sensors.is_empty() {
        return Err(ConfigError::MissingSensorArray);
    }
    parts
        .perception
        .ok_or(ConfigError::MissingComponent("PerceptionModule"))?
        .config
        .validate()?;
    parts
        .planner
        .ok_or(ConfigError::MissingComponent("PathPlanner"))?
        .config
        .validate()?;
    parts.behavior.ok_or(ConfigError::MissingComponent("BehaviorConfig"))?.validate()?;
    parts.state.ok_or(ConfigError::MissingComponent("BehaviorState"))?;

    Ok(())
}

/// Система: валидация машин в tick появления (PreUpdate).
pub fn validate_new_vehicles(
    mut commands: Commands,
    vehicles: Query<
        (
            Entity,
            &ControlSource,
            &Health,
            Option<&WheelSet>,
            Option<&DriveController>,
            Option<&CombatController>,
            Option<&SteeringSensorArray>,
            Option<&PerceptionModule>,
            Option<&PathPlanner>,
            Option<&BehaviorConfig>,
            Option<&BehaviorState>,
        ),
        Added<Vehicle>,
    >,
    mut disabled_events: EventWriter<VehicleDisabled>,
) {
    for (entity, source, health, wheels, drive, weapon, sensors, perception, planner, behavior, state) in
        vehicles.iter()
    {
        let parts = VehicleParts {
            health: Some(health),
            wheels,
            drive,
            weapon,
            sensors,
            perception,
            planner,
            behavior,
            state,
        };

        let Err(error) = validate_vehicle(*source, parts) else {
            continue;
        };

        crate::log_error(&format!("Vehicle {:?} disabled: {}", entity, error));
        commands.entity(entity).insert(Disabled(error.clone()));
        disabled_events.write(VehicleDisabled { entity, error });
    }
}
