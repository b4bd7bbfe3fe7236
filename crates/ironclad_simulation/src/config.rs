//! Agent and arena configuration (JSON via serde).
//!
//! Every section has defaults, so a scenario only lists what it changes:
//!
//! ```json
//! {
//!   "arena": { "half_extent": 120.0 },
//!   "obstacles": [{ "position": [0.0, 0.0, -30.0], "radius": 4.0 }],
//!   "vehicles": [
//!     { "faction_id": 1, "position": [-20.0, 0.0, 0.0] },
//!     { "faction_id": 2, "position": [20.0, 0.0, 0.0], "control": "player" }
//!   ]
//! }
//! ```

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::BehaviorConfig;
use crate::combat::WeaponConfig;
use crate::components::{ControlSource, Health};
use crate::drive::DriveConfig;
use crate::error::{ensure_positive, ensure_range, ConfigError, ScenarioError};
use crate::navigation::PathConfig;
use crate::physics::MAX_GRID_SIDE;
use crate::perception::PerceptionConfig;
use crate::sensors::SensorArrayConfig;

/// Hull durability.
#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct HullConfig {
    pub max_health: f32,
    pub armor: f32,
    pub regen_rate: f32,
    pub regen_cap: f32,
}

impl Default for HullConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            armor: 0.0,
            regen_rate: 2.0,
            regen_cap: 50.0,
        }
    }
}

impl HullConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("hull.max_health", self.max_health)?;
        ensure_range("hull.armor", self.armor, 0.0, f32::MAX)?;
        ensure_range("hull.regen_rate", self.regen_rate, 0.0, f32::MAX)?;
        ensure_range("hull.regen_cap", self.regen_cap, 0.0, f32::MAX)?;
        Ok(())
    }

    pub fn health(&self) -> Health {
        Health {
            regen_rate: self.regen_rate,
            regen_cap: self.regen_cap,
            ..Health::new(self.max_health).with_armor(self.armor)
        }
    }
}

/// Full tuning of one vehicle.
#[derive(Debug, Clone, Default, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub hull: HullConfig,
    pub behavior: BehaviorConfig,
    pub path: PathConfig,
    pub perception: PerceptionConfig,
    pub sensors: SensorArrayConfig,
    pub drive: DriveConfig,
    pub weapon: WeaponConfig,
}

impl AgentConfig {
    /// First invalid value wins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hull.validate()?;
        self.behavior.validate()?;
        self.path.validate()?;
        self.perception.validate()?;
        self.sensors.validate()?;
        self.drive.validate()?;
        self.weapon.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Walls at ±half_extent on X and Z (m)
    pub half_extent: f32,
    /// Navigation grid resolution (m)
    pub cell_size: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            half_extent: 150.0,
            cell_size: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleSpec {
    pub position: [f32; 3],
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub faction_id: u64,
    pub position: [f32; 3],
    #[serde(default)]
    pub yaw_degrees: f32,
    #[serde(default)]
    pub control: ControlSource,
    /// Replaces the scenario-wide `agent` config for this vehicle
    #[serde(default)]
    pub config: Option<AgentConfig>,
}

impl VehicleSpec {
    pub fn transform(&self) -> Transform {
        Transform::from_translation(Vec3::from_array(self.position))
            .with_rotation(Quat::from_rotation_y(self.yaw_degrees.to_radians()))
    }
}

/// A complete arena setup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaScenario {
    pub arena: ArenaConfig,
    /// Config for vehicles without an override
    pub agent: AgentConfig,
    pub obstacles: Vec<ObstacleSpec>,
    pub vehicles: Vec<VehicleSpec>,
}

impl ArenaScenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        let scenario: ArenaScenario = serde_json::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Arena size and every vehicle config. Vehicles are validated again on
    /// spawn; this catches broken files before anything runs.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let arena = &self.arena;
        if !(arena.half_extent > 0.0 && arena.half_extent.is_finite()) {
            return Err(ScenarioError::InvalidArena(arena.half_extent));
        }
        if !(arena.cell_size > 0.0 && arena.cell_size.is_finite()) {
            return Err(ScenarioError::InvalidCellSize(arena.cell_size));
        }
        let cells = (2.0 * arena.half_extent / arena.cell_size).ceil();
        if cells > MAX_GRID_SIDE as f32 {
            return Err(ScenarioError::GridTooLarge {
                cells,
                max: MAX_GRID_SIDE,
            });
        }

        for (index, vehicle) in self.vehicles.iter().enumerate() {
            self.config_for(vehicle)
                .validate()
                .map_err(|source| ScenarioError::InvalidVehicle { index, source })?;
        }
        Ok(())
    }

    pub fn config_for<'a>(&'a self, vehicle: &'a VehicleSpec) -> &'a AgentConfig {
        vehicle.config.as_ref().unwrap_or(&self.agent)
    }

    /// Built-in skirmish: two AI squads across a field of rocks.
    pub fn skirmish() -> Self {
        let mut agent = AgentConfig::default();
        agent.path.roam_half_extent = 90.0;

        let vehicles = [
            (1, [-40.0, 0.0, -10.0], -90.0),
            (1, [-40.0, 0.0, 10.0], -90.0),
            (2, [40.0, 0.0, -10.0], 90.0),
            (2, [40.0, 0.0, 10.0], 90.0),
        ]
        .into_iter()
        .map(|(faction_id, position, yaw_degrees)| VehicleSpec {
            faction_id,
            position,
            yaw_degrees,
            control: ControlSource::Ai,
            config: None,
        })
        .collect();

        let obstacles = [([0.0, 0.0, 0.0], 6.0), ([-15.0, 0.0, 30.0], 4.0), ([20.0, 0.0, -35.0], 5.0)]
            .into_iter()
            .map(|(position, radius)| ObstacleSpec { position, radius })
            .collect();

        Self {
            arena: ArenaConfig {
                half_extent: 100.0,
                cell_size: 2.0,
            },
            agent,
            obstacles,
            vehicles,
        }
    }
}
