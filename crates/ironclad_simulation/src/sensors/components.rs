//! Steering sensor array: fixed rays converted into an avoidance correction.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, ensure_range, ConfigError};
use crate::services::RayCaster;

/// Sensor classification; decides how a hit feeds steer and brake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum SensorRole {
    Front,
    Back,
    Left,
    Right,
    CornerLeftFront,
    CornerRightFront,
    CornerLeftBack,
    CornerRightBack,
}

/// How one role contributes to the correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleContribution {
    /// +1 pushes steer right (away from a left obstacle), -1 left, 0 none
    pub steer_sign: f32,
    pub contributes_brake: bool,
}

impl SensorRole {
    pub const ALL: [SensorRole; 8] = [
        SensorRole::Front,
        SensorRole::Back,
        SensorRole::Left,
        SensorRole::Right,
        SensorRole::CornerLeftFront,
        SensorRole::CornerRightFront,
        SensorRole::CornerLeftBack,
        SensorRole::CornerRightBack,
    ];

    /// Role lookup table.
    pub fn contribution(self) -> RoleContribution {
        let (steer_sign, contributes_brake) = match self {
            SensorRole::Front | SensorRole::Back => (0.0, false),
            SensorRole::Left => (1.0, false),
            SensorRole::Right => (-1.0, false),
            SensorRole::CornerLeftFront | SensorRole::CornerLeftBack => (1.0, true),
            SensorRole::CornerRightFront | SensorRole::CornerRightBack => (-1.0, true),
        };
        RoleContribution {
            steer_sign,
            contributes_brake,
        }
    }
}

/// Per-tick sensor result. Overwritten every physics tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct SensorReading {
    pub hit: bool,
    pub hit_distance: f32,
    /// 1 at the sensor origin, 0 at max range
    pub intensity: f32,
}

impl SensorReading {
    pub fn from_hit(hit_distance: f32, max_range: f32) -> Self {
        let intensity = 1.0 - (hit_distance / max_range).clamp(0.0, 1.0);
        Self {
            hit: true,
            hit_distance,
            intensity,
        }
    }

    pub fn miss() -> Self {
        Self::default()
    }
}

/// One ray sensor mounted on the hull (local space: -Z forward, +X right).
#[derive(Debug, Clone, Reflect)]
pub struct Sensor {
    pub role: SensorRole,
    pub local_origin: Vec3,
    pub local_direction: Vec3,
    pub max_range: f32,
    pub reading: SensorReading,
}

impl Sensor {
    pub fn new(role: SensorRole, local_origin: Vec3, local_direction: Vec3, max_range: f32) -> Self {
        Self {
            role,
            local_origin,
            local_direction: local_direction.normalize_or_zero(),
            max_range,
            reading: SensorReading::miss(),
        }
    }
}

/// Blended avoidance output of the whole array.
///
/// Invariant: steer ∈ [-1, 1], brake ∈ [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct SteeringCorrection {
    pub steer: f32,
    pub brake: f32,
    /// At least one sensor hit something this tick
    pub override_active: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorLayout {
    /// Front, Left, Right and both front corners
    #[default]
    Standard,
    /// All eight roles
    FullRing,
}

impl SensorLayout {
    pub fn roles(self) -> &'static [SensorRole] {
        match self {
            SensorLayout::Standard => &[
                SensorRole::Front,
                SensorRole::Left,
                SensorRole::Right,
                SensorRole::CornerLeftFront,
                SensorRole::CornerRightFront,
            ],
            SensorLayout::FullRing => &SensorRole::ALL,
        }
    }
}

/// Sensor array tuning.
#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorArrayConfig {
    pub layout: SensorLayout,
    /// Front / Left / Right ray length (m)
    pub forward_range: f32,
    /// Angled corner sensor length (m)
    pub corner_range: f32,
    /// Back sensor length (m)
    pub rear_range: f32,
    /// Outward angle of the corner sensors (degrees)
    pub corner_angle_degrees: f32,
    pub mount_height: f32,
    pub steer_gain: f32,
    pub brake_gain: f32,
}

impl Default for SensorArrayConfig {
    fn default() -> Self {
        Self {
            layout: SensorLayout::Standard,
            forward_range: 15.0,
            corner_range: 10.0,
            rear_range: 8.0,
            corner_angle_degrees: 30.0,
            mount_height: 1.0,
            steer_gain: 1.0,
            brake_gain: 0.5,
        }
    }
}

impl SensorArrayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("sensors.forward_range", self.forward_range)?;
        ensure_positive("sensors.corner_range", self.corner_range)?;
        ensure_positive("sensors.rear_range", self.rear_range)?;
        ensure_range("sensors.corner_angle_degrees", self.corner_angle_degrees, 0.0, 90.0)?;
        ensure_range("sensors.steer_gain", self.steer_gain, 0.0, f32::MAX)?;
        ensure_range("sensors.brake_gain", self.brake_gain, 0.0, f32::MAX)?;
        Ok(())
    }
}

/// Reactive obstacle-avoidance sensors of one AI vehicle.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct SteeringSensorArray {
    pub sensors: Vec<Sensor>,
    pub steer_gain: f32,
    pub brake_gain: f32,
    /// Result of the last evaluation
    pub correction: SteeringCorrection,
}

impl SteeringSensorArray {
    pub fn new(sensors: Vec<Sensor>, steer_gain: f32, brake_gain: f32) -> Self {
        Self {
            sensors,
            steer_gain,
            brake_gain,
            correction: SteeringCorrection::default(),
        }
    }

    /// Build the stock layout around a hull with the given half extents.
    pub fn from_config(config: &SensorArrayConfig, hull_half_extents: Vec3) -> Self {
        let half_width = hull_half_extents.x;
        let half_length = hull_half_extents.z;
        let height = config.mount_height;
        let (sin, cos) = config.corner_angle_degrees.to_radians().sin_cos();

        let sensors = config
            .layout
            .roles()
            .iter()
            .map(|&role| {
                let (origin, direction, range) = match role {
                    SensorRole::Front => (
                        Vec3::new(0.0, height, -half_length),
                        Vec3::NEG_Z,
                        config.forward_range,
                    ),
                    SensorRole::Back => (
                        Vec3::new(0.0, height, half_length),
                        Vec3::Z,
                        config.rear_range,
                    ),
                    SensorRole::Left => (
                        Vec3::new(-half_width, height, -half_length),
                        Vec3::NEG_Z,
                        config.forward_range,
                    ),
                    SensorRole::Right => (
                        Vec3::new(half_width, height, -half_length),
                        Vec3::NEG_Z,
                        config.forward_range,
                    ),
                    SensorRole::CornerLeftFront => (
                        Vec3::new(-half_width, height, -half_length),
                        Vec3::new(-sin, 0.0, -cos),
                        config.corner_range,
                    ),
                    SensorRole::CornerRightFront => (
                        Vec3::new(half_width, height, -half_length),
                        Vec3::new(sin, 0.0, -cos),
                        config.corner_range,
                    ),
                    SensorRole::CornerLeftBack => (
                        Vec3::new(-half_width, height, half_length),
                        Vec3::new(-sin, 0.0, cos),
                        config.corner_range,
                    ),
                    SensorRole::CornerRightBack => (
                        Vec3::new(half_width, height, half_length),
                        Vec3::new(sin, 0.0, cos),
                        config.corner_range,
                    ),
                };
                Sensor::new(role, origin, direction, range)
            })
            .collect();

        Self::new(sensors, config.steer_gain, config.brake_gain)
    }

    /// Cast every sensor from `transform` and fold the hits into a correction.
    ///
    /// `exclude` is the vehicle's own body. A miss is a normal reading.
    pub fn evaluate(
        &mut self,
        transform: &Transform,
        caster: &impl RayCaster,
        exclude: Option<Entity>,
    ) -> SteeringCorrection {
        for sensor in &mut self.sensors {
            let origin = transform.transform_point(sensor.local_origin);
            let direction = transform.rotation * sensor.local_direction;

            sensor.reading = match caster.cast_ray(origin, direction, sensor.max_range, exclude) {
                Some(hit) => SensorReading::from_hit(hit.distance, sensor.max_range),
                None => SensorReading::miss(),
            };
        }

        self.correction = aggregate_readings(
            self.sensors.iter().map(|sensor| (sensor.role, sensor.reading)),
            self.steer_gain,
            self.brake_gain,
        );
        self.correction
    }
}

/// Fold sensor readings into one correction using the role table.
pub fn aggregate_readings(
    readings: impl IntoIterator<Item = (SensorRole, SensorReading)>,
    steer_gain: f32,
    brake_gain: f32,
) -> SteeringCorrection {
    let mut steer = 0.0;
    let mut brake = 0.0;
    let mut override_active = false;

    for (role, reading) in readings {
        if !reading.hit {
            continue;
        }
        override_active = true;

        let contribution = role.contribution();
        steer += contribution.steer_sign * reading.intensity * steer_gain;
        if contribution.contributes_brake {
            brake += reading.intensity * brake_gain;
        }
    }

    SteeringCorrection {
        steer: steer.clamp(-1.0, 1.0),
        brake: brake.clamp(0.0, 1.0),
        override_active,
    }
}
