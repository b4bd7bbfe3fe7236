//! Drive controller: intent + avoidance + stuck recovery → wheel commands.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, ensure_range, ConfigError};
use crate::math::{flat_distance, smooth_damp};
use crate::sensors::SteeringCorrection;
use crate::services::DrivetrainActuator;

/// Drivetrain tuning.
#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub max_motor_torque: f32,
    pub max_brake_torque: f32,
    /// SmoothDamp time of the motor torque filter (s)
    pub torque_response_time: f32,
    pub max_steer_angle_degrees: f32,
    /// Throttle ramps down linearly inside this distance to the waypoint (m)
    pub slowdown_distance: f32,
    /// At or above this speed the throttle is held at 0.1 (m/s)
    pub max_speed: f32,
    /// Seconds stalled (throttle on, no speed) before reversing
    pub reverse_wait_time: f32,
    /// Reverse maneuver ends after this displacement (m)
    pub max_reverse_distance: f32,
    /// Below this speed the vehicle counts as stalled (m/s)
    pub stuck_speed_threshold: f32,
    /// Minimum throttle while reversing out of a stall
    pub reverse_throttle: f32,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            max_motor_torque: 1000.0,
            max_brake_torque: 1000.0,
            torque_response_time: 1.0,
            max_steer_angle_degrees: 35.0,
            slowdown_distance: 10.0,
            max_speed: 22.0,
            reverse_wait_time: 3.0,
            max_reverse_distance: 10.0,
            stuck_speed_threshold: 0.3,
            reverse_throttle: 0.6,
        }
    }
}

impl DriveConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("drive.max_motor_torque", self.max_motor_torque)?;
        ensure_positive("drive.max_brake_torque", self.max_brake_torque)?;
        ensure_positive("drive.torque_response_time", self.torque_response_time)?;
        ensure_range("drive.max_steer_angle_degrees", self.max_steer_angle_degrees, 0.0, 90.0)?;
        ensure_positive("drive.slowdown_distance", self.slowdown_distance)?;
        ensure_positive("drive.max_speed", self.max_speed)?;
        ensure_positive("drive.reverse_wait_time", self.reverse_wait_time)?;
        ensure_positive("drive.max_reverse_distance", self.max_reverse_distance)?;
        ensure_range("drive.stuck_speed_threshold", self.stuck_speed_threshold, 0.0, f32::MAX)?;
        ensure_range("drive.reverse_throttle", self.reverse_throttle, 0.0, 1.0)?;
        Ok(())
    }

    pub fn max_steer_angle(&self) -> f32 {
        self.max_steer_angle_degrees.to_radians()
    }
}

/// What the driver (AI path follower or player) wants this tick.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct DriveIntent {
    /// [0, 1]
    pub throttle: f32,
    /// [-1, 1], positive = right
    pub steer: f32,
    /// [0, 1]
    pub brake: f32,
    /// Manual reverse (player only)
    pub reverse: bool,
}

/// Stall watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum StuckRecovery {
    Normal {
        /// Seconds spent stalled with the throttle on
        stalled_for: f32,
    },
    Reversing {
        /// Where the maneuver started
        origin: Vec3,
    },
}

impl Default for StuckRecovery {
    fn default() -> Self {
        Self::Normal { stalled_for: 0.0 }
    }
}

impl StuckRecovery {
    pub fn is_reversing(&self) -> bool {
        matches!(self, StuckRecovery::Reversing { .. })
    }
}

/// Resolved drive commands for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriveOutput {
    pub throttle: f32,
    pub steer: f32,
    pub brake: f32,
    pub is_reversing: bool,
    /// Filtered, signed (negative while reversing)
    pub motor_torque: f32,
    pub brake_torque: f32,
    /// Radians, applied to steering wheels only
    pub steer_angle: f32,
}

impl DriveOutput {
    /// Push the commands to every wheel.
    pub fn apply(&self, actuator: &mut impl DrivetrainActuator) {
        for wheel in 0..actuator.wheel_count() {
            actuator.set_motor_torque(wheel, self.motor_torque);
            actuator.set_brake_torque(wheel, self.brake_torque);
            if actuator.is_steering(wheel) {
                actuator.set_steer_angle(wheel, self.steer_angle);
            }
        }
    }
}

/// Drive controller state of one vehicle.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct DriveController {
    pub config: DriveConfig,
    pub recovery: StuckRecovery,
    /// Stall watchdog active (AI only; players reverse by hand)
    pub recovery_enabled: bool,
    /// Current (filtered) motor torque
    pub motor_torque: f32,
    /// SmoothDamp state of the torque filter
    pub torque_velocity: f32,
}

impl Default for DriveController {
    fn default() -> Self {
        Self::new(DriveConfig::default())
    }
}

impl DriveController {
    pub fn new(config: DriveConfig) -> Self {
        Self {
            config,
            recovery: StuckRecovery::default(),
            recovery_enabled: true,
            motor_torque: 0.0,
            torque_velocity: 0.0,
        }
    }

    pub fn without_recovery(mut self) -> Self {
        self.recovery_enabled = false;
        self
    }

    /// One physics tick: step the stall watchdog, then blend.
    pub fn resolve(
        &mut self,
        intent: &DriveIntent,
        correction: Option<&SteeringCorrection>,
        position: Vec3,
        speed: f32,
        delta: f32,
    ) -> DriveOutput {
        if self.recovery_enabled {
            self.update_recovery(intent, position, speed, delta);
        }
        self.blend(intent, correction, speed, delta)
    }

    /// Step the stall watchdog. Exits Reversing as soon as the displacement
    /// reaches `max_reverse_distance`, before the tick's output is computed.
    pub fn update_recovery(&mut self, intent: &DriveIntent, position: Vec3, speed: f32, delta: f32) {
        self.recovery = match self.recovery {
            StuckRecovery::Normal { stalled_for } => {
                let stalled = intent.throttle > 0.0 && speed < self.config.stuck_speed_threshold;
                if !stalled {
                    StuckRecovery::Normal { stalled_for: 0.0 }
                } else if stalled_for + delta > self.config.reverse_wait_time {
                    StuckRecovery::Reversing { origin: position }
                } else {
                    StuckRecovery::Normal {
                        stalled_for: stalled_for + delta,
                    }
                }
            }
            StuckRecovery::Reversing { origin } => {
                if flat_distance(position, origin) >= self.config.max_reverse_distance {
                    StuckRecovery::Normal { stalled_for: 0.0 }
                } else {
                    StuckRecovery::Reversing { origin }
                }
            }
        };
    }

    /// Blend intent, avoidance and recovery into wheel commands.
    ///
    /// `correction` is None for vehicles without sensors (player). While
    /// reversing out of a stall avoidance is ignored, steer is mirrored and
    /// the throttle never drops below `reverse_throttle`.
    pub fn blend(
        &mut self,
        intent: &DriveIntent,
        correction: Option<&SteeringCorrection>,
        speed: f32,
        delta: f32,
    ) -> DriveOutput {
        let recovering = self.recovery.is_reversing();

        let (mut throttle, steer, brake) = if recovering {
            (intent.throttle.max(self.config.reverse_throttle), -intent.steer, 0.0)
        } else {
            match correction {
                Some(correction) if correction.override_active => (intent.throttle, correction.steer, correction.brake),
                _ => (intent.throttle, intent.steer, intent.brake),
            }
        };

        if speed >= self.config.max_speed {
            throttle = throttle.min(0.1);
        }

        let throttle = throttle.clamp(0.0, 1.0);
        let steer = steer.clamp(-1.0, 1.0);
        let brake = brake.clamp(0.0, 1.0);
        let is_reversing = recovering || intent.reverse;

        let direction = if is_reversing { -1.0 } else { 1.0 };
        let target_torque = self.config.max_motor_torque * throttle * direction;
        self.motor_torque = smooth_damp(
            self.motor_torque,
            target_torque,
            &mut self.torque_velocity,
            self.config.torque_response_time,
            delta,
        );

        DriveOutput {
            throttle,
            steer,
            brake,
            is_reversing,
            motor_torque: self.motor_torque,
            brake_torque: brake * self.config.max_brake_torque,
            steer_angle: steer * self.config.max_steer_angle(),
        }
    }
}

/// Path-follow intent toward `waypoint` (height flattened to the hull).
///
/// steer = local.x / |local|, throttle = clamp01(distance / slowdown).
pub fn steer_toward(transform: &Transform, waypoint: Vec3, slowdown_distance: f32) -> DriveIntent {
    let flattened = Vec3::new(waypoint.x, transform.translation.y, waypoint.z);
    let local = transform.rotation.inverse() * (flattened - transform.translation);
    let distance = local.length();

    if distance <= f32::EPSILON {
        return DriveIntent::default();
    }

    DriveIntent {
        throttle: (distance / slowdown_distance).clamp(0.0, 1.0),
        steer: (local.x / distance).clamp(-1.0, 1.0),
        brake: 0.0,
        reverse: false,
    }
}
