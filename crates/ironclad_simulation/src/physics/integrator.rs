//! Kinematic drivetrain integration and hitscan shells (headless backend).
//!
//! Not a physics solver: wheel torques become a longitudinal acceleration,
//! steer angle becomes a yaw rate (bicycle model), and a move that would push
//! the hull into something is dropped with the speed zeroed. That is enough
//! for stalls, recovery and pursuit to behave.

use bevy::prelude::*;

use crate::combat::{Dead, ShellFired, ShellHit};
use crate::components::{Vehicle, VehicleTelemetry};
use crate::drive::WheelSet;
use crate::physics::headless::{HeadlessArena, Obstacle, VEHICLE_BODY_RADIUS};
use crate::services::{DrivetrainActuator, RayCaster};

/// Chassis parameters shared by every headless vehicle.
#[derive(Resource, Debug, Clone, Reflect)]
#[reflect(Resource)]
pub struct VehicleDynamics {
    /// kg
    pub mass: f32,
    /// Front to rear axle (m)
    pub wheel_base: f32,
    /// Fraction of speed lost per second when coasting
    pub rolling_drag: f32,
}

impl Default for VehicleDynamics {
    fn default() -> Self {
        Self {
            mass: 1500.0,
            wheel_base: 4.2,
            rolling_drag: 0.3,
        }
    }
}

/// Result of one integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicStep {
    pub forward_speed: f32,
    pub yaw_delta: f32,
}

impl VehicleDynamics {
    /// New signed forward speed and yaw change for one step.
    ///
    /// Positive steer angle turns right (yaw decreases) when driving forward.
    pub fn step(&self, wheels: &WheelSet, forward_speed: f32, delta: f32) -> KinematicStep {
        let wheel_count = wheels.wheels.len().max(1) as f32;
        let radius = wheels
            .wheels
            .first()
            .map(|wheel| wheel.radius)
            .filter(|radius| *radius > 0.0)
            .unwrap_or(0.5);

        let drive_accel = wheels.average_motor_torque() * wheel_count / radius / self.mass;
        let brake_decel = wheels.average_brake_torque() * wheel_count / radius / self.mass;

        let mut speed = forward_speed + drive_accel * delta;
        speed -= speed * self.rolling_drag * delta;

        // Brakes only ever bring the hull to rest
        let brake = brake_decel * delta;
        speed = if speed > 0.0 {
            (speed - brake).max(0.0)
        } else {
            (speed + brake).min(0.0)
        };

        let yaw_rate = -speed * wheels.steer_angle().tan() / self.wheel_base;

        KinematicStep {
            forward_speed: speed,
            yaw_delta: yaw_rate * delta,
        }
    }
}

/// Convert spin speed of a wheel rolling at `speed` (m/s) to rpm.
fn rolling_rpm(speed: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    speed / radius * 60.0 / std::f32::consts::TAU
}

/// System: carve newly added obstacles into the arena.
pub fn register_obstacles(
    mut arena: ResMut<HeadlessArena>,
    obstacles: Query<(Entity, &Transform, &Obstacle), Added<Obstacle>>,
) {
    for (entity, transform, obstacle) in obstacles.iter() {
        arena.add_obstacle(entity, transform.translation, obstacle.radius);
        crate::log(&format!(
            "Arena: obstacle {:?} at ({:.1}, {:.1}) r={:.1}",
            entity, transform.translation.x, transform.translation.z, obstacle.radius
        ));
    }
}

/// System: snapshot vehicle positions for queries. Wrecks stay solid.
pub fn sync_arena_bodies(mut arena: ResMut<HeadlessArena>, vehicles: Query<(Entity, &Transform), With<Vehicle>>) {
    arena.sync_bodies(vehicles.iter().map(|(entity, transform)| (entity, transform.translation)));
}

/// System: integrate wheel commands into hull motion (physics tick).
pub fn integrate_vehicles(
    time: Res<Time>,
    dynamics: Res<VehicleDynamics>,
    arena: Res<HeadlessArena>,
    mut vehicles: Query<(Entity, &mut Transform, &mut VehicleTelemetry, &mut WheelSet), With<Vehicle>>,
) {
    let delta = time.delta_secs();
    if delta <= 0.0 {
        return;
    }

    for (entity, mut transform, mut telemetry, mut wheels) in vehicles.iter_mut() {
        let step = dynamics.step(&wheels, telemetry.forward_speed, delta);

        let rotation = (Quat::from_rotation_y(step.yaw_delta) * transform.rotation).normalize();
        let forward = rotation * Vec3::NEG_Z;
        let from = transform.translation;
        let to = from + forward * step.forward_speed * delta;

        let spin_speed = step.forward_speed;
        let moved_speed = if arena.blocks(entity, from, to, VEHICLE_BODY_RADIUS) {
            0.0
        } else {
            transform.translation = to;
            transform.rotation = rotation;
            step.forward_speed
        };

        // Blocked wheels keep spinning
        for wheel in &mut wheels.wheels {
            wheel.rpm = rolling_rpm(spin_speed, wheel.radius);
        }

        telemetry.forward_speed = moved_speed;
        telemetry.velocity = forward * moved_speed;
        telemetry.speed = moved_speed.abs();
        telemetry.wheel_rpm = wheels.average_rpm();
    }
}

/// System: resolve shells instantly along their flight line.
///
/// Only live vehicles take hits; walls, obstacles and wrecks absorb the shell.
pub fn resolve_shells(
    arena: Res<HeadlessArena>,
    mut fired: EventReader<ShellFired>,
    mut hits: EventWriter<ShellHit>,
    targets: Query<(), (With<Vehicle>, Without<Dead>)>,
) {
    for shot in fired.read() {
        let Some(hit) = arena.cast_ray(shot.origin, shot.direction, shot.range, Some(shot.shooter)) else {
            continue;
        };
        let Some(target) = hit.entity.filter(|entity| targets.contains(*entity)) else {
            continue;
        };

        hits.write(ShellHit {
            shooter: shot.shooter,
            target,
            damage: shot.damage,
            point: hit.point,
        });
    }
}
