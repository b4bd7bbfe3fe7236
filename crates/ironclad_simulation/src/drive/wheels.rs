//! Wheel set: the actuator side of the drivetrain.
//!
//! Stores the last commands per wheel; the physics backend reads them and
//! writes back the spin (rpm).

use bevy::prelude::*;

use crate::services::DrivetrainActuator;

/// Brake torque applied to a locked wreck.
pub const LOCKED_BRAKE_TORQUE: f32 = 1.0e6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct Wheel {
    /// Steering wheels turn with the steer angle
    pub steering: bool,
    /// Local mount point (for engine backends)
    pub local_position: Vec3,
    pub radius: f32,
    pub motor_torque: f32,
    pub brake_torque: f32,
    /// Radians
    pub steer_angle: f32,
    pub rpm: f32,
}

impl Wheel {
    pub fn new(local_position: Vec3, steering: bool) -> Self {
        Self {
            steering,
            local_position,
            radius: 0.5,
            ..Default::default()
        }
    }
}

#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct WheelSet {
    pub wheels: Vec<Wheel>,
}

impl WheelSet {
    pub fn new(wheels: Vec<Wheel>) -> Self {
        Self { wheels }
    }

    /// Four wheels at the hull corners, front pair steering.
    pub fn four_wheel(half_extents: Vec3) -> Self {
        let x = half_extents.x;
        let z = half_extents.z * 0.7;
        Self::new(vec![
            Wheel::new(Vec3::new(-x, 0.0, -z), true),
            Wheel::new(Vec3::new(x, 0.0, -z), true),
            Wheel::new(Vec3::new(-x, 0.0, z), false),
            Wheel::new(Vec3::new(x, 0.0, z), false),
        ])
    }

    pub fn has_steering_wheel(&self) -> bool {
        self.wheels.iter().any(|wheel| wheel.steering)
    }

    pub fn average_motor_torque(&self) -> f32 {
        average(self.wheels.iter().map(|wheel| wheel.motor_torque))
    }

    pub fn average_brake_torque(&self) -> f32 {
        average(self.wheels.iter().map(|wheel| wheel.brake_torque))
    }

    /// Mean steer angle of the steering wheels.
    pub fn steer_angle(&self) -> f32 {
        average(self.wheels.iter().filter(|wheel| wheel.steering).map(|wheel| wheel.steer_angle))
    }

    /// Cut the motor, center the wheels and clamp the brakes.
    pub fn lock(&mut self) {
        for wheel in &mut self.wheels {
            wheel.motor_torque = 0.0;
            wheel.steer_angle = 0.0;
            wheel.brake_torque = LOCKED_BRAKE_TORQUE;
        }
    }
}

fn average(values: impl Iterator<Item = f32>) -> f32 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f32
    }
}

impl DrivetrainActuator for WheelSet {
    fn wheel_count(&self) -> usize {
        self.wheels.len()
    }

    fn is_steering(&self, wheel: usize) -> bool {
        self.wheels.get(wheel).is_some_and(|wheel| wheel.steering)
    }

    fn set_motor_torque(&mut self, wheel: usize, torque: f32) {
        if let Some(wheel) = self.wheels.get_mut(wheel) {
            wheel.motor_torque = torque;
        }
    }

    fn set_brake_torque(&mut self, wheel: usize, torque: f32) {
        if let Some(wheel) = self.wheels.get_mut(wheel) {
            wheel.brake_torque = torque;
        }
    }

    fn set_steer_angle(&mut self, wheel: usize, angle: f32) {
        if let Some(wheel) = self.wheels.get_mut(wheel) {
            wheel.steer_angle = angle;
        }
    }

    fn average_rpm(&self) -> f32 {
        average(self.wheels.iter().map(|wheel| wheel.rpm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_wheel_front_pair_steers() {
        let wheels = WheelSet::four_wheel(Vec3::new(1.5, 1.0, 3.0));
        assert_eq!(wheels.wheel_count(), 4);
        assert!(wheels.is_steering(0) && wheels.is_steering(1));
        assert!(!wheels.is_steering(2) && !wheels.is_steering(3));
        assert!(!wheels.is_steering(7));
    }

    #[test]
    fn test_average_rpm() {
        let mut wheels = WheelSet::four_wheel(Vec3::ONE);
        assert_eq!(wheels.average_rpm(), 0.0);

        for (wheel, rpm) in wheels.wheels.iter_mut().zip([100.0, 100.0, 50.0, 50.0]) {
            wheel.rpm = rpm;
        }
        assert_eq!(wheels.average_rpm(), 75.0);
        assert_eq!(WheelSet::default().average_rpm(), 0.0);
    }
}
