//! Tests for the drive controller and wheel actuator.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use crate::drive::{steer_toward, DriveConfig, DriveController, DriveIntent, StuckRecovery, WheelSet};
    use crate::sensors::SteeringCorrection;
    use crate::services::DrivetrainActuator;

    const DT: f32 = 1.0 / 60.0;

    fn full_throttle() -> DriveIntent {
        DriveIntent {
            throttle: 1.0,
            steer: 0.3,
            ..Default::default()
        }
    }

    #[test]
    fn test_steer_toward_right_waypoint() {
        // Forward is -Z, right is +X
        let transform = Transform::IDENTITY;
        let intent = steer_toward(&transform, Vec3::new(10.0, 0.0, -10.0), 10.0);

        assert!(intent.steer > 0.0);
        assert!((intent.steer - std::f32::consts::FRAC_1_SQRT_2).abs() < 1.0e-5);
        assert_eq!(intent.throttle, 1.0);
    }

    #[test]
    fn test_steer_toward_slows_near_waypoint() {
        let intent = steer_toward(&Transform::IDENTITY, Vec3::new(0.0, 30.0, -5.0), 10.0);
        // Height is flattened: 5 m away → half throttle, straight ahead
        assert!((intent.throttle - 0.5).abs() < 1.0e-5);
        assert!(intent.steer.abs() < 1.0e-6);
    }

    #[test]
    fn test_steer_toward_on_waypoint_is_idle() {
        assert_eq!(steer_toward(&Transform::IDENTITY, Vec3::ZERO, 10.0), DriveIntent::default());
    }

    #[test]
    fn test_torque_ramps_toward_target() {
        let mut drive = DriveController::default();
        let first = drive.resolve(&full_throttle(), None, Vec3::ZERO, 5.0, DT);

        assert!(first.motor_torque > 0.0 && first.motor_torque < 1000.0);
        let mut last = first;
        for _ in 0..600 {
            last = drive.resolve(&full_throttle(), None, Vec3::ZERO, 5.0, DT);
        }
        assert!((last.motor_torque - 1000.0).abs() < 1.0);
    }

    #[test]
    fn test_override_replaces_path_steer() {
        let mut drive = DriveController::default();
        let correction = SteeringCorrection {
            steer: -0.8,
            brake: 0.4,
            override_active: true,
        };

        let output = drive.resolve(&full_throttle(), Some(&correction), Vec3::ZERO, 5.0, DT);
        assert_eq!(output.steer, -0.8);
        assert_eq!(output.brake, 0.4);
        assert_eq!(output.brake_torque, 400.0);

        // Inactive correction: path steer wins
        let idle = SteeringCorrection::default();
        let output = drive.resolve(&full_throttle(), Some(&idle), Vec3::ZERO, 5.0, DT);
        assert_eq!(output.steer, 0.3);
    }

    #[test]
    fn test_speed_cap_holds_throttle() {
        let mut drive = DriveController::default();
        let output = drive.resolve(&full_throttle(), None, Vec3::ZERO, 22.0, DT);
        assert_eq!(output.throttle, 0.1);
    }

    #[test]
    fn test_steer_angle_scaled() {
        let mut drive = DriveController::default();
        let intent = DriveIntent {
            throttle: 0.5,
            steer: 1.0,
            ..Default::default()
        };
        let output = drive.resolve(&intent, None, Vec3::ZERO, 5.0, DT);
        assert!((output.steer_angle - 35f32.to_radians()).abs() < 1.0e-6);
    }

    #[test]
    fn test_stall_enters_reversing_after_wait() {
        let mut drive = DriveController::default();

        // Just under 3 s stalled is not yet enough
        for _ in 0..170 {
            drive.resolve(&full_throttle(), None, Vec3::ZERO, 0.0, DT);
        }
        assert!(!drive.recovery.is_reversing());

        let output = drive.resolve(&full_throttle(), None, Vec3::ZERO, 0.0, 0.2);
        assert!(drive.recovery.is_reversing());
        assert!(output.is_reversing);
        assert_eq!(output.steer, -0.3);
    }

    #[test]
    fn test_moving_resets_stall_timer() {
        let mut drive = DriveController::default();
        for _ in 0..150 {
            drive.resolve(&full_throttle(), None, Vec3::ZERO, 0.0, DT);
        }
        drive.resolve(&full_throttle(), None, Vec3::ZERO, 2.0, DT);
        assert_eq!(drive.recovery, StuckRecovery::Normal { stalled_for: 0.0 });
    }

    #[test]
    fn test_reversing_suppresses_avoidance_and_keeps_throttle() {
        let mut drive = DriveController::default();
        drive.recovery = StuckRecovery::Reversing { origin: Vec3::ZERO };
        let correction = SteeringCorrection {
            steer: 1.0,
            brake: 1.0,
            override_active: true,
        };
        let intent = DriveIntent {
            throttle: 0.0,
            steer: 0.5,
            ..Default::default()
        };

        let output = drive.resolve(&intent, Some(&correction), Vec3::ZERO, 0.0, DT);
        assert_eq!(output.steer, -0.5);
        assert_eq!(output.brake, 0.0);
        assert_eq!(output.throttle, 0.6);
        assert!(output.motor_torque < 0.0);
    }

    #[test]
    fn test_reversing_exits_at_max_distance() {
        let mut drive = DriveController::default();
        drive.recovery = StuckRecovery::Reversing { origin: Vec3::ZERO };

        let output = drive.resolve(&full_throttle(), None, Vec3::new(0.0, 0.0, 9.99), 3.0, DT);
        assert!(output.is_reversing);

        let output = drive.resolve(&full_throttle(), None, Vec3::new(0.0, 0.0, 10.0), 3.0, DT);
        assert!(!output.is_reversing);
        assert_eq!(drive.recovery, StuckRecovery::Normal { stalled_for: 0.0 });
    }

    #[test]
    fn test_player_never_auto_reverses() {
        let mut drive = DriveController::default().without_recovery();
        for _ in 0..600 {
            drive.resolve(&full_throttle(), None, Vec3::ZERO, 0.0, DT);
        }
        assert!(!drive.recovery.is_reversing());

        let manual = DriveIntent {
            throttle: 1.0,
            reverse: true,
            ..Default::default()
        };
        let output = drive.resolve(&manual, None, Vec3::ZERO, 0.0, DT);
        assert!(output.is_reversing);
    }

    #[test]
    fn test_output_ranges() {
        let mut drive = DriveController::default();
        let wild = DriveIntent {
            throttle: 3.0,
            steer: -7.0,
            brake: 2.0,
            reverse: false,
        };
        let output = drive.resolve(&wild, None, Vec3::ZERO, 5.0, DT);
        assert_eq!(output.throttle, 1.0);
        assert_eq!(output.steer, -1.0);
        assert_eq!(output.brake, 1.0);
    }

    #[test]
    fn test_apply_to_wheels() {
        let mut drive = DriveController::default();
        let mut wheels = WheelSet::four_wheel(Vec3::new(1.5, 1.0, 3.0));
        let intent = DriveIntent {
            throttle: 1.0,
            steer: 1.0,
            ..Default::default()
        };

        let output = drive.resolve(&intent, None, Vec3::ZERO, 5.0, DT);
        output.apply(&mut wheels);

        assert_eq!(wheels.wheel_count(), 4);
        assert!(wheels.wheels.iter().all(|wheel| wheel.motor_torque == output.motor_torque));
        assert_eq!(wheels.wheels[0].steer_angle, output.steer_angle);
        assert_eq!(wheels.wheels[3].steer_angle, 0.0);
    }

    #[test]
    fn test_wheel_lock() {
        let mut wheels = WheelSet::four_wheel(Vec3::ONE);
        wheels.set_motor_torque(0, 500.0);
        wheels.lock();
        assert_eq!(wheels.average_motor_torque(), 0.0);
        assert!(wheels.average_brake_torque() > 1000.0);
    }

    #[test]
    fn test_config_validation() {
        assert!(DriveConfig::default().validate().is_ok());
        let broken = DriveConfig {
            reverse_throttle: 1.5,
            ..Default::default()
        };
        assert!(broken.validate().is_err());
    }
}
