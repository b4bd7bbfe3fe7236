//! Tests for the steering sensor array.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use crate::sensors::{
        aggregate_readings, SensorArrayConfig, SensorLayout, SensorReading, SensorRole, SteeringSensorArray,
    };
    use crate::services::{RayCaster, RayHit};

    /// Every ray whose world origin lies left of x = 0 hits at `distance`.
    struct ObstacleOnLeft {
        distance: f32,
    }

    impl RayCaster for ObstacleOnLeft {
        fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32, _exclude: Option<Entity>) -> Option<RayHit> {
            if origin.x < 0.0 && self.distance <= max_distance {
                Some(RayHit {
                    distance: self.distance,
                    point: origin + direction * self.distance,
                    entity: None,
                })
            } else {
                None
            }
        }
    }

    struct OpenField;

    impl RayCaster for OpenField {
        fn cast_ray(&self, _: Vec3, _: Vec3, _: f32, _: Option<Entity>) -> Option<RayHit> {
            None
        }
    }

    /// Records the exclusion it was asked for.
    struct ExcludeCheck {
        expected: Entity,
    }

    impl RayCaster for ExcludeCheck {
        fn cast_ray(&self, origin: Vec3, _: Vec3, _: f32, exclude: Option<Entity>) -> Option<RayHit> {
            assert_eq!(exclude, Some(self.expected));
            Some(RayHit {
                distance: 1.0,
                point: origin,
                entity: None,
            })
        }
    }

    #[test]
    fn test_role_table() {
        assert_eq!(SensorRole::Left.contribution().steer_sign, 1.0);
        assert_eq!(SensorRole::Right.contribution().steer_sign, -1.0);
        assert_eq!(SensorRole::Front.contribution().steer_sign, 0.0);
        assert!(SensorRole::CornerLeftFront.contribution().contributes_brake);
        assert!(SensorRole::CornerRightBack.contribution().contributes_brake);
        assert!(!SensorRole::Left.contribution().contributes_brake);
    }

    #[test]
    fn test_intensity_from_distance() {
        let reading = SensorReading::from_hit(2.0, 10.0);
        assert!(reading.hit);
        assert!((reading.intensity - 0.8).abs() < 1.0e-6);

        // Hits beyond range clamp to zero intensity
        let far = SensorReading::from_hit(12.0, 10.0);
        assert_eq!(far.intensity, 0.0);
    }

    #[test]
    fn test_single_left_hit_steers_right() {
        let left = SensorReading::from_hit(2.0, 10.0); // intensity 0.8
        let correction = aggregate_readings(
            [
                (SensorRole::Left, left),
                (SensorRole::Right, SensorReading::miss()),
                (SensorRole::Front, SensorReading::miss()),
            ],
            1.0,
            0.5,
        );

        assert!(correction.steer > 0.0);
        assert!((correction.steer - 0.8).abs() < 1.0e-6);
        assert_eq!(correction.brake, 0.0);
        assert!(correction.override_active);
    }

    #[test]
    fn test_corner_hit_adds_brake() {
        let corner = SensorReading::from_hit(5.0, 10.0); // intensity 0.5
        let correction = aggregate_readings([(SensorRole::CornerRightFront, corner)], 1.0, 0.5);

        assert!((correction.steer + 0.5).abs() < 1.0e-6);
        assert!((correction.brake - 0.25).abs() < 1.0e-6);
    }

    #[test]
    fn test_correction_is_clamped() {
        let close = SensorReading::from_hit(0.0, 10.0); // intensity 1.0
        let correction = aggregate_readings(
            [
                (SensorRole::Left, close),
                (SensorRole::CornerLeftFront, close),
                (SensorRole::CornerLeftBack, close),
            ],
            1.0,
            1.0,
        );

        assert_eq!(correction.steer, 1.0);
        assert_eq!(correction.brake, 1.0);
    }

    #[test]
    fn test_front_hit_overrides_without_steer() {
        let front = SensorReading::from_hit(3.0, 10.0);
        let correction = aggregate_readings([(SensorRole::Front, front)], 1.0, 0.5);

        assert!(correction.override_active);
        assert_eq!(correction.steer, 0.0);
    }

    #[test]
    fn test_all_misses_no_override() {
        let mut array = SteeringSensorArray::from_config(&SensorArrayConfig::default(), Vec3::new(1.5, 1.0, 3.0));
        let correction = array.evaluate(&Transform::IDENTITY, &OpenField, None);

        assert!(!correction.override_active);
        assert_eq!(correction.steer, 0.0);
        assert!(array.sensors.iter().all(|sensor| !sensor.reading.hit));
    }

    #[test]
    fn test_evaluate_obstacle_on_left() {
        let mut array = SteeringSensorArray::from_config(&SensorArrayConfig::default(), Vec3::new(1.5, 1.0, 3.0));
        let correction = array.evaluate(&Transform::IDENTITY, &ObstacleOnLeft { distance: 3.0 }, None);

        // Left + CornerLeftFront hit, both push right
        assert!(correction.override_active);
        assert!(correction.steer > 0.0);
        assert!(correction.brake > 0.0);
        assert_eq!(array.correction, correction);
    }

    #[test]
    fn test_evaluate_respects_rotation() {
        // Turned 180°: the hull's left side now sits at +X in world space
        let mut array = SteeringSensorArray::from_config(&SensorArrayConfig::default(), Vec3::new(1.5, 1.0, 3.0));
        let transform = Transform::from_rotation(Quat::from_rotation_y(std::f32::consts::PI));
        let correction = array.evaluate(&transform, &ObstacleOnLeft { distance: 3.0 }, None);

        assert!(correction.steer < 0.0);
    }

    #[test]
    fn test_evaluate_excludes_own_body() {
        let me = Entity::from_raw(7);
        let mut array = SteeringSensorArray::from_config(&SensorArrayConfig::default(), Vec3::ONE);
        array.evaluate(&Transform::IDENTITY, &ExcludeCheck { expected: me }, Some(me));
    }

    #[test]
    fn test_layouts() {
        assert_eq!(SensorLayout::Standard.roles().len(), 5);
        assert_eq!(SensorLayout::FullRing.roles().len(), 8);

        let config = SensorArrayConfig {
            layout: SensorLayout::FullRing,
            ..Default::default()
        };
        let array = SteeringSensorArray::from_config(&config, Vec3::ONE);
        assert_eq!(array.sensors.len(), 8);
        assert!(array
            .sensors
            .iter()
            .all(|sensor| (sensor.local_direction.length() - 1.0).abs() < 1.0e-5));
    }

    #[test]
    fn test_config_validation() {
        assert!(SensorArrayConfig::default().validate().is_ok());

        let broken = SensorArrayConfig {
            forward_range: 0.0,
            ..Default::default()
        };
        assert!(broken.validate().is_err());
    }
}
