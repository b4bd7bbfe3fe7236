//! Sensor systems (physics tick).

use bevy::prelude::*;

use crate::combat::Dead;
use crate::components::{Disabled, Vehicle};
use crate::sensors::SteeringSensorArray;
use crate::services::RayCaster;

/// System: cast every steering sensor and refresh the array's correction.
///
/// Runs in FixedUpdate before the drive controller reads the correction.
pub fn cast_steering_sensors<B: Resource + RayCaster>(
    backend: Res<B>,
    mut vehicles: Query<
        (Entity, &Transform, &mut SteeringSensorArray),
        (With<Vehicle>, Without<Disabled>, Without<Dead>),
    >,
) {
    for (entity, transform, mut array) in vehicles.iter_mut() {
        array.evaluate(transform, backend.as_ref(), Some(entity));
    }
}
