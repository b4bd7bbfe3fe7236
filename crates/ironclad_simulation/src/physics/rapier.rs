//! Rapier bodies for vehicles and obstacles.
//!
//! Vehicles are `KinematicPositionBased`: the drivetrain writes the Transform,
//! Rapier only reports contacts. The headless app never adds the Rapier
//! plugin; a host that does gets colliders, groups and velocities ready.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{Collider, CollisionGroups, Group, RigidBody, Velocity};

use crate::components::VehicleTelemetry;
use crate::layers::{
    LayerMask, COLLISION_LAYER_ENVIRONMENT, COLLISION_LAYER_VEHICLES, COLLISION_MASK_ENVIRONMENT, COLLISION_MASK_VEHICLES,
};

pub fn collision_groups(layer: LayerMask, mask: LayerMask) -> CollisionGroups {
    CollisionGroups::new(Group::from_bits_truncate(layer), Group::from_bits_truncate(mask))
}

/// Kinematic box hull.
pub fn vehicle_body(half_extents: Vec3) -> impl Bundle {
    (
        RigidBody::KinematicPositionBased,
        Collider::cuboid(half_extents.x, half_extents.y, half_extents.z),
        Velocity::default(),
        collision_groups(COLLISION_LAYER_VEHICLES, COLLISION_MASK_VEHICLES),
    )
}

/// Fixed cylinder reaching `height` above the ground.
pub fn obstacle_body(radius: f32, height: f32) -> impl Bundle {
    (
        RigidBody::Fixed,
        Collider::cylinder(height * 0.5, radius),
        collision_groups(COLLISION_LAYER_ENVIRONMENT, COLLISION_MASK_ENVIRONMENT),
    )
}

/// System: mirror headless telemetry into Rapier velocities.
pub fn sync_velocity_to_rapier(mut vehicles: Query<(&VehicleTelemetry, &mut Velocity)>) {
    for (telemetry, mut velocity) in vehicles.iter_mut() {
        velocity.linvel = telemetry.velocity;
    }
}
