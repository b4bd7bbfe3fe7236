//! Headless physics backend.
//!
//! - navgrid: A* grid navigation with line-of-sight smoothing
//! - headless: `HeadlessArena` (NavigationOracle + SpatialQuery + RayCaster)
//! - integrator: kinematic drivetrain, hitscan shells, arena sync
//! - rapier: kinematic bodies and collision groups for Rapier hosts
//!
//! Any engine can replace this module by implementing the `services` traits.

use bevy::prelude::*;

pub mod headless;
pub mod integrator;
pub mod navgrid;
pub mod rapier;

pub use headless::{ray_circle, ArenaBody, HeadlessArena, Obstacle, VEHICLE_BODY_RADIUS};
pub use integrator::{
    integrate_vehicles, register_obstacles, resolve_shells, sync_arena_bodies, KinematicStep, VehicleDynamics,
};
pub use navgrid::{NavGrid, MAX_GRID_SIDE};
pub use rapier::{collision_groups, obstacle_body, sync_velocity_to_rapier, vehicle_body};

use crate::combat::apply_shell_hits;
use crate::{LogicSet, PhysicsSet};

/// Headless physics plugin
///
/// - PreUpdate: register_obstacles
/// - FixedUpdate: sync_arena_bodies (Sync) → integrate_vehicles → sync_velocity_to_rapier (Integrate)
/// - Update: sync_arena_bodies (Sync), resolve_shells (Resolve, before damage)
pub struct HeadlessPhysicsPlugin;

impl Plugin for HeadlessPhysicsPlugin {
    fn build(&self, app: &mut App) {
        crate::configure_sets(app);

        app.init_resource::<HeadlessArena>()
            .init_resource::<VehicleDynamics>()
            .register_type::<Obstacle>()
            .register_type::<VehicleDynamics>();

        app.add_systems(PreUpdate, register_obstacles)
            .add_systems(FixedUpdate, sync_arena_bodies.in_set(PhysicsSet::Sync))
            .add_systems(
                FixedUpdate,
                (integrate_vehicles, sync_velocity_to_rapier)
                    .chain()
                    .in_set(PhysicsSet::Integrate),
            )
            .add_systems(Update, sync_arena_bodies.in_set(LogicSet::Sync))
            .add_systems(Update, resolve_shells.in_set(LogicSet::Resolve).before(apply_shell_hits));
    }
}
