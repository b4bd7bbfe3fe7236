//! Collaborator interfaces consumed by the agent controllers.
//!
//! The controller never talks to an engine directly. Navigation, spatial
//! queries, ray casts, wheel actuation and weapon spawning go through these
//! traits; a backend resource implements them (`physics::HeadlessArena` for
//! headless runs) and `AgentControlPlugin::<Backend>` wires it in.

use bevy::prelude::*;

use crate::combat::ShellFired;
use crate::layers::LayerMask;

/// Walkable-surface queries (navmesh or grid).
pub trait NavigationOracle {
    /// Snap `point` to the nearest walkable position within `max_distance`.
    fn sample_position(&self, point: Vec3, max_distance: f32) -> Option<Vec3>;

    /// Corner waypoints from `from` to `to`. Empty = no path.
    fn compute_path(&self, from: Vec3, to: Vec3) -> Vec<Vec3>;
}

/// Overlap queries against registered colliders.
pub trait SpatialQuery {
    /// Every entity whose collider intersects the sphere and whose layer is in
    /// `layer_filter`. Order must be stable between identical calls.
    fn overlap_sphere(&self, position: Vec3, radius: f32, layer_filter: LayerMask) -> Vec<Entity>;
}

/// Result of a ray cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec3,
    /// None for static geometry (walls, arena bounds)
    pub entity: Option<Entity>,
}

pub trait RayCaster {
    /// Closest hit along `direction` (normalized) within `max_distance`.
    /// `exclude` skips the caster's own body.
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<Entity>,
    ) -> Option<RayHit>;
}

/// Per-wheel drivetrain commands (wheel colliders or any equivalent).
pub trait DrivetrainActuator {
    fn wheel_count(&self) -> usize;
    fn is_steering(&self, wheel: usize) -> bool;
    fn set_motor_torque(&mut self, wheel: usize, torque: f32);
    fn set_brake_torque(&mut self, wheel: usize, torque: f32);
    fn set_steer_angle(&mut self, wheel: usize, angle: f32);
    fn average_rpm(&self) -> f32;
}

/// Receives fire requests (spawns projectiles, plays effects, ...).
pub trait WeaponSink {
    fn fire(&mut self, shot: ShellFired);
}

impl WeaponSink for Vec<ShellFired> {
    fn fire(&mut self, shot: ShellFired) {
        self.push(shot);
    }
}

impl WeaponSink for EventWriter<'_, ShellFired> {
    fn fire(&mut self, shot: ShellFired) {
        self.write(shot);
    }
}
