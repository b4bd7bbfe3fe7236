//! Waypoint path + planner state (destination selection, recalculation).

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, ConfigError};
use crate::math::flat_distance;
use crate::services::NavigationOracle;

/// Corner waypoints plus a progress cursor.
///
/// Invariant: the cursor only moves forward until the path is replaced or
/// cleared. A path with no waypoints counts as complete.
#[derive(Debug, Clone, Default, PartialEq, Reflect)]
pub struct Path {
    pub waypoints: Vec<Vec3>,
    pub cursor: usize,
}

impl Path {
    pub fn new(waypoints: Vec<Vec3>) -> Self {
        Self { waypoints, cursor: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Cursor has passed the last waypoint (always true for an empty path).
    pub fn is_complete(&self) -> bool {
        self.cursor >= self.waypoints.len()
    }

    /// Waypoint the vehicle is currently driving to.
    pub fn current(&self) -> Option<Vec3> {
        self.waypoints.get(self.cursor).copied()
    }

    pub fn remaining(&self) -> usize {
        self.waypoints.len().saturating_sub(self.cursor)
    }

    /// Step to the next waypoint when the current one is within
    /// `arrival_radius` (horizontal distance). At most one step per call.
    pub fn advance(&mut self, position: Vec3, arrival_radius: f32) -> bool {
        match self.current() {
            Some(waypoint) if flat_distance(position, waypoint) <= arrival_radius => {
                self.cursor += 1;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.cursor = 0;
    }
}

#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Waypoint counts as reached within this horizontal distance (m)
    pub arrival_radius: f32,
    /// Minimum seconds between re-plans toward the same destination
    pub recalc_interval: f32,
    /// Roam points are drawn from [-extent, extent] on X and Z
    pub roam_half_extent: f32,
    /// Max snap distance when sampling a roam point onto the walkable surface
    pub sample_max_distance: f32,
    /// Abandon a roam destination not reached within this many seconds
    pub roam_give_up_time: f32,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            arrival_radius: 3.0,
            recalc_interval: 1.0,
            roam_half_extent: 250.0,
            sample_max_distance: 10.0,
            roam_give_up_time: 60.0,
        }
    }
}

impl PathConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("path.arrival_radius", self.arrival_radius)?;
        ensure_positive("path.recalc_interval", self.recalc_interval)?;
        ensure_positive("path.roam_half_extent", self.roam_half_extent)?;
        ensure_positive("path.sample_max_distance", self.sample_max_distance)?;
        ensure_positive("path.roam_give_up_time", self.roam_give_up_time)?;
        Ok(())
    }
}

/// What the planner did this tick (for logging and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanEvent {
    Idle,
    Advanced,
    /// New roam destination chosen and a path requested
    NewDestination,
    /// Same destination, fresh path
    Replanned,
    /// Roam destination dropped (reached, unreachable or timed out)
    Abandoned,
    /// Random point could not be snapped to the walkable surface
    SampleFailed,
}

/// Path planning state of one AI vehicle.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct PathPlanner {
    pub config: PathConfig,
    pub path: Path,
    pub destination: Option<Vec3>,
    /// Seconds since the last path request
    pub recalc_elapsed: f32,
    /// Seconds spent on the current roam destination
    pub roam_elapsed: f32,
}

impl PathPlanner {
    pub fn new(config: PathConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Replace the path with a fresh oracle query toward `destination`.
    pub fn request_path(&mut self, oracle: &impl NavigationOracle, from: Vec3, destination: Vec3) {
        self.path = Path::new(oracle.compute_path(from, destination));
        self.recalc_elapsed = 0.0;
    }

    /// Drop destination and path (state transitions, arrival, give-up).
    pub fn clear(&mut self) {
        self.path.clear();
        self.destination = None;
        self.recalc_elapsed = 0.0;
        self.roam_elapsed = 0.0;
    }

    /// Random point inside the roam square (X and Z drawn independently).
    pub fn random_roam_point(&self, rng: &mut impl Rng, height: f32) -> Vec3 {
        let extent = self.config.roam_half_extent;
        Vec3::new(rng.gen_range(-extent..=extent), height, rng.gen_range(-extent..=extent))
    }

    /// One logic tick while Roaming.
    ///
    /// Progress the path; when it completes (or was empty) or the give-up
    /// timer runs out the destination is dropped and a new one is chosen in
    /// the same tick.
    pub fn update_roaming(
        &mut self,
        oracle: &impl NavigationOracle,
        rng: &mut impl Rng,
        position: Vec3,
        delta: f32,
    ) -> PlanEvent {
        let mut event = PlanEvent::Idle;

        if let Some(destination) = self.destination {
            self.recalc_elapsed += delta;
            self.roam_elapsed += delta;

            if self.path.advance(position, self.config.arrival_radius) {
                event = PlanEvent::Advanced;
            }

            if self.path.is_complete() || self.roam_elapsed >= self.config.roam_give_up_time {
                self.clear();
                event = PlanEvent::Abandoned;
            } else if self.recalc_elapsed >= self.config.recalc_interval {
                self.request_path(oracle, position, destination);
                return PlanEvent::Replanned;
            } else {
                return event;
            }
        }

        let candidate = self.random_roam_point(rng, position.y);
        match oracle.sample_position(candidate, self.config.sample_max_distance) {
            Some(destination) => {
                self.destination = Some(destination);
                self.roam_elapsed = 0.0;
                self.request_path(oracle, position, destination);
                PlanEvent::NewDestination
            }
            None if event == PlanEvent::Abandoned => event,
            None => PlanEvent::SampleFailed,
        }
    }

    /// One logic tick while Engaging: chase the target's current position.
    ///
    /// The target point is snapped onto the walkable surface first, so a
    /// target parked against an obstacle still yields a path. Re-plans when
    /// the path completes (or is empty) and otherwise at most once per
    /// `recalc_interval`.
    pub fn update_engaging(
        &mut self,
        oracle: &impl NavigationOracle,
        position: Vec3,
        target_position: Vec3,
        delta: f32,
    ) -> PlanEvent {
        let destination = oracle
            .sample_position(target_position, self.config.sample_max_distance)
            .unwrap_or(target_position);
        self.destination = Some(destination);
        self.recalc_elapsed += delta;

        let advanced = self.path.advance(position, self.config.arrival_radius);

        if self.path.is_complete() || self.recalc_elapsed >= self.config.recalc_interval {
            self.request_path(oracle, position, destination);
            PlanEvent::Replanned
        } else if advanced {
            PlanEvent::Advanced
        } else {
            PlanEvent::Idle
        }
    }
}
