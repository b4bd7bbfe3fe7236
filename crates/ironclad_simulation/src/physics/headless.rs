//! Headless arena: navigation, overlap and ray queries without an engine.
//!
//! Bodies are flat circles on the XZ plane (vehicles and cylinder obstacles);
//! the arena is a square fenced by walls at `±half_extent`. Heights are
//! ignored by every query.

use bevy::prelude::*;

use crate::layers::{LayerMask, COLLISION_LAYER_ENVIRONMENT, COLLISION_LAYER_VEHICLES};
use crate::math::flat_distance;
use crate::physics::navgrid::NavGrid;
use crate::services::{NavigationOracle, RayCaster, RayHit, SpatialQuery};

/// Footprint radius of a vehicle hull.
pub const VEHICLE_BODY_RADIUS: f32 = 2.5;

/// Static cylindrical obstacle.
///
/// Registered in the arena (and carved out of the nav grid) when added.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct Obstacle {
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaBody {
    pub entity: Entity,
    pub position: Vec3,
    pub radius: f32,
    pub layer: LayerMask,
}

#[derive(Resource, Debug, Clone)]
pub struct HeadlessArena {
    pub half_extent: f32,
    /// Obstacles are inflated by this much in the nav grid
    pub clearance: f32,
    obstacles: Vec<ArenaBody>,
    /// Vehicle bodies, sorted by entity; rebuilt every sync
    bodies: Vec<ArenaBody>,
    nav: NavGrid,
}

impl Default for HeadlessArena {
    fn default() -> Self {
        Self::new(150.0, 2.0)
    }
}

impl HeadlessArena {
    pub fn new(half_extent: f32, cell_size: f32) -> Self {
        Self {
            half_extent,
            clearance: VEHICLE_BODY_RADIUS,
            obstacles: Vec::new(),
            bodies: Vec::new(),
            nav: NavGrid::new(half_extent, cell_size),
        }
    }

    pub fn add_obstacle(&mut self, entity: Entity, position: Vec3, radius: f32) {
        self.nav.block_circle(position, radius + self.clearance);
        self.obstacles.push(ArenaBody {
            entity,
            position,
            radius,
            layer: COLLISION_LAYER_ENVIRONMENT,
        });
    }

    pub fn obstacles(&self) -> &[ArenaBody] {
        &self.obstacles
    }

    pub fn bodies(&self) -> &[ArenaBody] {
        &self.bodies
    }

    pub fn nav_grid(&self) -> &NavGrid {
        &self.nav
    }

    /// Replace the vehicle snapshot.
    pub fn sync_bodies(&mut self, vehicles: impl IntoIterator<Item = (Entity, Vec3)>) {
        self.bodies.clear();
        self.bodies.extend(vehicles.into_iter().map(|(entity, position)| ArenaBody {
            entity,
            position,
            radius: VEHICLE_BODY_RADIUS,
            layer: COLLISION_LAYER_VEHICLES,
        }));
        self.bodies.sort_by_key(|body| body.entity);
    }

    /// Would moving a hull from `from` to `to` push it into a wall, an
    /// obstacle or another vehicle? Moving away from an overlap is allowed.
    pub fn blocks(&self, entity: Entity, from: Vec3, to: Vec3, radius: f32) -> bool {
        let limit = self.half_extent - radius;
        let leaving = |from: f32, to: f32| to.abs() > limit && to.abs() > from.abs();
        if leaving(from.x, to.x) || leaving(from.z, to.z) {
            return true;
        }

        self.obstacles
            .iter()
            .chain(self.bodies.iter().filter(|body| body.entity != entity))
            .any(|body| {
                let reach = body.radius + radius;
                let next = flat_distance(to, body.position);
                next < reach && next < flat_distance(from, body.position)
            })
    }

    fn cast_walls(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let mut nearest: Option<f32> = None;
        for (start, step) in [(origin.x, direction.x), (origin.z, direction.z)] {
            if step.abs() <= f32::EPSILON {
                continue;
            }
            let wall = self.half_extent * step.signum();
            let t = (wall - start) / step;
            if t >= 0.0 && nearest.is_none_or(|best| t < best) {
                nearest = Some(t);
            }
        }
        nearest
    }
}

/// Entry distance of a ray into a vertical cylinder (XZ circle).
///
/// Rays starting inside the circle hit at distance 0.
pub fn ray_circle(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let offset = Vec2::new(origin.x - center.x, origin.z - center.z);
    let step = Vec2::new(direction.x, direction.z);

    let a = step.length_squared();
    if a <= f32::EPSILON {
        return None;
    }
    let b = 2.0 * offset.dot(step);
    let c = offset.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let t = (-b - discriminant.sqrt()) / (2.0 * a);
    (t >= 0.0).then_some(t)
}

impl NavigationOracle for HeadlessArena {
    fn sample_position(&self, point: Vec3, max_distance: f32) -> Option<Vec3> {
        self.nav.nearest_walkable(point, max_distance)
    }

    fn compute_path(&self, from: Vec3, to: Vec3) -> Vec<Vec3> {
        self.nav.find_path(from, to)
    }
}

impl SpatialQuery for HeadlessArena {
    fn overlap_sphere(&self, position: Vec3, radius: f32, layer_filter: LayerMask) -> Vec<Entity> {
        self.bodies
            .iter()
            .chain(self.obstacles.iter())
            .filter(|body| body.layer & layer_filter != 0)
            .filter(|body| flat_distance(body.position, position) <= radius + body.radius)
            .map(|body| body.entity)
            .collect()
    }
}

impl RayCaster for HeadlessArena {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<Entity>,
    ) -> Option<RayHit> {
        let mut closest = self.cast_walls(origin, direction).map(|distance| (distance, None));

        for body in self.bodies.iter().chain(self.obstacles.iter()) {
            if Some(body.entity) == exclude {
                continue;
            }
            if let Some(distance) = ray_circle(origin, direction, body.position, body.radius) {
                if closest.is_none_or(|(best, _)| distance < best) {
                    closest = Some((distance, Some(body.entity)));
                }
            }
        }

        closest
            .filter(|(distance, _)| *distance <= max_distance)
            .map(|(distance, entity)| RayHit {
                distance,
                point: origin + direction * distance,
                entity,
            })
    }
}
