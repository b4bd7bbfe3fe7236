//! Grid navigation: A* over walkable cells + line-of-sight smoothing.
//!
//! The arena floor is a square of `2 * half_extent` split into cells of
//! `cell_size`. Obstacles block every cell whose center lies inside the
//! obstacle inflated by the vehicle radius, so a path through free cells is
//! drivable by a hull center.

use bevy::prelude::*;
use pathfinding::prelude::astar;

use crate::math::flat_distance;

/// Cell coordinate (column, row).
pub type Cell = (i32, i32);

/// Largest grid dimension (cells per side) a `NavGrid` allocates.
pub const MAX_GRID_SIDE: i32 = 2048;

const STRAIGHT_COST: u32 = 10;
const DIAGONAL_COST: u32 = 14;

#[derive(Debug, Clone)]
pub struct NavGrid {
    half_extent: f32,
    cell_size: f32,
    size: i32,
    walkable: Vec<bool>,
}

impl NavGrid {
    pub fn new(half_extent: f32, cell_size: f32) -> Self {
        let size = ((2.0 * half_extent) / cell_size).ceil().clamp(1.0, MAX_GRID_SIDE as f32) as i32;
        Self {
            half_extent,
            cell_size,
            size,
            walkable: vec![true; size as usize * size as usize],
        }
    }

    pub fn half_extent(&self) -> f32 {
        self.half_extent
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Mark every cell whose center is within `radius` of `center` as blocked.
    pub fn block_circle(&mut self, center: Vec3, radius: f32) {
        let reach = (radius / self.cell_size).ceil() as i32 + 1;
        let (cx, cz) = self.clamp_cell(center);

        for z in (cz - reach)..=(cz + reach) {
            for x in (cx - reach)..=(cx + reach) {
                if !self.in_bounds((x, z)) {
                    continue;
                }
                if flat_distance(self.center_of((x, z)), center) <= radius {
                    let index = self.index((x, z));
                    self.walkable[index] = false;
                }
            }
        }
    }

    pub fn in_bounds(&self, (x, z): Cell) -> bool {
        x >= 0 && z >= 0 && x < self.size && z < self.size
    }

    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && self.walkable[self.index(cell)]
    }

    /// Cell containing `point`, None outside the arena.
    pub fn cell_of(&self, point: Vec3) -> Option<Cell> {
        let x = ((point.x + self.half_extent) / self.cell_size).floor() as i32;
        let z = ((point.z + self.half_extent) / self.cell_size).floor() as i32;
        self.in_bounds((x, z)).then_some((x, z))
    }

    /// Ground-level center of a cell.
    pub fn center_of(&self, (x, z): Cell) -> Vec3 {
        Vec3::new(
            -self.half_extent + (x as f32 + 0.5) * self.cell_size,
            0.0,
            -self.half_extent + (z as f32 + 0.5) * self.cell_size,
        )
    }

    /// Nearest walkable point within `max_distance`.
    ///
    /// A point already on a walkable cell is returned unchanged; otherwise the
    /// closest walkable cell center wins (ties: lowest row, then column).
    pub fn nearest_walkable(&self, point: Vec3, max_distance: f32) -> Option<Vec3> {
        if let Some(cell) = self.cell_of(point) {
            if self.is_walkable(cell) {
                return Some(point);
            }
        }

        let origin = self.clamp_cell(point);
        let reach = (max_distance / self.cell_size).ceil() as i32 + 1;
        let mut best: Option<(f32, Vec3)> = None;

        for z in (origin.1 - reach)..=(origin.1 + reach) {
            for x in (origin.0 - reach)..=(origin.0 + reach) {
                if !self.is_walkable((x, z)) {
                    continue;
                }
                let center = self.center_of((x, z));
                let distance = flat_distance(center, point);
                if distance > max_distance {
                    continue;
                }
                if best.is_none_or(|(closest, _)| distance < closest) {
                    best = Some((distance, Vec3::new(center.x, point.y, center.z)));
                }
            }
        }

        best.map(|(_, position)| position)
    }

    /// Corner waypoints from `from` to `to`, start point excluded.
    ///
    /// Empty when the destination cell is blocked or unreachable. The start
    /// is snapped to the nearest walkable cell so a hull brushing an obstacle
    /// can still plan its way out.
    pub fn find_path(&self, from: Vec3, to: Vec3) -> Vec<Vec3> {
        let Some(goal) = self.cell_of(to).filter(|cell| self.is_walkable(*cell)) else {
            return Vec::new();
        };
        let Some(start) = self
            .nearest_walkable(from, self.cell_size * 2.0)
            .and_then(|snapped| self.cell_of(snapped))
        else {
            return Vec::new();
        };

        if start == goal {
            return vec![to];
        }

        let Some((cells, _cost)) = astar(
            &start,
            |cell| self.successors(*cell),
            |cell| octile(*cell, goal),
            |cell| *cell == goal,
        ) else {
            return Vec::new();
        };

        let corners = self.smooth(&cells);
        let last = corners.len().saturating_sub(1);
        corners
            .into_iter()
            .enumerate()
            .skip(1)
            .map(|(i, cell)| {
                if i == last {
                    to
                } else {
                    let center = self.center_of(cell);
                    Vec3::new(center.x, to.y, center.z)
                }
            })
            .collect()
    }

    /// Greedy string pulling: from each kept cell jump to the farthest cell
    /// still in line of sight.
    pub fn smooth(&self, cells: &[Cell]) -> Vec<Cell> {
        let Some(&first) = cells.first() else {
            return Vec::new();
        };

        let mut smoothed = vec![first];
        let mut anchor = 0;
        while anchor < cells.len() - 1 {
            let mut next = anchor + 1;
            for candidate in (anchor + 2..cells.len()).rev() {
                if self.line_of_sight(cells[anchor], cells[candidate]) {
                    next = candidate;
                    break;
                }
            }
            smoothed.push(cells[next]);
            anchor = next;
        }
        smoothed
    }

    /// Segment between two cell centers crosses only walkable cells.
    pub fn line_of_sight(&self, from: Cell, to: Cell) -> bool {
        let start = self.center_of(from);
        let end = self.center_of(to);
        let length = flat_distance(start, end);
        let steps = ((length / (self.cell_size * 0.25)).ceil() as usize).max(1);

        (0..=steps).all(|step| {
            let point = start.lerp(end, step as f32 / steps as f32);
            self.cell_of(point).is_some_and(|cell| self.is_walkable(cell))
        })
    }

    fn successors(&self, (x, z): Cell) -> Vec<(Cell, u32)> {
        let mut next = Vec::with_capacity(8);
        for dz in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dz == 0 {
                    continue;
                }
                let cell = (x + dx, z + dz);
                if !self.is_walkable(cell) {
                    continue;
                }
                if dx != 0 && dz != 0 {
                    // No corner cutting
                    if !self.is_walkable((x + dx, z)) || !self.is_walkable((x, z + dz)) {
                        continue;
                    }
                    next.push((cell, DIAGONAL_COST));
                } else {
                    next.push((cell, STRAIGHT_COST));
                }
            }
        }
        next
    }

    fn clamp_cell(&self, point: Vec3) -> Cell {
        let x = ((point.x + self.half_extent) / self.cell_size).floor() as i32;
        let z = ((point.z + self.half_extent) / self.cell_size).floor() as i32;
        (x.clamp(0, self.size - 1), z.clamp(0, self.size - 1))
    }

    fn index(&self, (x, z): Cell) -> usize {
        (z * self.size + x) as usize
    }
}

fn octile((ax, az): Cell, (bx, bz): Cell) -> u32 {
    let dx = (ax - bx).unsigned_abs();
    let dz = (az - bz).unsigned_abs();
    STRAIGHT_COST * dx.max(dz) + (DIAGONAL_COST - STRAIGHT_COST) * dx.min(dz)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_grid_path_is_straight() {
        let grid = NavGrid::new(50.0, 2.0);
        let to = Vec3::new(30.0, 0.0, 0.0);
        let path = grid.find_path(Vec3::new(-30.0, 0.0, 0.0), to);

        // Nothing in the way: a single corner at the destination
        assert_eq!(path, vec![to]);
    }

    #[test]
    fn test_path_routes_around_obstacle() {
        let mut grid = NavGrid::new(50.0, 2.0);
        grid.block_circle(Vec3::ZERO, 10.0);

        let from = Vec3::new(-30.0, 0.0, 0.0);
        let to = Vec3::new(30.0, 0.0, 0.0);
        let path = grid.find_path(from, to);

        assert!(path.len() >= 2, "needs at least one detour corner: {path:?}");
        assert_eq!(path.last(), Some(&to));
        for corner in &path {
            assert!(flat_distance(*corner, Vec3::ZERO) > 10.0);
        }
    }

    #[test]
    fn test_unwalkable_destination_has_no_path() {
        let mut grid = NavGrid::new(50.0, 2.0);
        grid.block_circle(Vec3::ZERO, 6.0);

        assert!(grid.find_path(Vec3::new(-30.0, 0.0, 0.0), Vec3::ZERO).is_empty());
        // Outside the arena
        assert!(grid.find_path(Vec3::ZERO, Vec3::new(80.0, 0.0, 0.0)).is_empty());
    }

    #[test]
    fn test_enclosed_destination_has_no_path() {
        let mut grid = NavGrid::new(20.0, 2.0);
        // Ring of blocked cells around (11, 11)
        for z in 9..=13 {
            for x in 9..=13 {
                if x == 9 || x == 13 || z == 9 || z == 13 {
                    let index = grid.index((x, z));
                    grid.walkable[index] = false;
                }
            }
        }
        let inside = grid.center_of((11, 11));
        assert!(grid.find_path(Vec3::new(-15.0, 0.0, -15.0), inside).is_empty());
    }

    #[test]
    fn test_nearest_walkable() {
        let mut grid = NavGrid::new(50.0, 2.0);
        let free = Vec3::new(20.0, 1.0, 20.0);
        assert_eq!(grid.nearest_walkable(free, 1.0), Some(free));

        grid.block_circle(Vec3::ZERO, 5.0);
        let snapped = grid.nearest_walkable(Vec3::ZERO, 10.0).unwrap();
        assert!(flat_distance(snapped, Vec3::ZERO) > 5.0);

        // Too far from any free cell
        assert_eq!(grid.nearest_walkable(Vec3::ZERO, 2.0), None);
    }

    #[test]
    fn test_oversized_grid_is_capped() {
        let grid = NavGrid::new(1.0e6, 0.01);
        assert!(grid.in_bounds((MAX_GRID_SIDE - 1, MAX_GRID_SIDE - 1)));
        assert!(!grid.in_bounds((MAX_GRID_SIDE, 0)));
    }

    #[test]
    fn test_smooth_keeps_endpoints() {
        let grid = NavGrid::new(10.0, 1.0);
        let cells: Vec<Cell> = (0..8).map(|x| (x, 3)).collect();
        assert_eq!(grid.smooth(&cells), vec![(0, 3), (7, 3)]);
        assert!(grid.smooth(&[]).is_empty());
    }
}
