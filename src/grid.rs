//! Dense scalar grids over the play area.
//!
//! `GridMap` is the influence-map primitive: a row-major `f32` grid with
//! point/radial influence injection, elementwise combination, and a
//! radius-constrained best-tile search. Radius tests are Euclidean in
//! grid-cell units, matching the circular obstruction footprints.

use crate::obstruction::ObstructionGrid;
use itertools::iproduct;
use serde::{Deserialize, Serialize};

/// Falloff shape applied when injecting influence around a center cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfluenceFalloff {
    /// Flat contribution everywhere within the radius.
    Constant,
    /// Full magnitude at the center, decaying to zero exactly at the radius.
    Linear,
}

/// Winning cell of a best-tile search.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BestTile {
    pub x: u32,
    pub z: u32,
    /// Flat row-major index of the cell.
    pub index: usize,
    pub score: f32,
}

/// A dense row-major scalar grid over the play area.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridMap {
    width: u32,
    height: u32,
    cell_size: f32,
    values: Vec<f32>,
}

impl GridMap {
    /// Create a zero-initialized grid of `width` x `height` cells,
    /// each covering `cell_size` world units per side.
    pub fn new(width: u32, height: u32, cell_size: f32) -> Self {
        GridMap {
            width,
            height,
            cell_size,
            values: vec![0.0; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Zero all cells, keeping the allocation.
    pub fn clear(&mut self) {
        for v in &mut self.values {
            *v = 0.0;
        }
    }

    #[inline]
    pub fn index_of(&self, x: u32, z: u32) -> usize {
        (z as usize) * (self.width as usize) + (x as usize)
    }

    /// Flat index for signed coordinates, or `None` when out of bounds.
    #[inline]
    pub fn checked_index(&self, x: i32, z: i32) -> Option<usize> {
        if x >= 0 && z >= 0 && (x as u32) < self.width && (z as u32) < self.height {
            Some(self.index_of(x as u32, z as u32))
        } else {
            None
        }
    }

    #[inline]
    pub fn get(&self, x: u32, z: u32) -> f32 {
        self.values[self.index_of(x, z)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, z: u32, value: f32) {
        let index = self.index_of(x, z);
        self.values[index] = value;
    }

    /// Grid cell containing a world position. Out-of-range positions map to
    /// out-of-range cells; injection and lookups clip them silently.
    #[inline]
    pub fn world_to_grid(&self, wx: f32, wz: f32) -> (i32, i32) {
        (
            (wx / self.cell_size).floor() as i32,
            (wz / self.cell_size).floor() as i32,
        )
    }

    /// Center of a grid cell, in world units.
    #[inline]
    pub fn grid_to_world(&self, x: u32, z: u32) -> (f32, f32) {
        (
            (x as f32 + 0.5) * self.cell_size,
            (z as f32 + 0.5) * self.cell_size,
        )
    }

    /// Add `magnitude` (shaped by `falloff`) to every cell within Euclidean
    /// grid distance `radius` of `(cx, cz)`. Negative magnitudes repel.
    /// The portion of the disc outside the grid is skipped without error.
    pub fn add_influence(
        &mut self,
        cx: i32,
        cz: i32,
        radius: f32,
        magnitude: f32,
        falloff: InfluenceFalloff,
    ) {
        if radius <= 0.0 {
            // A degenerate radius still touches the center cell.
            if let Some(index) = self.checked_index(cx, cz) {
                self.values[index] += magnitude;
            }
            return;
        }

        let reach = radius.ceil() as i32;
        let x0 = (cx - reach).max(0);
        let z0 = (cz - reach).max(0);
        let x1 = (cx + reach).min(self.width as i32 - 1);
        let z1 = (cz + reach).min(self.height as i32 - 1);
        if x0 > x1 || z0 > z1 {
            return;
        }

        let radius_sq = radius * radius;
        for (z, x) in iproduct!(z0..=z1, x0..=x1) {
            let dx = (x - cx) as f32;
            let dz = (z - cz) as f32;
            let dist_sq = dx * dx + dz * dz;
            if dist_sq > radius_sq {
                continue;
            }
            let amount = match falloff {
                InfluenceFalloff::Constant => magnitude,
                InfluenceFalloff::Linear => magnitude * (1.0 - dist_sq.sqrt() / radius),
            };
            let index = self.index_of(x as u32, z as u32);
            self.values[index] += amount;
        }
    }

    /// Flat unit influence within `radius` of `(cx, cz)`.
    pub fn add_presence(&mut self, cx: i32, cz: i32, radius: f32) {
        self.add_influence(cx, cz, radius, 1.0, InfluenceFalloff::Constant);
    }

    /// Elementwise sum of another grid of the same dimensions.
    pub fn add_grid(&mut self, other: &GridMap) {
        debug_assert_eq!(self.width, other.width);
        debug_assert_eq!(self.height, other.height);
        for (value, other_value) in self.values.iter_mut().zip(other.values.iter()) {
            *value += other_value;
        }
    }

    /// Highest-scoring cell whose `min_radius` Euclidean neighborhood is
    /// entirely unobstructed. Scan order is row-major with increasing index,
    /// so ties keep the first occurrence. `None` when no cell qualifies --
    /// a normal outcome for a built-out base, not a fault.
    pub fn find_best_tile(
        &self,
        min_radius: f32,
        obstructions: &ObstructionGrid,
    ) -> Option<BestTile> {
        let mut best: Option<BestTile> = None;

        for (index, &score) in self.values.iter().enumerate() {
            if let Some(current) = &best {
                if score <= current.score {
                    continue;
                }
            }
            let x = (index as u32) % self.width;
            let z = (index as u32) / self.width;
            if !obstructions.is_clear(x, z, min_radius) {
                continue;
            }
            best = Some(BestTile {
                x,
                z,
                index,
                score,
            });
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::MapGeometry;

    fn geometry(width: u32, height: u32) -> MapGeometry {
        MapGeometry {
            width,
            height,
            cell_size: 1.0,
        }
    }

    #[test]
    fn constant_influence_is_flat_within_radius() {
        let mut grid = GridMap::new(16, 16, 1.0);
        grid.add_influence(8, 8, 3.0, 5.0, InfluenceFalloff::Constant);

        assert_eq!(grid.get(8, 8), 5.0);
        assert_eq!(grid.get(11, 8), 5.0);
        assert_eq!(grid.get(12, 8), 0.0);
        // (10, 10) is at distance sqrt(8) < 3, (11, 10) at sqrt(13) > 3.
        assert_eq!(grid.get(10, 10), 5.0);
        assert_eq!(grid.get(11, 10), 0.0);
    }

    #[test]
    fn linear_influence_decays_to_zero_at_radius() {
        let mut grid = GridMap::new(16, 16, 1.0);
        grid.add_influence(8, 8, 4.0, 8.0, InfluenceFalloff::Linear);

        assert_eq!(grid.get(8, 8), 8.0);
        assert!((grid.get(10, 8) - 4.0).abs() < 1e-5);
        // Exactly at the boundary the contribution is zero.
        assert!(grid.get(12, 8).abs() < 1e-5);
        assert_eq!(grid.get(13, 8), 0.0);
    }

    #[test]
    fn influences_accumulate() {
        let mut grid = GridMap::new(16, 16, 1.0);
        grid.add_influence(4, 8, 6.0, 2.0, InfluenceFalloff::Constant);
        grid.add_influence(8, 8, 6.0, 3.0, InfluenceFalloff::Constant);

        assert_eq!(grid.get(6, 8), 5.0);
        grid.add_influence(6, 8, 2.0, -1.0, InfluenceFalloff::Constant);
        assert_eq!(grid.get(6, 8), 4.0);
    }

    #[test]
    fn grids_combine_elementwise() {
        let mut a = GridMap::new(8, 8, 1.0);
        let mut b = GridMap::new(8, 8, 1.0);
        a.add_influence(2, 2, 2.0, 3.0, InfluenceFalloff::Constant);
        b.add_influence(2, 2, 2.0, 4.0, InfluenceFalloff::Constant);
        b.add_influence(6, 6, 1.0, -2.0, InfluenceFalloff::Constant);

        a.add_grid(&b);
        assert_eq!(a.get(2, 2), 7.0);
        assert_eq!(a.get(6, 6), -2.0);
        assert_eq!(a.get(0, 7), 0.0);
    }

    #[test]
    fn out_of_bounds_injection_is_clipped() {
        let mut grid = GridMap::new(8, 8, 1.0);
        grid.add_influence(-20, -20, 3.0, 9.0, InfluenceFalloff::Constant);
        assert!(grid.values().iter().all(|&v| v == 0.0));

        // A disc straddling the edge only writes the in-bounds part.
        grid.add_influence(0, 0, 2.0, 1.0, InfluenceFalloff::Constant);
        assert_eq!(grid.get(0, 0), 1.0);
        assert_eq!(grid.get(2, 0), 1.0);
    }

    #[test]
    fn world_grid_round_trip_recovers_cell_center() {
        let grid = GridMap::new(32, 32, 4.0);
        let (x, z) = grid.world_to_grid(42.0, 13.0);
        assert_eq!((x, z), (10, 3));

        let (wx, wz) = grid.grid_to_world(10, 3);
        assert_eq!((wx, wz), (42.0, 14.0));
        // Repeating the conversion is idempotent.
        assert_eq!(grid.world_to_grid(wx, wz), (10, 3));
    }

    #[test]
    fn best_tile_prefers_highest_score_and_first_occurrence() {
        let mut grid = GridMap::new(8, 8, 1.0);
        let open = ObstructionGrid::new(geometry(8, 8));

        grid.set(2, 3, 4.0);
        grid.set(5, 6, 4.0);
        grid.set(4, 4, 2.0);

        let best = grid.find_best_tile(0.0, &open).unwrap();
        assert_eq!((best.x, best.z), (2, 3));
        assert_eq!(best.score, 4.0);
    }

    #[test]
    fn best_tile_respects_clearance() {
        let mut grid = GridMap::new(8, 8, 1.0);
        let mut obstructions = ObstructionGrid::new(geometry(8, 8));
        obstructions.block_cell(4, 4);

        grid.set(4, 4, 10.0);
        grid.set(5, 4, 8.0);
        grid.set(1, 1, 1.0);

        // The high scorer sits on a blocked cell; its neighbor is within
        // the clearance radius of the same block.
        let best = grid.find_best_tile(1.0, &obstructions).unwrap();
        assert_eq!((best.x, best.z), (1, 1));
    }

    #[test]
    fn best_tile_returns_none_when_everything_is_blocked() {
        let grid = GridMap::new(4, 4, 1.0);
        let mut obstructions = ObstructionGrid::new(geometry(4, 4));
        for z in 0..4 {
            for x in 0..4 {
                obstructions.block_cell(x, z);
            }
        }
        assert!(grid.find_best_tile(0.0, &obstructions).is_none());
    }
}
