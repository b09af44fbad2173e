//! Obstruction grid: which cells are blocked by existing footprints.
//!
//! Built once per planning call from the visible entities' footprints,
//! dilated by one cell, then consulted by the best-tile search as a strict
//! admissibility filter. Obstruction never mixes into friendliness scores.

use crate::grid::GridMap;
use crate::snapshot::MapGeometry;
use itertools::iproduct;
use serde::{Deserialize, Serialize};

const FREE: f32 = 0.0;
const BLOCKED: f32 = 1.0;
/// Marker for cells blocked by the current dilation pass, folded back to
/// `BLOCKED` before the pass finishes.
const FRESH: f32 = 2.0;

/// Neighbor offsets for the one-cell dilation.
const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
];

/// An obstruction footprint in world units.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ObstructionShape {
    Circle {
        x: f32,
        z: f32,
        radius: f32,
    },
    Square {
        x: f32,
        z: f32,
        half_width: f32,
        half_depth: f32,
    },
}

/// A grid marking cells blocked by existing footprints. Cell values are
/// presence flags, not accumulated magnitudes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObstructionGrid {
    cells: GridMap,
}

impl ObstructionGrid {
    /// An all-free grid at the snapshot's resolution.
    pub fn new(geometry: MapGeometry) -> Self {
        ObstructionGrid {
            cells: GridMap::new(geometry.width, geometry.height, geometry.cell_size),
        }
    }

    /// Build a grid and rasterize the given footprints into it.
    pub fn build(geometry: MapGeometry, shapes: &[ObstructionShape]) -> Self {
        let mut grid = ObstructionGrid::new(geometry);
        grid.rebuild(shapes);
        grid
    }

    /// Clear and re-rasterize, reusing the allocation.
    pub fn rebuild(&mut self, shapes: &[ObstructionShape]) {
        self.cells.clear();
        for shape in shapes {
            self.mark(shape);
        }
    }

    pub fn width(&self) -> u32 {
        self.cells.width()
    }

    pub fn height(&self) -> u32 {
        self.cells.height()
    }

    /// Mark every cell whose center falls inside the footprint. A shape
    /// always blocks at least the cell containing its own center, so tiny
    /// footprints cannot slip between cell centers.
    pub fn mark(&mut self, shape: &ObstructionShape) {
        match *shape {
            ObstructionShape::Circle { x, z, radius } => {
                let (x0, z0) = self.cells.world_to_grid(x - radius, z - radius);
                let (x1, z1) = self.cells.world_to_grid(x + radius, z + radius);
                let radius_sq = radius * radius;
                for (cz, cx) in iproduct!(z0..=z1, x0..=x1) {
                    if self.cells.checked_index(cx, cz).is_some() {
                        let (wx, wz) = self.cells.grid_to_world(cx as u32, cz as u32);
                        let dx = wx - x;
                        let dz = wz - z;
                        if dx * dx + dz * dz <= radius_sq {
                            self.cells.set(cx as u32, cz as u32, BLOCKED);
                        }
                    }
                }
            }
            ObstructionShape::Square {
                x,
                z,
                half_width,
                half_depth,
            } => {
                let (x0, z0) = self.cells.world_to_grid(x - half_width, z - half_depth);
                let (x1, z1) = self.cells.world_to_grid(x + half_width, z + half_depth);
                for (cz, cx) in iproduct!(z0..=z1, x0..=x1) {
                    if self.cells.checked_index(cx, cz).is_some() {
                        let (wx, wz) = self.cells.grid_to_world(cx as u32, cz as u32);
                        if (wx - x).abs() <= half_width && (wz - z).abs() <= half_depth {
                            self.cells.set(cx as u32, cz as u32, BLOCKED);
                        }
                    }
                }
            }
        }

        let (cx, cz) = match *shape {
            ObstructionShape::Circle { x, z, .. } | ObstructionShape::Square { x, z, .. } => {
                self.cells.world_to_grid(x, z)
            }
        };
        if self.cells.checked_index(cx, cz).is_some() {
            self.cells.set(cx as u32, cz as u32, BLOCKED);
        }
    }

    /// Directly block a single cell.
    pub fn block_cell(&mut self, x: u32, z: u32) {
        self.cells.set(x, z, BLOCKED);
    }

    /// Dilate blocked cells outward by one cell in all eight directions,
    /// buffering footprints so a non-zero-size unit placed on a free cell
    /// cannot clip an obstacle. Runs exactly once per planning call, before
    /// any best-tile search.
    pub fn expand(&mut self) {
        let width = self.cells.width() as i32;
        let height = self.cells.height() as i32;

        for (z, x) in iproduct!(0..height, 0..width) {
            if self.cells.get(x as u32, z as u32) != FREE {
                continue;
            }
            let touches_block = NEIGHBORS_8.iter().any(|&(dx, dz)| {
                self.cells.checked_index(x + dx, z + dz).is_some()
                    && self.cells.get((x + dx) as u32, (z + dz) as u32) == BLOCKED
            });
            if touches_block {
                self.cells.set(x as u32, z as u32, FRESH);
            }
        }

        for (z, x) in iproduct!(0..height as u32, 0..width as u32) {
            if self.cells.get(x, z) != FREE {
                self.cells.set(x, z, BLOCKED);
            }
        }
    }

    /// Whether a cell is blocked. Cells outside the grid count as blocked;
    /// footprints may not overhang the play area.
    #[inline]
    pub fn is_blocked(&self, x: i32, z: i32) -> bool {
        match self.cells.checked_index(x, z) {
            Some(_) => self.cells.get(x as u32, z as u32) != FREE,
            None => true,
        }
    }

    /// True when no blocked cell lies within Euclidean distance `radius`
    /// (grid cells) of `(x, z)`.
    pub fn is_clear(&self, x: u32, z: u32, radius: f32) -> bool {
        let radius = radius.max(0.0);
        let reach = radius.floor() as i32;
        let radius_sq = radius * radius;
        let x = x as i32;
        let z = z as i32;

        for (dz, dx) in iproduct!(-reach..=reach, -reach..=reach) {
            if ((dx * dx + dz * dz) as f32) > radius_sq {
                continue;
            }
            if self.is_blocked(x + dx, z + dz) {
                return false;
            }
        }
        true
    }
}
