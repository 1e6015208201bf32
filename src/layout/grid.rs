//! Spatial Grid
//!
//! Uniform 3D bucketing of node positions. Repulsion only tests pairs
//! whose cells are within `reach` of each other on every axis.

use std::collections::HashMap;

use crate::core::Vec3;

/// Integer cell coordinate.
pub type CellKey = (i32, i32, i32);

/// Node indices bucketed by cell.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<CellKey, Vec<usize>>,
}

impl SpatialGrid {
    /// Create an empty grid.
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    /// Edge length of a cell.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Empty the grid, optionally switching cell size.
    pub fn reset(&mut self, cell_size: f32) {
        self.cell_size = cell_size;
        self.cells.clear();
    }

    /// Cell containing `p`.
    #[inline]
    pub fn cell_of(&self, p: Vec3) -> CellKey {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
            (p.z / self.cell_size).floor() as i32,
        )
    }

    /// Bucket a node. Indices keep insertion order within a cell.
    pub fn insert(&mut self, index: usize, p: Vec3) {
        let key = self.cell_of(p);
        self.cells.entry(key).or_default().push(index);
    }

    /// Number of non-empty cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Indices in every cell within `reach` of `cell`, including itself.
    ///
    /// Cells are visited in a fixed order, so results are deterministic.
    pub fn neighbors(&self, cell: CellKey, reach: i32) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy, cz) = cell;
        (-reach..=reach)
            .flat_map(move |dx| {
                (-reach..=reach).flat_map(move |dy| {
                    (-reach..=reach).map(move |dz| (cx + dx, cy + dy, cz + dz))
                })
            })
            .filter_map(move |key| self.cells.get(&key))
            .flat_map(|bin| bin.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_of_floors_negative() {
        let grid = SpatialGrid::new(50.0);
        assert_eq!(grid.cell_of(Vec3::new(0.0, 49.9, 50.0)), (0, 0, 1));
        assert_eq!(grid.cell_of(Vec3::new(-0.1, -50.0, -50.1)), (-1, -1, -2));
    }

    #[test]
    fn test_neighbors_reach() {
        let mut grid = SpatialGrid::new(10.0);
        grid.insert(0, Vec3::new(1.0, 1.0, 1.0));
        grid.insert(1, Vec3::new(11.0, -9.0, 1.0)); // (1, -1, 0)
        grid.insert(2, Vec3::new(25.0, 1.0, 1.0)); // (2, 0, 0)
        grid.insert(3, Vec3::new(2.0, 2.0, 2.0));

        let mut near: Vec<usize> = grid.neighbors((0, 0, 0), 1).collect();
        near.sort_unstable();
        assert_eq!(near, vec![0, 1, 3]);

        let mut far: Vec<usize> = grid.neighbors((0, 0, 0), 2).collect();
        far.sort_unstable();
        assert_eq!(far, vec![0, 1, 2, 3]);

        assert_eq!(grid.occupied_cells(), 3);
    }

    #[test]
    fn test_reset() {
        let mut grid = SpatialGrid::new(10.0);
        grid.insert(0, Vec3::ZERO);
        grid.reset(20.0);

        assert_eq!(grid.occupied_cells(), 0);
        assert_eq!(grid.cell_size(), 20.0);
        assert_eq!(grid.neighbors((0, 0, 0), 1).count(), 0);
    }
}
