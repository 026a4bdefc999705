//! Uniform spatial hash grid.

use std::hash::Hash;

use ahash::{AHashMap, AHashSet};
use smallvec::SmallVec;
use tumble_core::Rect;

use super::Collider;
use crate::constants::DEFAULT_CELL_SIZE;

/// Pack signed cell coordinates into one key: `x` in the high 32 bits, `y`
/// in the low 32 bits.
pub fn cell_key(x: i32, y: i32) -> u64 {
    ((x as u32 as u64) << 32) | (y as u32 as u64)
}

/// Hash grid mapping cells to the items overlapping them
#[derive(Debug, Clone)]
pub struct SpatialHashGrid<T = Collider> {
    cell_size: f32,
    cells: AHashMap<u64, SmallVec<[T; 4]>>,
}

impl<T: Copy + Eq + Hash> SpatialHashGrid<T> {
    /// Invalid sizes (non-positive or NaN) fall back to the default cell size
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: Self::sanitize(cell_size),
            cells: AHashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Change the cell size; clears the grid
    pub fn set_cell_size(&mut self, cell_size: f32) {
        self.cell_size = Self::sanitize(cell_size);
        self.clear();
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Number of occupied cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Store `item` in every cell its bounds overlap
    pub fn insert(&mut self, item: T, bounds: &Rect) {
        let (min_x, min_y, max_x, max_y) = self.cell_range(bounds);
        for x in min_x..=max_x {
            for y in min_y..=max_y {
                self.cells.entry(cell_key(x, y)).or_default().push(item);
            }
        }
    }

    /// Items stored in any cell overlapped by `area`, each reported once
    pub fn query(&self, area: &Rect) -> Vec<T> {
        let (min_x, min_y, max_x, max_y) = self.cell_range(area);
        let mut seen = AHashSet::new();
        let mut found = Vec::new();

        for x in min_x..=max_x {
            for y in min_y..=max_y {
                let Some(cell) = self.cells.get(&cell_key(x, y)) else {
                    continue;
                };
                for &item in cell {
                    if seen.insert(item) {
                        found.push(item);
                    }
                }
            }
        }

        found
    }

    fn cell_range(&self, bounds: &Rect) -> (i32, i32, i32, i32) {
        let min_x = (bounds.x / self.cell_size).floor() as i32;
        let min_y = (bounds.y / self.cell_size).floor() as i32;
        let max_x = (bounds.right() / self.cell_size).floor() as i32;
        let max_y = (bounds.bottom() / self.cell_size).floor() as i32;
        (min_x, min_y, max_x.max(min_x), max_y.max(min_y))
    }

    fn sanitize(cell_size: f32) -> f32 {
        if cell_size > 0.0 && cell_size.is_finite() {
            cell_size
        } else {
            log::warn!("Invalid cell size {cell_size}, using {DEFAULT_CELL_SIZE}");
            DEFAULT_CELL_SIZE
        }
    }
}

impl<T: Copy + Eq + Hash> Default for SpatialHashGrid<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_key_packing() {
        assert_eq!(cell_key(0, 0), 0);
        assert_eq!(cell_key(1, 2), (1 << 32) | 2);
        assert_eq!(cell_key(-1, 0), 0xFFFF_FFFF_0000_0000);
        assert_ne!(cell_key(1, -1), cell_key(-1, 1));
    }

    #[test]
    fn test_multi_cell_item_reported_once() {
        let mut grid = SpatialHashGrid::new(10.0);
        grid.insert(1_u32, &Rect::new(0.0, 0.0, 35.0, 35.0));
        grid.insert(2_u32, &Rect::new(100.0, 100.0, 5.0, 5.0));

        assert_eq!(grid.cell_count(), 17);
        assert_eq!(grid.query(&Rect::new(0.0, 0.0, 40.0, 40.0)), vec![1]);
        assert_eq!(grid.query(&Rect::new(95.0, 95.0, 10.0, 10.0)), vec![2]);
        assert!(grid.query(&Rect::new(50.0, 50.0, 5.0, 5.0)).is_empty());
    }

    #[test]
    fn test_negative_coordinates() {
        let mut grid = SpatialHashGrid::new(16.0);
        grid.insert(7_u8, &Rect::new(-20.0, -20.0, 8.0, 8.0));
        assert_eq!(grid.query(&Rect::new(-18.0, -18.0, 1.0, 1.0)), vec![7]);
        assert!(grid.query(&Rect::new(2.0, 2.0, 1.0, 1.0)).is_empty());
    }

    #[test]
    fn test_set_cell_size_clears() {
        let mut grid = SpatialHashGrid::new(32.0);
        grid.insert(1_u32, &Rect::new(0.0, 0.0, 1.0, 1.0));
        grid.set_cell_size(64.0);
        assert!(grid.is_empty());
        assert_eq!(grid.cell_size(), 64.0);

        grid.set_cell_size(0.0);
        assert_eq!(grid.cell_size(), DEFAULT_CELL_SIZE);
    }
}
