//! Neighbour bitmasks for corridor autotiling
//!
//! Each path cell is classified by which of its four orthogonal neighbours
//! are also path: bit 0 = up, bit 1 = right, bit 2 = down, bit 3 = left.
//! Bitmasks are derived on demand and never stored in the grid.

use std::fmt;

use crate::grid::Grid;

/// A 4-bit neighbour mask in `0..=15`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bitmask(u8);

impl Bitmask {
    pub const UP: u8 = 1;
    pub const RIGHT: u8 = 2;
    pub const DOWN: u8 = 4;
    pub const LEFT: u8 = 8;

    pub const HORIZONTAL: Bitmask = Bitmask(Self::LEFT | Self::RIGHT);
    pub const VERTICAL: Bitmask = Bitmask(Self::UP | Self::DOWN);

    /// Direction bits in the same order as [`crate::grid::ORTHOGONAL`].
    pub const DIRECTION_BITS: [u8; 4] = [Self::UP, Self::RIGHT, Self::DOWN, Self::LEFT];

    pub fn new(bits: u8) -> Self {
        assert!(bits < 16, "bitmask out of range: {}", bits);
        Self(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn has(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    /// Number of connected arms.
    pub fn arms(self) -> u32 {
        self.0.count_ones()
    }

    /// Connected both left and right.
    pub fn is_generally_horizontal(self) -> bool {
        self.has(Self::LEFT) && self.has(Self::RIGHT)
    }

    /// Connected both up and down.
    pub fn is_generally_vertical(self) -> bool {
        self.has(Self::UP) && self.has(Self::DOWN)
    }

    /// Whether a directional sprite exists for this shape.
    pub fn is_renderable(self) -> bool {
        RENDERABLE_SHAPES.contains(&self.0)
    }
}

impl fmt::Display for Bitmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The ten shapes with a sprite: two straights, four corners,
/// three T-junctions and the cross. 7 (up+right+down) has no sprite.
pub const RENDERABLE_SHAPES: [u8; 10] = [3, 5, 6, 9, 10, 11, 12, 13, 14, 15];

/// Compute the neighbour mask of `(row, col)`. Cells outside the grid count as grass.
pub fn bitmask_at(grid: &Grid, row: usize, col: usize) -> Bitmask {
    let (r, c) = (row as i32, col as i32);
    let mut bits = 0;
    if grid.is_path_at(r - 1, c) {
        bits |= Bitmask::UP;
    }
    if grid.is_path_at(r, c + 1) {
        bits |= Bitmask::RIGHT;
    }
    if grid.is_path_at(r + 1, c) {
        bits |= Bitmask::DOWN;
    }
    if grid.is_path_at(r, c - 1) {
        bits |= Bitmask::LEFT;
    }
    Bitmask(bits)
}

/// Path cell whose mask has both left and right arms.
pub fn is_generally_horizontal(grid: &Grid, row: usize, col: usize) -> bool {
    grid.in_bounds(row, col)
        && grid.is_path(row, col)
        && bitmask_at(grid, row, col).is_generally_horizontal()
}

/// Path cell whose mask has both up and down arms.
pub fn is_generally_vertical(grid: &Grid, row: usize, col: usize) -> bool {
    grid.in_bounds(row, col)
        && grid.is_path(row, col)
        && bitmask_at(grid, row, col).is_generally_vertical()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolated_cell_has_empty_mask() {
        let grid = Grid::with_path(3, 3, &[(1, 1)]);
        assert_eq!(bitmask_at(&grid, 1, 1).bits(), 0);
    }

    #[test]
    fn test_each_direction_sets_its_bit() {
        let grid = Grid::with_path(3, 3, &[(0, 1), (1, 2), (2, 1), (1, 0)]);
        assert_eq!(bitmask_at(&grid, 1, 1).bits(), 15);

        let up = Grid::with_path(3, 3, &[(0, 1)]);
        assert_eq!(bitmask_at(&up, 1, 1).bits(), Bitmask::UP);
        let right = Grid::with_path(3, 3, &[(1, 2)]);
        assert_eq!(bitmask_at(&right, 1, 1).bits(), Bitmask::RIGHT);
        let down = Grid::with_path(3, 3, &[(2, 1)]);
        assert_eq!(bitmask_at(&down, 1, 1).bits(), Bitmask::DOWN);
        let left = Grid::with_path(3, 3, &[(1, 0)]);
        assert_eq!(bitmask_at(&left, 1, 1).bits(), Bitmask::LEFT);
    }

    #[test]
    fn test_edges_contribute_nothing() {
        let grid = Grid::with_path(2, 2, &[(0, 0), (0, 1)]);
        assert_eq!(bitmask_at(&grid, 0, 0).bits(), Bitmask::RIGHT);
        assert_eq!(bitmask_at(&grid, 0, 1).bits(), Bitmask::LEFT);
    }

    #[test]
    fn test_renderable_set() {
        let renderable: Vec<u8> = (0..16).filter(|&b| Bitmask::new(b).is_renderable()).collect();
        assert_eq!(renderable, vec![3, 5, 6, 9, 10, 11, 12, 13, 14, 15]);
        for stub in [0, 1, 2, 4, 7, 8] {
            assert!(!Bitmask::new(stub).is_renderable());
        }
    }

    #[test]
    fn test_general_orientation() {
        let grid = Grid::with_path(3, 3, &[(1, 0), (1, 1), (1, 2)]);
        assert!(is_generally_horizontal(&grid, 1, 1));
        assert!(!is_generally_vertical(&grid, 1, 1));
        assert!(!is_generally_horizontal(&grid, 1, 0));
        assert!(!is_generally_horizontal(&grid, 0, 1));
        assert!(Bitmask::new(11).is_generally_horizontal());
        assert!(Bitmask::new(13).is_generally_vertical());
    }
}
