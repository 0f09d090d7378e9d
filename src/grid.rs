//! Cell grid for corridor generation
//!
//! A dense `rows × columns` array of [`CellState`], addressed by `(row, col)`.
//! Unlike the world tilemaps this grid does not wrap: every access is
//! bounds-checked and an out-of-range coordinate is a caller bug.

use serde::{Deserialize, Serialize};

/// State of a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellState {
    #[default]
    Grass,
    Path,
}

impl CellState {
    pub fn is_path(self) -> bool {
        self == CellState::Path
    }
}

/// A `(row, col)` coordinate, 0-indexed.
pub type Cell = (usize, usize);

/// The four orthogonal offsets in bitmask order: up, right, down, left.
pub const ORTHOGONAL: [(i32, i32); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// Row-major grid of cell states.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<CellState>,
}

impl Grid {
    /// Create an all-grass grid. Both dimensions must be positive.
    pub fn new(rows: usize, columns: usize) -> Self {
        assert!(rows > 0 && columns > 0, "grid must be non-empty, got {}x{}", rows, columns);
        Self {
            rows,
            columns,
            cells: vec![CellState::Grass; rows * columns],
        }
    }

    /// Build a grid with the given cells set to `Path`.
    pub fn with_path(rows: usize, columns: usize, path: &[Cell]) -> Self {
        let mut grid = Self::new(rows, columns);
        for &(row, col) in path {
            grid.set(row, col, CellState::Path);
        }
        grid
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn last_column(&self) -> usize {
        self.columns - 1
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.columns
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            self.in_bounds(row, col),
            "cell ({}, {}) outside {}x{} grid",
            row,
            col,
            self.rows,
            self.columns
        );
        row * self.columns + col
    }

    pub fn get(&self, row: usize, col: usize) -> CellState {
        self.cells[self.index(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, state: CellState) {
        let idx = self.index(row, col);
        self.cells[idx] = state;
    }

    pub fn is_path(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_path()
    }

    /// Like [`Grid::is_path`] but treats anything outside the grid as grass.
    pub fn is_path_at(&self, row: i32, col: i32) -> bool {
        row >= 0
            && col >= 0
            && self.in_bounds(row as usize, col as usize)
            && self.is_path(row as usize, col as usize)
    }

    /// Apply a signed offset, returning `None` when the result leaves the grid.
    pub fn offset(&self, (row, col): Cell, (dr, dc): (i32, i32)) -> Option<Cell> {
        let nr = row as i32 + dr;
        let nc = col as i32 + dc;
        if nr < 0 || nc < 0 {
            return None;
        }
        let (nr, nc) = (nr as usize, nc as usize);
        self.in_bounds(nr, nc).then_some((nr, nc))
    }

    /// In-bounds 4-connected neighbours in up, right, down, left order.
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        ORTHOGONAL.iter().filter_map(move |&delta| self.offset(cell, delta))
    }

    /// In-bounds 8-connected neighbours (excluding the cell itself).
    pub fn neighbors_8(&self, cell: Cell) -> Vec<Cell> {
        let mut result = Vec::with_capacity(8);
        for dr in -1i32..=1 {
            for dc in -1i32..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                if let Some(n) = self.offset(cell, (dr, dc)) {
                    result.push(n);
                }
            }
        }
        result
    }

    /// Iterate over all cells with their coordinates, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, CellState)> + '_ {
        let columns = self.columns;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, &state)| (idx / columns, idx % columns, state))
    }

    /// Coordinates of every path cell, row-major.
    pub fn path_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.iter()
            .filter(|&(_, _, state)| state.is_path())
            .map(|(row, col, _)| (row, col))
    }

    pub fn path_count(&self) -> usize {
        self.cells.iter().filter(|state| state.is_path()).count()
    }

    /// `#` for path, `.` for grass, one line per row.
    pub fn to_debug_string(&self) -> String {
        let mut out = String::with_capacity((self.columns + 1) * self.rows);
        for row in 0..self.rows {
            for col in 0..self.columns {
                out.push(if self.is_path(row, col) { '#' } else { '.' });
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_grass() {
        let grid = Grid::new(3, 4);
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.columns(), 4);
        assert_eq!(grid.path_count(), 0);
        assert!(grid.iter().all(|(_, _, s)| s == CellState::Grass));
    }

    #[test]
    fn test_set_and_get() {
        let mut grid = Grid::new(3, 3);
        grid.set(1, 2, CellState::Path);
        assert!(grid.is_path(1, 2));
        assert!(!grid.is_path(2, 1));
        assert_eq!(grid.path_cells().collect::<Vec<_>>(), vec![(1, 2)]);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_out_of_bounds_panics() {
        let grid = Grid::new(2, 2);
        grid.get(2, 0);
    }

    #[test]
    #[should_panic(expected = "non-empty")]
    fn test_zero_size_panics() {
        Grid::new(0, 5);
    }

    #[test]
    fn test_neighbors_clip_at_edges() {
        let grid = Grid::new(3, 3);
        let corner: Vec<_> = grid.neighbors((0, 0)).collect();
        assert_eq!(corner, vec![(0, 1), (1, 0)]);
        assert_eq!(grid.neighbors((1, 1)).count(), 4);
        assert_eq!(grid.neighbors_8((0, 0)).len(), 3);
        assert_eq!(grid.neighbors_8((1, 1)).len(), 8);
    }

    #[test]
    fn test_is_path_at_outside_is_grass() {
        let grid = Grid::with_path(2, 2, &[(0, 0)]);
        assert!(grid.is_path_at(0, 0));
        assert!(!grid.is_path_at(-1, 0));
        assert!(!grid.is_path_at(0, 2));
    }

    #[test]
    fn test_debug_string() {
        let grid = Grid::with_path(2, 3, &[(0, 0), (1, 2)]);
        assert_eq!(grid.to_debug_string(), "#..\n..#\n");
    }
}
