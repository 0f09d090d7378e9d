//! Post-walk cleanup of the corridor
//!
//! Two passes, repeated until nothing changes:
//! 1. Connectivity: flood-fill from the start cell and revert every path
//!    cell it does not reach.
//! 2. Shape: revert every interior path cell whose bitmask has no sprite.
//!    The first and last columns are exempt since they always draw as a
//!    horizontal straight.
//!
//! Removing a stub changes its neighbours' masks and can cut the corridor,
//! so the passes alternate until the shape pass removes nothing. The result
//! is a fixed point: repairing a repaired grid is a no-op.

use std::collections::VecDeque;

use thiserror::Error;

use crate::bitmask::bitmask_at;
use crate::grid::{Cell, CellState, Grid};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairError {
    #[error("start cell ({row}, {col}) is no longer part of the path")]
    StartLost { row: usize, col: usize },
}

/// Cells removed by each pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub disconnected_removed: usize,
    pub shapes_removed: usize,
    pub rounds: usize,
}

impl RepairReport {
    pub fn total_removed(&self) -> usize {
        self.disconnected_removed + self.shapes_removed
    }
}

/// Flood-fill over path cells from `start`. Returns a row-major reach mask.
pub fn reachable_from(grid: &Grid, start: Cell) -> Vec<bool> {
    let columns = grid.columns();
    let mut reached = vec![false; grid.rows() * columns];
    if !grid.is_path(start.0, start.1) {
        return reached;
    }

    let mut queue = VecDeque::new();
    reached[start.0 * columns + start.1] = true;
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        for (nr, nc) in grid.neighbors(cell) {
            let idx = nr * columns + nc;
            if grid.is_path(nr, nc) && !reached[idx] {
                reached[idx] = true;
                queue.push_back((nr, nc));
            }
        }
    }

    reached
}

/// Stage 1: revert path cells not connected to `start`.
pub fn prune_disconnected(grid: &mut Grid, start: Cell) -> Result<usize, RepairError> {
    if !grid.is_path(start.0, start.1) {
        return Err(RepairError::StartLost {
            row: start.0,
            col: start.1,
        });
    }

    let reached = reachable_from(grid, start);
    let columns = grid.columns();
    let stray: Vec<Cell> = grid
        .path_cells()
        .filter(|&(row, col)| !reached[row * columns + col])
        .collect();

    for &(row, col) in &stray {
        grid.set(row, col, CellState::Grass);
    }
    Ok(stray.len())
}

/// Stage 2: revert interior path cells without a renderable shape.
///
/// Decisions are taken against the grid as it was when the pass started.
pub fn prune_unrenderable(grid: &mut Grid) -> usize {
    let last = grid.last_column();
    let stubs: Vec<Cell> = grid
        .path_cells()
        .filter(|&(_, col)| col != 0 && col != last)
        .filter(|&(row, col)| !bitmask_at(grid, row, col).is_renderable())
        .collect();

    for &(row, col) in &stubs {
        grid.set(row, col, CellState::Grass);
    }
    stubs.len()
}

/// Clean the walked grid in place until it is connected and fully renderable.
pub fn repair_path(grid: &mut Grid, start: Cell) -> Result<RepairReport, RepairError> {
    let mut report = RepairReport::default();
    loop {
        report.rounds += 1;
        report.disconnected_removed += prune_disconnected(grid, start)?;

        let removed = prune_unrenderable(grid);
        report.shapes_removed += removed;
        tracing::trace!(round = report.rounds, removed, "shape pass");
        if removed == 0 {
            return Ok(report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prunes_disconnected_fragment() {
        let mut grid = Grid::with_path(5, 5, &[(2, 0), (2, 1), (2, 2), (2, 3), (2, 4), (0, 0), (0, 1)]);
        let removed = prune_disconnected(&mut grid, (2, 0)).unwrap();
        assert_eq!(removed, 2);
        assert!(!grid.is_path(0, 0));
        assert!(!grid.is_path(0, 1));
        assert_eq!(grid.path_count(), 5);
    }

    #[test]
    fn test_start_lost_fails() {
        let mut grid = Grid::with_path(3, 3, &[(1, 1)]);
        assert_eq!(repair_path(&mut grid, (1, 0)), Err(RepairError::StartLost { row: 1, col: 0 }));
        // nothing was touched
        assert!(grid.is_path(1, 1));
    }

    #[test]
    fn test_removes_bitmask_seven() {
        // (2,2) has up, right and down arms: mask 7 has no sprite
        let mut grid = Grid::with_path(5, 5, &[(1, 2), (2, 2), (3, 2), (2, 3)]);
        assert_eq!(bitmask_at(&grid, 2, 2).bits(), 7);
        prune_unrenderable(&mut grid);
        assert!(!grid.is_path(2, 2));
    }

    #[test]
    fn test_edge_columns_are_exempt() {
        // dead ends on both edge columns survive the shape pass
        let mut grid = Grid::with_path(3, 4, &[(1, 0), (1, 1), (1, 2), (1, 3)]);
        assert_eq!(prune_unrenderable(&mut grid), 0);
        assert_eq!(grid.path_count(), 4);
    }

    #[test]
    fn test_dead_end_spur_is_removed() {
        // corridor along row 2 with a one-cell spur at (1,2)
        let mut grid = Grid::with_path(4, 5, &[(2, 0), (2, 1), (2, 2), (2, 3), (2, 4), (1, 2)]);
        let report = repair_path(&mut grid, (2, 0)).unwrap();
        assert!(!grid.is_path(1, 2));
        assert_eq!(report.shapes_removed, 1);
        assert_eq!(report.rounds, 2);
        // (2,2) had mask 11 (TeeUp) before the spur went, now it is straight
        assert!(grid.is_path(2, 2));
    }

    #[test]
    fn test_cascade_reaches_fixed_point() {
        // a hooked tail hanging off the corridor, pruned one cell per round
        let mut grid = Grid::with_path(5, 5, &[(3, 0), (3, 1), (3, 2), (3, 3), (3, 4), (2, 2), (1, 2), (1, 3)]);
        let report = repair_path(&mut grid, (3, 0)).unwrap();
        assert!(report.rounds >= 2);
        for (row, col) in grid.path_cells() {
            if col != 0 && col != grid.last_column() {
                assert!(bitmask_at(&grid, row, col).is_renderable(), "({}, {})", row, col);
            }
        }
        let before = grid.clone();
        let second = repair_path(&mut grid, (3, 0)).unwrap();
        assert_eq!(second.total_removed(), 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_reachable_from_grass_is_empty() {
        let grid = Grid::with_path(3, 3, &[(0, 0)]);
        assert!(reachable_from(&grid, (1, 1)).iter().all(|&r| !r));
    }
}
