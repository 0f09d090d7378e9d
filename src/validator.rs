//! Structural checks for single-width corridors
//!
//! A walk step is accepted only if the corridor stays one tile wide:
//! - the target is inside the grid and not already path
//! - no 2×2 block becomes entirely path
//! - no two "generally straight" cells of the same orientation sit side by
//!   side (a horizontal run directly above another, or two vertical runs
//!   next to each other), which would render as a double-wide strip
//!
//! Checks run on a scratch copy with the move applied; the real grid is
//! only touched by the caller after acceptance.

use crate::bitmask::{is_generally_horizontal, is_generally_vertical};
use crate::grid::{Cell, CellState, Grid};

/// A broken structural rule found by [`find_violations`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Violation {
    /// The 2×2 block with this top-left cell is all path.
    SolidBlock(Cell),
    /// Two horizontal runs stacked vertically (upper cell first).
    DoubleHorizontal(Cell, Cell),
    /// Two vertical runs side by side (left cell first).
    DoubleVertical(Cell, Cell),
}

/// Check whether extending the corridor from `from` onto `to` keeps it well formed.
///
/// `to` is signed so off-grid candidates can be passed straight from a
/// direction offset; they are rejected.
pub fn is_move_valid(grid: &Grid, from: Cell, to: (i32, i32)) -> bool {
    debug_assert!(
        (from.0 as i32 - to.0).abs() + (from.1 as i32 - to.1).abs() == 1,
        "move {:?} -> {:?} is not orthogonal",
        from,
        to
    );

    let (tr, tc) = to;
    if tr < 0 || tc < 0 || !grid.in_bounds(tr as usize, tc as usize) {
        return false;
    }
    let target = (tr as usize, tc as usize);
    if grid.is_path(target.0, target.1) {
        return false;
    }

    let mut scratch = grid.clone();
    scratch.set(target.0, target.1, CellState::Path);

    let mut affected = Vec::with_capacity(9);
    affected.push(target);
    affected.extend(scratch.neighbors_8(target));

    affected.into_iter().all(|(row, col)| {
        !scratch.is_path(row, col)
            || (!forms_solid_block(&scratch, row, col) && !forms_double_straight(&scratch, row, col))
    })
}

/// Whether `(row, col)` is a corner of a 2×2 block that is entirely path.
pub fn forms_solid_block(grid: &Grid, row: usize, col: usize) -> bool {
    if !grid.is_path(row, col) {
        return false;
    }
    let (r, c) = (row as i32, col as i32);
    [(r, c), (r, c - 1), (r - 1, c), (r - 1, c - 1)]
        .into_iter()
        .any(|(tr, tc)| block_is_solid(grid, tr, tc))
}

fn block_is_solid(grid: &Grid, top: i32, left: i32) -> bool {
    if top < 0 || left < 0 {
        return false;
    }
    let (top, left) = (top as usize, left as usize);
    if top + 1 >= grid.rows() || left + 1 >= grid.columns() {
        return false;
    }
    grid.is_path(top, left)
        && grid.is_path(top, left + 1)
        && grid.is_path(top + 1, left)
        && grid.is_path(top + 1, left + 1)
}

/// Whether `(row, col)` is a straight run with a parallel straight run beside it.
pub fn forms_double_straight(grid: &Grid, row: usize, col: usize) -> bool {
    if !grid.is_path(row, col) {
        return false;
    }

    if is_generally_horizontal(grid, row, col) {
        if row > 0 && is_generally_horizontal(grid, row - 1, col) {
            return true;
        }
        if row + 1 < grid.rows() && is_generally_horizontal(grid, row + 1, col) {
            return true;
        }
    }

    if is_generally_vertical(grid, row, col) {
        if col > 0 && is_generally_vertical(grid, row, col - 1) {
            return true;
        }
        if col + 1 < grid.columns() && is_generally_vertical(grid, row, col + 1) {
            return true;
        }
    }

    false
}

/// Scan the whole grid for structural violations.
pub fn find_violations(grid: &Grid) -> Vec<Violation> {
    let mut found = Vec::new();
    for row in 0..grid.rows() {
        for col in 0..grid.columns() {
            if block_is_solid(grid, row as i32, col as i32) {
                found.push(Violation::SolidBlock((row, col)));
            }
            if row + 1 < grid.rows()
                && is_generally_horizontal(grid, row, col)
                && is_generally_horizontal(grid, row + 1, col)
            {
                found.push(Violation::DoubleHorizontal((row, col), (row + 1, col)));
            }
            if col + 1 < grid.columns()
                && is_generally_vertical(grid, row, col)
                && is_generally_vertical(grid, row, col + 1)
            {
                found.push(Violation::DoubleVertical((row, col), (row, col + 1)));
            }
        }
    }
    found
}
