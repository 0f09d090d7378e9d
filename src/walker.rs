//! Weighted random walk that lays down the corridor
//!
//! The walk grows the path one orthogonal step at a time from the start
//! cell toward the last column. Each step weighs the four directions,
//! favouring rightward progress and penalising leftward moves, moves that
//! hug the top or bottom rows, and backtracking. Moves are tried in a
//! weight-biased random order and the first one the structural validator
//! accepts is committed.
//!
//! If the walk stalls short of the last column an edge-reinforcement pass
//! pushes the head straight toward the target edge, drifting toward a soft
//! target row.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::grid::{Cell, CellState, Grid};
use crate::validator::is_move_valid;

const RIGHT: (i32, i32) = (0, 1);
const DOWN: (i32, i32) = (1, 0);
const UP: (i32, i32) = (-1, 0);
const LEFT: (i32, i32) = (0, -1);

/// Candidate directions, in the order they are expanded before shuffling.
const CANDIDATES: [(i32, i32); 4] = [RIGHT, DOWN, UP, LEFT];

/// Inputs that steer a walk.
#[derive(Clone, Debug)]
pub struct WalkParams {
    /// Column the head must reach (the last column).
    pub target_col: usize,
    /// Interior row the reinforcement pass drifts toward.
    pub target_row: usize,
    /// Rows near the top and bottom that vertical moves are discouraged from entering.
    pub edge_buffer: usize,
    /// Keep walking until at least this many cells are placed.
    pub min_length: usize,
    /// Upper bound on weighted steps.
    pub max_steps: usize,
    /// Upper bound on reinforcement steps.
    pub reinforce_budget: usize,
}

impl WalkParams {
    /// Budgets scaled to the grid: five steps per cell for the walk and two
    /// per column for reinforcement.
    pub fn for_grid(grid: &Grid, target_row: usize, edge_buffer: usize, min_length: usize) -> Self {
        Self {
            target_col: grid.last_column(),
            target_row,
            edge_buffer,
            min_length,
            max_steps: grid.rows() * grid.columns() * 5,
            reinforce_budget: grid.columns() * 2,
        }
    }
}

/// How the weighted walk ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkEnd {
    /// Target column reached with enough length.
    Complete,
    /// No candidate move was valid.
    Stalled,
    /// Ran out of steps.
    BudgetExhausted,
}

/// Summary of a walk plus any reinforcement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WalkOutcome {
    pub head: Cell,
    pub length: usize,
    pub steps: usize,
    pub reinforce_steps: usize,
    pub end: WalkEnd,
    pub reached_target: bool,
}

/// Random-walk state: the head, the placed length and every cell visited so far.
pub struct PathWalker {
    head: Cell,
    length: usize,
    columns: usize,
    visited: Vec<bool>,
}

impl PathWalker {
    /// Place the first path cell and start a walk from it.
    pub fn start(grid: &mut Grid, start: Cell) -> Self {
        grid.set(start.0, start.1, CellState::Path);
        let mut visited = vec![false; grid.rows() * grid.columns()];
        visited[start.0 * grid.columns() + start.1] = true;
        Self {
            head: start,
            length: 1,
            columns: grid.columns(),
            visited,
        }
    }

    pub fn head(&self) -> Cell {
        self.head
    }

    pub fn length(&self) -> usize {
        self.length
    }

    fn was_visited(&self, (row, col): (i32, i32)) -> bool {
        row >= 0
            && col >= 0
            && (col as usize) < self.columns
            && self
                .visited
                .get(row as usize * self.columns + col as usize)
                .copied()
                .unwrap_or(false)
    }

    fn target_of(&self, (dr, dc): (i32, i32)) -> (i32, i32) {
        (self.head.0 as i32 + dr, self.head.1 as i32 + dc)
    }

    /// Selection weight of a move from the current head. Always at least 1.
    pub fn move_weight(&self, grid: &Grid, params: &WalkParams, delta: (i32, i32)) -> u32 {
        let (dr, dc) = delta;
        let (next_row, _) = self.target_of(delta);
        let mut weight: i32 = 1;

        if dc > 0 {
            weight += 5;
        } else if dc < 0 {
            weight -= 2;
        }

        let buffer = params.edge_buffer as i32;
        let bottom = grid.rows() as i32 - 1 - buffer;
        if dr != 0 && (next_row <= buffer || next_row >= bottom) {
            weight -= 1;
        }

        if dc < 0 && self.was_visited(self.target_of(delta)) {
            weight -= 3;
        }

        weight.max(1) as u32
    }

    /// Directions in weight-biased random order, each listed once.
    ///
    /// Every direction is repeated `weight` times, the list is shuffled and
    /// the first occurrence of each direction fixes its position.
    fn weighted_order(&self, grid: &Grid, params: &WalkParams, rng: &mut ChaCha8Rng) -> Vec<(i32, i32)> {
        let mut expanded = Vec::with_capacity(16);
        for delta in CANDIDATES {
            let weight = self.move_weight(grid, params, delta);
            expanded.extend(std::iter::repeat(delta).take(weight as usize));
        }
        expanded.shuffle(rng);

        let mut order = Vec::with_capacity(CANDIDATES.len());
        for delta in expanded {
            if !order.contains(&delta) {
                order.push(delta);
            }
        }
        order
    }

    /// Commit the first structurally valid move among `moves`.
    fn try_moves(&mut self, grid: &mut Grid, moves: &[(i32, i32)]) -> bool {
        for &delta in moves {
            let target = self.target_of(delta);
            if is_move_valid(grid, self.head, target) {
                let cell = (target.0 as usize, target.1 as usize);
                grid.set(cell.0, cell.1, CellState::Path);
                self.visited[cell.0 * self.columns + cell.1] = true;
                self.head = cell;
                self.length += 1;
                return true;
            }
        }
        false
    }

    /// Run the weighted walk until the head reaches the target column with
    /// enough length, no move is valid, or the step budget runs out.
    pub fn walk(&mut self, grid: &mut Grid, params: &WalkParams, rng: &mut ChaCha8Rng) -> (WalkEnd, usize) {
        let mut steps = 0;
        while self.head.1 < params.target_col || self.length < params.min_length {
            if steps >= params.max_steps {
                return (WalkEnd::BudgetExhausted, steps);
            }
            steps += 1;

            let order = self.weighted_order(grid, params, rng);
            if !self.try_moves(grid, &order) {
                tracing::trace!(head = ?self.head, length = self.length, steps, "walk stalled");
                return (WalkEnd::Stalled, steps);
            }
        }
        (WalkEnd::Complete, steps)
    }

    /// Push the head toward the target column using only rightward moves
    /// and a single vertical step toward the target row.
    pub fn reinforce_edge(&mut self, grid: &mut Grid, params: &WalkParams, rng: &mut ChaCha8Rng) -> usize {
        let mut steps = 0;
        while self.head.1 < params.target_col && steps < params.reinforce_budget {
            steps += 1;

            let mut moves = vec![RIGHT];
            if self.head.0 < params.target_row {
                moves.push(DOWN);
            } else if self.head.0 > params.target_row {
                moves.push(UP);
            }
            moves.shuffle(rng);

            if !self.try_moves(grid, &moves) {
                tracing::trace!(head = ?self.head, steps, "edge reinforcement stalled");
                break;
            }
        }
        steps
    }

    /// Walk, then reinforce if the head is still short of the target column.
    pub fn run(mut self, grid: &mut Grid, params: &WalkParams, rng: &mut ChaCha8Rng) -> WalkOutcome {
        let (end, steps) = self.walk(grid, params, rng);
        let reinforce_steps = if self.head.1 < params.target_col {
            self.reinforce_edge(grid, params, rng)
        } else {
            0
        };
        WalkOutcome {
            head: self.head,
            length: self.length,
            steps,
            reinforce_steps,
            end,
            reached_target: self.head.1 == params.target_col,
        }
    }
}
