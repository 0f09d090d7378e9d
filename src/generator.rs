//! Corridor generation entry point
//!
//! One call runs one attempt:
//! seed → place start → weighted walk → edge reinforcement (if short) →
//! repair → re-trace → scatter features.
//!
//! Failure is an ordinary outcome. Callers retry with a different seed;
//! nothing in here retries.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{Cell, Grid};
use crate::params::{PathParams, ScatterBands};
use crate::repair::{repair_path, RepairError, RepairReport};
use crate::tiles::{tile_for, TileId};
use crate::walker::{PathWalker, WalkEnd, WalkParams};

/// Edge of the map the corridor starts from. It always exits on the right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartEdge {
    Left,
    Top,
    Bottom,
}

impl StartEdge {
    pub const ALL: [StartEdge; 3] = [StartEdge::Left, StartEdge::Top, StartEdge::Bottom];

    pub fn name(&self) -> &'static str {
        match self {
            StartEdge::Left => "left",
            StartEdge::Top => "top",
            StartEdge::Bottom => "bottom",
        }
    }

    /// Pick a start cell on this edge, away from the corners.
    fn pick_cell(self, rows: usize, columns: usize, rng: &mut ChaCha8Rng) -> Cell {
        match self {
            StartEdge::Left => (rng.gen_range(1..=rows - 2), 0),
            StartEdge::Top => (0, rng.gen_range(1..=columns - 2)),
            StartEdge::Bottom => (rows - 1, rng.gen_range(1..=columns - 2)),
        }
    }
}

/// Decorative feature kinds scattered on grass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Tree,
    Rock,
    Bonus,
}

impl FeatureKind {
    pub fn name(&self) -> &'static str {
        match self {
            FeatureKind::Tree => "tree",
            FeatureKind::Rock => "rock",
            FeatureKind::Bonus => "bonus",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Feature {
    pub kind: FeatureKind,
    pub row: usize,
    pub col: usize,
}

/// Why an attempt produced no corridor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationFailure {
    #[error("walk stopped at column {head_col}, short of column {target_col}")]
    WalkStalled { head_col: usize, target_col: usize },
    #[error("walk placed {length} cells, fewer than the minimum {minimum}")]
    TooShort { length: usize, minimum: usize },
    #[error("repair failed: {0}")]
    StartLost(#[from] RepairError),
    #[error("cleaned corridor no longer reaches the last column")]
    ExitUnreachable,
    #[error("cleaned corridor has {length} cells, needs at least {required}")]
    TraceTooShort { length: usize, required: f64 },
}

impl GenerationFailure {
    /// Short label for tallying failures.
    pub fn reason(&self) -> &'static str {
        match self {
            GenerationFailure::WalkStalled { .. } => "walk stalled",
            GenerationFailure::TooShort { .. } => "too short",
            GenerationFailure::StartLost(_) => "start lost",
            GenerationFailure::ExitUnreachable => "exit unreachable",
            GenerationFailure::TraceTooShort { .. } => "trace too short",
        }
    }
}

/// Diagnostics for a successful attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttemptStats {
    pub walk_length: usize,
    pub walk_steps: usize,
    pub reinforce_steps: usize,
    pub walk_end: WalkEnd,
    pub repair: RepairReport,
}

/// A finished corridor map.
#[derive(Clone, Debug, PartialEq)]
pub struct PathLayout {
    pub grid: Grid,
    pub start_edge: StartEdge,
    pub start: Cell,
    /// Cells in rightward-preferring breadth-first order from the start.
    pub trace: Vec<Cell>,
    pub seed: u64,
    pub features: Vec<Feature>,
    pub stats: AttemptStats,
}

impl PathLayout {
    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn columns(&self) -> usize {
        self.grid.columns()
    }

    pub fn tile_at(&self, row: usize, col: usize) -> TileId {
        tile_for(&self.grid, row, col)
    }

    pub fn path_cell_count(&self) -> usize {
        self.grid.path_count()
    }

    pub fn feature_at(&self, row: usize, col: usize) -> Option<FeatureKind> {
        self.features
            .iter()
            .find(|f| f.row == row && f.col == col)
            .map(|f| f.kind)
    }

    /// Whether something already occupies the cell (corridor or feature).
    pub fn is_blocked(&self, row: usize, col: usize) -> bool {
        self.grid.is_path(row, col) || self.feature_at(row, col).is_some()
    }

    /// Shortest route through the corridor from the start to the last column.
    pub fn route(&self) -> Vec<Cell> {
        shortest_route_to_exit(&self.grid, self.start).unwrap_or_default()
    }
}

/// Rightward-first neighbour order for the trace.
const TRACE_ORDER: [(i32, i32); 4] = [(0, 1), (1, 0), (-1, 0), (0, -1)];

/// Breadth-first visit of the corridor from `start`, preferring right, then
/// down, up and left. Empty when `start` is not path.
pub fn trace_path(grid: &Grid, start: Cell) -> Vec<Cell> {
    if !grid.is_path(start.0, start.1) {
        return Vec::new();
    }

    let columns = grid.columns();
    let mut visited = vec![false; grid.rows() * columns];
    let mut queue = VecDeque::new();
    let mut trace = Vec::new();

    visited[start.0 * columns + start.1] = true;
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        trace.push(cell);
        for delta in TRACE_ORDER {
            if let Some((nr, nc)) = grid.offset(cell, delta) {
                let idx = nr * columns + nc;
                if grid.is_path(nr, nc) && !visited[idx] {
                    visited[idx] = true;
                    queue.push_back((nr, nc));
                }
            }
        }
    }

    trace
}

/// Breadth-first shortest route from `start` to the nearest last-column path cell.
pub fn shortest_route_to_exit(grid: &Grid, start: Cell) -> Option<Vec<Cell>> {
    if !grid.is_path(start.0, start.1) {
        return None;
    }

    let columns = grid.columns();
    let mut came_from: Vec<Option<Cell>> = vec![None; grid.rows() * columns];
    let mut visited = vec![false; grid.rows() * columns];
    let mut queue = VecDeque::new();

    visited[start.0 * columns + start.1] = true;
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        if cell.1 == grid.last_column() {
            let mut route = vec![cell];
            let mut current = cell;
            while let Some(prev) = came_from[current.0 * columns + current.1] {
                route.push(prev);
                current = prev;
            }
            route.reverse();
            return Some(route);
        }

        for delta in TRACE_ORDER {
            if let Some((nr, nc)) = grid.offset(cell, delta) {
                let idx = nr * columns + nc;
                if grid.is_path(nr, nc) && !visited[idx] {
                    visited[idx] = true;
                    came_from[idx] = Some(cell);
                    queue.push_back((nr, nc));
                }
            }
        }
    }

    None
}

/// One independent draw per grass cell, row-major.
pub fn scatter_features(grid: &Grid, bands: &ScatterBands, rng: &mut ChaCha8Rng) -> Vec<Feature> {
    let rock_limit = bands.tree + bands.rock;
    let bonus_limit = rock_limit + bands.bonus;

    let mut features = Vec::new();
    for (row, col, state) in grid.iter() {
        if state.is_path() {
            continue;
        }
        let roll: f64 = rng.gen();
        let kind = if roll < bands.tree {
            FeatureKind::Tree
        } else if roll < rock_limit {
            FeatureKind::Rock
        } else if roll < bonus_limit {
            FeatureKind::Bonus
        } else {
            continue;
        };
        features.push(Feature { kind, row, col });
    }
    features
}

/// Run one generation attempt.
///
/// # Panics
///
/// If `params` fails [`PathParams::validate`]; bad parameters are a caller bug.
pub fn generate_path(params: &PathParams, seed: u64) -> Result<PathLayout, GenerationFailure> {
    if let Err(e) = params.validate() {
        panic!("invalid path parameters: {}", e);
    }
    let _span = tracing::debug_span!("generate_path", seed).entered();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut grid = Grid::new(params.rows, params.columns);

    let start_edge = StartEdge::ALL[rng.gen_range(0..StartEdge::ALL.len())];
    let start = start_edge.pick_cell(params.rows, params.columns, &mut rng);
    let target_row = rng.gen_range(1..=params.rows - 2);
    tracing::debug!(edge = start_edge.name(), ?start, target_row, "placed start");

    let walk_params = WalkParams::for_grid(&grid, target_row, params.edge_buffer, params.min_length);
    let walk = PathWalker::start(&mut grid, start).run(&mut grid, &walk_params, &mut rng);
    tracing::debug!(
        end = ?walk.end,
        length = walk.length,
        steps = walk.steps,
        reinforce_steps = walk.reinforce_steps,
        head = ?walk.head,
        "walk finished"
    );

    if !walk.reached_target {
        return Err(GenerationFailure::WalkStalled {
            head_col: walk.head.1,
            target_col: walk_params.target_col,
        });
    }
    if walk.length < params.min_length {
        return Err(GenerationFailure::TooShort {
            length: walk.length,
            minimum: params.min_length,
        });
    }

    let repair = repair_path(&mut grid, start)?;
    tracing::debug!(
        disconnected = repair.disconnected_removed,
        shapes = repair.shapes_removed,
        rounds = repair.rounds,
        "repaired corridor"
    );

    let trace = trace_path(&grid, start);
    if !trace.iter().any(|&(_, col)| col == grid.last_column()) {
        return Err(GenerationFailure::ExitUnreachable);
    }
    let required = params.required_trace_length();
    if (trace.len() as f64) < required {
        return Err(GenerationFailure::TraceTooShort {
            length: trace.len(),
            required,
        });
    }

    let features = scatter_features(&grid, &params.scatter, &mut rng);
    tracing::debug!(trace = trace.len(), features = features.len(), "corridor verified");

    Ok(PathLayout {
        grid,
        start_edge,
        start,
        trace,
        seed,
        features,
        stats: AttemptStats {
            walk_length: walk.length,
            walk_steps: walk.steps,
            reinforce_steps: walk.reinforce_steps,
            walk_end: walk.end,
            repair,
        },
    })
}

/// Try seeds `base_seed`, `base_seed + 1`, ... until one succeeds.
///
/// A convenience for callers; returns the last failure when every attempt fails.
pub fn generate_with_retries(
    params: &PathParams,
    base_seed: u64,
    max_attempts: usize,
) -> Result<PathLayout, GenerationFailure> {
    assert!(max_attempts > 0, "need at least one attempt");
    let mut last_failure = None;
    for attempt in 0..max_attempts as u64 {
        let seed = base_seed.wrapping_add(attempt);
        match generate_path(params, seed) {
            Ok(layout) => return Ok(layout),
            Err(failure) => {
                tracing::debug!(seed, reason = failure.reason(), "attempt failed");
                last_failure = Some(failure);
            }
        }
    }
    Err(last_failure.unwrap_or(GenerationFailure::ExitUnreachable))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmask::bitmask_at;
    use crate::repair::reachable_from;
    use crate::validator::find_violations;

    fn assert_well_formed(layout: &PathLayout, params: &PathParams) {
        let grid = &layout.grid;
        let reached = reachable_from(grid, layout.start);
        for (row, col) in grid.path_cells() {
            assert!(reached[row * grid.columns() + col], "({}, {}) disconnected", row, col);
            if col != 0 && col != grid.last_column() {
                assert!(bitmask_at(grid, row, col).is_renderable(), "({}, {}) stub", row, col);
            }
        }
        assert!(find_violations(grid).is_empty());
        assert!(layout.trace.iter().any(|&(_, c)| c == grid.last_column()));
        assert!(layout.trace.len() as f64 >= params.required_trace_length());
        assert_eq!(layout.trace.len(), grid.path_count());
        assert_eq!(layout.trace[0], layout.start);
    }

    #[test]
    fn test_small_grid_scenario() {
        // 10 rows by 7 columns
        let params = PathParams::new(10, 7, 8, 1);
        let layout = generate_with_retries(&params, 42, 200).expect("no seed produced a corridor");
        assert_well_formed(&layout, &params);
        assert!(layout.trace.len() >= 4);
    }

    #[test]
    fn test_tiny_grid_fails() {
        let params = PathParams::new(3, 3, 20, 0);
        for seed in 0..20 {
            assert!(generate_path(&params, seed).is_err(), "seed {}", seed);
        }
        assert!(generate_path(&params, 1).is_err());
    }

    #[test]
    fn test_same_seed_same_layout() {
        let params = PathParams::default();
        for seed in [1, 42, 9001] {
            assert_eq!(generate_path(&params, seed), generate_path(&params, seed));
        }
    }

    #[test]
    fn test_successes_are_well_formed() {
        let params = PathParams::default();
        let mut successes = 0;
        for seed in 0..150 {
            if let Ok(layout) = generate_path(&params, seed) {
                assert_eq!(layout.seed, seed);
                assert_well_formed(&layout, &params);
                successes += 1;
            }
        }
        assert!(successes > 0);
    }

    #[test]
    fn test_features_only_on_grass() {
        let params = PathParams::default().with_scatter(ScatterBands {
            tree: 0.5,
            rock: 0.3,
            bonus: 0.2,
        });
        let layout = generate_with_retries(&params, 7, 200).unwrap();
        let grass = layout.rows() * layout.columns() - layout.path_cell_count();
        // bands cover the whole unit interval
        assert_eq!(layout.features.len(), grass);
        for f in &layout.features {
            assert!(!layout.grid.is_path(f.row, f.col));
            assert!(layout.is_blocked(f.row, f.col));
        }
    }

    #[test]
    fn test_no_features_without_bands() {
        let params = PathParams::default().with_scatter(ScatterBands::none());
        let layout = generate_with_retries(&params, 3, 200).unwrap();
        assert!(layout.features.is_empty());
    }

    #[test]
    fn test_route_runs_start_to_exit() {
        let params = PathParams::default();
        let layout = generate_with_retries(&params, 11, 200).unwrap();
        let route = layout.route();
        assert_eq!(route.first(), Some(&layout.start));
        assert_eq!(route.last().map(|c| c.1), Some(layout.columns() - 1));
        for pair in route.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert_eq!(a.0.abs_diff(b.0) + a.1.abs_diff(b.1), 1);
            assert!(layout.grid.is_path(b.0, b.1));
        }
    }

    #[test]
    fn test_trace_prefers_right() {
        let grid = Grid::with_path(3, 4, &[(1, 0), (1, 1), (0, 1), (1, 2), (1, 3)]);
        let trace = trace_path(&grid, (1, 0));
        assert_eq!(trace, vec![(1, 0), (1, 1), (1, 2), (0, 1), (1, 3)]);
    }

    #[test]
    fn test_trace_of_grass_is_empty() {
        let grid = Grid::new(3, 3);
        assert!(trace_path(&grid, (1, 0)).is_empty());
        assert_eq!(shortest_route_to_exit(&grid, (1, 0)), None);
    }

    #[test]
    fn test_left_start_is_on_first_column() {
        let params = PathParams::default();
        for seed in 0..100 {
            if let Ok(layout) = generate_path(&params, seed) {
                match layout.start_edge {
                    StartEdge::Left => assert_eq!(layout.start.1, 0),
                    StartEdge::Top => assert_eq!(layout.start.0, 0),
                    StartEdge::Bottom => assert_eq!(layout.start.0, layout.rows() - 1),
                }
            }
        }
    }

    #[test]
    #[should_panic(expected = "invalid path parameters")]
    fn test_invalid_params_panic() {
        let _ = generate_path(&PathParams::new(2, 2, 1, 0), 0);
    }
}
