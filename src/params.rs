//! Configuration parameters for corridor generation

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest grid that has an interior row and column to start from.
pub const MIN_GRID_SIZE: usize = 3;

#[derive(Error, Debug)]
pub enum ParamsError {
    #[error("grid must be at least {min}x{min}, got {rows}x{columns}", min = MIN_GRID_SIZE)]
    GridTooSmall { rows: usize, columns: usize },
    #[error("scatter probability for {kind} must be within 0..=1, got {value}")]
    BandOutOfRange { kind: &'static str, value: f64 },
    #[error("scatter probabilities sum to {0}, which exceeds 1")]
    BandsExceedOne(f64),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Per-cell probabilities for decorative features on grass.
///
/// The bands are disjoint: a single draw `u` in `[0, 1)` picks a tree when
/// `u < tree`, a rock when `u < tree + rock`, a bonus when
/// `u < tree + rock + bonus`, and nothing otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterBands {
    pub tree: f64,
    pub rock: f64,
    pub bonus: f64,
}

impl Default for ScatterBands {
    fn default() -> Self {
        Self {
            tree: 0.07,
            rock: 0.03,
            bonus: 0.01,
        }
    }
}

impl ScatterBands {
    /// No features at all.
    pub fn none() -> Self {
        Self {
            tree: 0.0,
            rock: 0.0,
            bonus: 0.0,
        }
    }

    pub fn total(&self) -> f64 {
        self.tree + self.rock + self.bonus
    }

    fn validate(&self) -> Result<(), ParamsError> {
        for (kind, value) in [("tree", self.tree), ("rock", self.rock), ("bonus", self.bonus)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ParamsError::BandOutOfRange { kind, value });
            }
        }
        if self.total() > 1.0 {
            return Err(ParamsError::BandsExceedOne(self.total()));
        }
        Ok(())
    }
}

/// Everything one generation attempt needs besides the seed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathParams {
    /// Grid height in cells
    pub rows: usize,
    /// Grid width in cells
    pub columns: usize,
    /// Cells the walk must place before it may stop
    pub min_length: usize,
    /// Rows near the top and bottom that vertical moves avoid
    pub edge_buffer: usize,
    /// Decorative feature probabilities
    pub scatter: ScatterBands,
}

impl Default for PathParams {
    /// A 1280×720 field at 64 px tiles.
    fn default() -> Self {
        Self {
            rows: 11,
            columns: 20,
            min_length: 25,
            edge_buffer: 1,
            scatter: ScatterBands::default(),
        }
    }
}

impl PathParams {
    pub fn new(rows: usize, columns: usize, min_length: usize, edge_buffer: usize) -> Self {
        Self {
            rows,
            columns,
            min_length,
            edge_buffer,
            ..Self::default()
        }
    }

    pub fn with_scatter(mut self, scatter: ScatterBands) -> Self {
        self.scatter = scatter;
        self
    }

    /// Check caller-supplied values before generating.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.rows < MIN_GRID_SIZE || self.columns < MIN_GRID_SIZE {
            return Err(ParamsError::GridTooSmall {
                rows: self.rows,
                columns: self.columns,
            });
        }
        self.scatter.validate()
    }

    /// Load from a JSON file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ParamsError> {
        let params: Self = serde_json::from_str(content)?;
        params.validate()?;
        Ok(params)
    }

    /// Trace length a cleaned corridor must keep: half the walk minimum.
    pub fn required_trace_length(&self) -> f64 {
        self.min_length as f64 / 2.0
    }
}
