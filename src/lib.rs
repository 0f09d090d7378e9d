//! Corridor generation library
//!
//! Procedurally lays a single-width, renderable path across a tile grid
//! from the left (or top/bottom) edge to the right edge.
//!
//! Re-exports modules for use by binaries and tools.

pub mod ascii;
pub mod bitmask;
pub mod export;
pub mod generator;
pub mod grid;
pub mod params;
pub mod repair;
pub mod tiles;
pub mod validator;
pub mod walker;

pub use generator::{generate_path, generate_with_retries, GenerationFailure, PathLayout, StartEdge};
pub use grid::{Cell, CellState, Grid};
pub use params::PathParams;
pub use tiles::{tile_for, TileAtlas, TileId};
