//! Image and JSON export of corridor layouts
//!
//! The PNG preview draws every cell procedurally from its [`TileId`], so it
//! needs no sprite files. The JSON record is what a game front end loads.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bitmask::Bitmask;
use crate::generator::{Feature, FeatureKind, PathLayout, StartEdge};
use crate::grid::{Cell, CellState};
use crate::tiles::{TileAtlas, TileId};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

const GRASS: [u8; 3] = [86, 140, 62];
const GRASS_ALT: [u8; 3] = [80, 132, 58];
const DIRT: [u8; 3] = [176, 140, 92];
const DIRT_EDGE: [u8; 3] = [140, 108, 68];
const TREE: [u8; 3] = [34, 84, 40];
const ROCK: [u8; 3] = [128, 128, 124];
const BONUS: [u8; 3] = [232, 196, 48];

fn feature_color(kind: FeatureKind) -> [u8; 3] {
    match kind {
        FeatureKind::Tree => TREE,
        FeatureKind::Rock => ROCK,
        FeatureKind::Bonus => BONUS,
    }
}

fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, color: [u8; 3]) {
    for y in y0..(y0 + h).min(img.height()) {
        for x in x0..(x0 + w).min(img.width()) {
            img.put_pixel(x, y, Rgb(color));
        }
    }
}

/// Draw one tile's corridor: a centre square plus an arm per connected side.
fn draw_path_tile(img: &mut RgbImage, x0: u32, y0: u32, size: u32, tile: TileId, placeholder: [u8; 3]) {
    if tile == TileId::Missing {
        fill_rect(img, x0, y0, size, size, placeholder);
        return;
    }

    let width = (size / 3).max(1);
    let lo = (size - width) / 2;
    let hi = lo + width;
    let arms = tile.arms();

    // Slightly wider dark band first so the corridor has an edge
    let border = (width / 6).max(1).min(lo);
    let paint = |img: &mut RgbImage, grow: u32, color: [u8; 3]| {
        let (a, b) = (lo - grow, hi + grow);
        fill_rect(img, x0 + a, y0 + a, b - a, b - a, color);
        if arms & Bitmask::UP != 0 {
            fill_rect(img, x0 + a, y0, b - a, b, color);
        }
        if arms & Bitmask::DOWN != 0 {
            fill_rect(img, x0 + a, y0 + a, b - a, size - a, color);
        }
        if arms & Bitmask::LEFT != 0 {
            fill_rect(img, x0, y0 + a, b, b - a, color);
        }
        if arms & Bitmask::RIGHT != 0 {
            fill_rect(img, x0 + a, y0 + a, size - a, b - a, color);
        }
    };
    paint(img, border, DIRT_EDGE);
    paint(img, 0, DIRT);
}

fn draw_feature(img: &mut RgbImage, x0: u32, y0: u32, size: u32, kind: FeatureKind) {
    let radius = (size / 4).max(1) as i64;
    let cx = (x0 + size / 2) as i64;
    let cy = (y0 + size / 2) as i64;
    let color = feature_color(kind);
    for y in (cy - radius)..=(cy + radius) {
        for x in (cx - radius)..=(cx + radius) {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= radius * radius && x >= 0 && y >= 0 {
                let (x, y) = (x as u32, y as u32);
                if x < img.width() && y < img.height() {
                    img.put_pixel(x, y, Rgb(color));
                }
            }
        }
    }
}

/// Render the whole layout at the atlas tile size.
pub fn render_layout(layout: &PathLayout, atlas: &TileAtlas) -> RgbImage {
    let (width, height) = atlas.canvas_size(&layout.grid);
    let size = atlas.tile_size;
    let mut img: RgbImage = ImageBuffer::new(width, height);

    for row in 0..layout.rows() {
        for col in 0..layout.columns() {
            let (x0, y0) = atlas.blit_origin(row, col);
            let grass = if (row + col) % 2 == 0 { GRASS } else { GRASS_ALT };
            fill_rect(&mut img, x0, y0, size, size, grass);

            match layout.tile_at(row, col) {
                TileId::Grass => {}
                tile => draw_path_tile(&mut img, x0, y0, size, tile, atlas.placeholder_color()),
            }
        }
    }

    for feature in &layout.features {
        let (x0, y0) = atlas.blit_origin(feature.row, feature.col);
        draw_feature(&mut img, x0, y0, size, feature.kind);
    }

    img
}

/// Save a PNG preview of the layout.
pub fn export_png(layout: &PathLayout, atlas: &TileAtlas, path: impl AsRef<Path>) -> Result<(), ExportError> {
    render_layout(layout, atlas).save(path)?;
    Ok(())
}

/// Serializable snapshot of a layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutRecord {
    pub seed: u64,
    pub rows: usize,
    pub columns: usize,
    pub start_edge: StartEdge,
    pub start: Cell,
    /// One entry per row, one state per column
    pub grid: Vec<Vec<CellState>>,
    /// Resolved tile for each path cell, row-major
    pub tiles: Vec<(usize, usize, TileId)>,
    pub trace: Vec<Cell>,
    pub route: Vec<Cell>,
    pub features: Vec<Feature>,
}

impl LayoutRecord {
    pub fn from_layout(layout: &PathLayout) -> Self {
        let grid = (0..layout.rows())
            .map(|row| (0..layout.columns()).map(|col| layout.grid.get(row, col)).collect())
            .collect();
        let tiles = layout
            .grid
            .path_cells()
            .map(|(row, col)| (row, col, layout.tile_at(row, col)))
            .collect();

        Self {
            seed: layout.seed,
            rows: layout.rows(),
            columns: layout.columns(),
            start_edge: layout.start_edge,
            start: layout.start,
            grid,
            tiles,
            trace: layout.trace.clone(),
            route: layout.route(),
            features: layout.features.clone(),
        }
    }
}

/// Write the layout as pretty-printed JSON.
pub fn export_json(layout: &PathLayout, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &LayoutRecord::from_layout(layout))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate_with_retries;
    use crate::params::PathParams;

    fn layout() -> PathLayout {
        generate_with_retries(&PathParams::new(8, 12, 12, 1), 21, 200).unwrap()
    }

    #[test]
    fn test_render_size_and_colors() {
        let layout = layout();
        let atlas = TileAtlas::new(16, Vec::new(), "PathTiles");
        let img = render_layout(&layout, &atlas);
        assert_eq!(img.dimensions(), (12 * 16, 8 * 16));

        // centre of every path tile is dirt, never placeholder magenta
        for (row, col) in layout.grid.path_cells() {
            let (x0, y0) = atlas.blit_origin(row, col);
            assert_eq!(img.get_pixel(x0 + 8, y0 + 8).0, DIRT);
        }
    }

    #[test]
    fn test_missing_tile_is_placeholder() {
        let mut img: RgbImage = ImageBuffer::new(9, 9);
        draw_path_tile(&mut img, 0, 0, 9, TileId::Missing, [255, 0, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 255]);
        assert_eq!(img.get_pixel(8, 8).0, [255, 0, 255]);
    }

    #[test]
    fn test_horizontal_tile_leaves_corners_clear() {
        let mut img: RgbImage = ImageBuffer::new(12, 12);
        draw_path_tile(&mut img, 0, 0, 12, TileId::Horizontal, [255, 0, 255]);
        assert_eq!(img.get_pixel(0, 6).0, DIRT);
        assert_eq!(img.get_pixel(11, 6).0, DIRT);
        assert_eq!(img.get_pixel(6, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_json_round_trip() {
        let layout = layout();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        export_json(&layout, &path).unwrap();

        let record: LayoutRecord = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(record, LayoutRecord::from_layout(&layout));
        assert_eq!(record.grid.len(), 8);
        assert_eq!(record.tiles.len(), layout.path_cell_count());
    }

    #[test]
    fn test_png_export() {
        let layout = layout();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.png");
        export_png(&layout, &TileAtlas::new(8, Vec::new(), "PathTiles"), &path).unwrap();
        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (96, 64));
    }
}
