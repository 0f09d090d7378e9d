//! ASCII rendering and export for corridor maps
//!
//! Renders a layout as text and writes it to a file with a short report.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;

use crate::bitmask::bitmask_at;
use crate::generator::{FeatureKind, PathLayout};
use crate::tiles::TileId;

/// ASCII rendering modes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AsciiMode {
    /// Box-drawing glyph per path tile, feature letters on grass
    Tiles,
    /// Hex digit of each path cell's raw bitmask
    Bitmask,
    /// Only the shortest start-to-exit route, numbered mod 10
    Route,
}

impl AsciiMode {
    pub fn name(&self) -> &'static str {
        match self {
            AsciiMode::Tiles => "Tiles",
            AsciiMode::Bitmask => "Bitmask",
            AsciiMode::Route => "Route",
        }
    }

    pub fn all() -> &'static [AsciiMode] {
        &[AsciiMode::Tiles, AsciiMode::Bitmask, AsciiMode::Route]
    }
}

/// Glyph for a tile.
pub fn tile_char(tile: TileId) -> char {
    match tile {
        TileId::Grass => '.',
        TileId::Horizontal => '─',
        TileId::Vertical => '│',
        TileId::CornerUpRight => '└',
        TileId::CornerDownRight => '┌',
        TileId::CornerUpLeft => '┘',
        TileId::CornerDownLeft => '┐',
        TileId::TeeUp => '┴',
        TileId::TeeDown => '┬',
        TileId::TeeLeft => '┤',
        TileId::Cross => '┼',
        TileId::Missing => '?',
    }
}

pub fn feature_char(kind: FeatureKind) -> char {
    match kind {
        FeatureKind::Tree => 'T',
        FeatureKind::Rock => 'o',
        FeatureKind::Bonus => '$',
    }
}

/// Render the layout as one line per grid row.
pub fn render_ascii_map(layout: &PathLayout, mode: AsciiMode) -> String {
    let rows = layout.rows();
    let columns = layout.columns();
    let features: HashMap<(usize, usize), FeatureKind> = layout
        .features
        .iter()
        .map(|f| ((f.row, f.col), f.kind))
        .collect();
    let route: HashMap<(usize, usize), usize> = match mode {
        AsciiMode::Route => layout.route().into_iter().enumerate().map(|(i, c)| (c, i)).collect(),
        _ => HashMap::new(),
    };

    let mut out = String::with_capacity(rows * (columns * 3 + 1));
    for row in 0..rows {
        for col in 0..columns {
            let c = match mode {
                AsciiMode::Tiles => match layout.tile_at(row, col) {
                    TileId::Grass => features.get(&(row, col)).map_or('.', |&k| feature_char(k)),
                    tile => tile_char(tile),
                },
                AsciiMode::Bitmask => {
                    if layout.grid.is_path(row, col) {
                        char::from_digit(bitmask_at(&layout.grid, row, col).bits() as u32, 16).unwrap_or('?')
                    } else {
                        '.'
                    }
                }
                AsciiMode::Route => match route.get(&(row, col)) {
                    Some(&i) => char::from_digit((i % 10) as u32, 10).unwrap_or('#'),
                    None if layout.grid.is_path(row, col) => '+',
                    None => '.',
                },
            };
            out.push(c);
        }
        out.push('\n');
    }
    out
}

/// Legend for the tile view.
pub fn tile_legend() -> String {
    let mut out = String::from("Legend:\n");
    let tiles = [
        (TileId::Horizontal, "horizontal"),
        (TileId::Vertical, "vertical"),
        (TileId::CornerUpRight, "corner up-right"),
        (TileId::CornerDownRight, "corner down-right"),
        (TileId::CornerUpLeft, "corner up-left"),
        (TileId::CornerDownLeft, "corner down-left"),
        (TileId::TeeUp, "tee up"),
        (TileId::TeeDown, "tee down"),
        (TileId::TeeLeft, "tee left"),
        (TileId::Cross, "cross"),
        (TileId::Missing, "missing sprite"),
    ];
    for (tile, label) in tiles {
        out.push_str(&format!("  {} {}\n", tile_char(tile), label));
    }
    for kind in [FeatureKind::Tree, FeatureKind::Rock, FeatureKind::Bonus] {
        out.push_str(&format!("  {} {}\n", feature_char(kind), kind.name()));
    }
    out.push_str("  . grass\n");
    out
}

/// Count path tiles by shape.
pub fn tile_stats(layout: &PathLayout) -> Vec<(TileId, usize)> {
    let mut counts: HashMap<TileId, usize> = HashMap::new();
    for (row, col) in layout.grid.path_cells() {
        *counts.entry(layout.tile_at(row, col)).or_insert(0) += 1;
    }
    let mut sorted: Vec<_> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| tile_char(a.0).cmp(&tile_char(b.0))));
    sorted
}

/// Write the tile view, legend and statistics to a text file.
pub fn export_ascii(layout: &PathLayout, path: impl AsRef<Path>) -> io::Result<()> {
    let mut file = File::create(path)?;

    writeln!(file, "=== CORRIDOR MAP ===")?;
    writeln!(file, "Seed: {}", layout.seed)?;
    writeln!(file, "Size: {} rows x {} columns", layout.rows(), layout.columns())?;
    writeln!(file, "Start: {} edge at ({}, {})", layout.start_edge.name(), layout.start.0, layout.start.1)?;
    writeln!(file, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(file)?;

    for &mode in AsciiMode::all() {
        writeln!(file, "=== MAP ({} View) ===", mode.name())?;
        write!(file, "{}", render_ascii_map(layout, mode))?;
        writeln!(file)?;
    }

    write!(file, "{}", tile_legend())?;
    writeln!(file)?;

    writeln!(file, "=== STATISTICS ===")?;
    writeln!(file, "Path cells: {}", layout.path_cell_count())?;
    writeln!(file, "Trace length: {}", layout.trace.len())?;
    writeln!(file, "Route length: {}", layout.route().len())?;
    writeln!(
        file,
        "Walk: {} cells in {} steps (+{} reinforcement)",
        layout.stats.walk_length, layout.stats.walk_steps, layout.stats.reinforce_steps
    )?;
    writeln!(
        file,
        "Repair: {} disconnected, {} stubs removed over {} rounds",
        layout.stats.repair.disconnected_removed, layout.stats.repair.shapes_removed, layout.stats.repair.rounds
    )?;
    writeln!(file, "Tiles:")?;
    for (tile, count) in tile_stats(layout) {
        writeln!(file, "  {} {:>4}", tile_char(tile), count)?;
    }
    writeln!(file, "Features: {}", layout.features.len())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{generate_with_retries, Feature};
    use crate::params::PathParams;

    fn layout() -> PathLayout {
        generate_with_retries(&PathParams::default(), 5, 200).unwrap()
    }

    #[test]
    fn test_render_dimensions() {
        let layout = layout();
        for &mode in AsciiMode::all() {
            let text = render_ascii_map(&layout, mode);
            let lines: Vec<&str> = text.lines().collect();
            assert_eq!(lines.len(), layout.rows(), "{}", mode.name());
            assert!(lines.iter().all(|l| l.chars().count() == layout.columns()));
        }
    }

    #[test]
    fn test_tiles_view_has_no_missing_glyph() {
        let layout = layout();
        let text = render_ascii_map(&layout, AsciiMode::Tiles);
        assert!(!text.contains('?'));
        // both edge columns draw horizontal where the corridor touches them
        for line in text.lines() {
            let chars: Vec<char> = line.chars().collect();
            for &c in [chars[0], chars[chars.len() - 1]].iter() {
                assert!(c == '─' || c == '.' || c == 'T' || c == 'o' || c == '$');
            }
        }
    }

    #[test]
    fn test_features_rendered() {
        let mut layout = layout();
        let (row, col) = layout
            .grid
            .iter()
            .find(|&(_, _, s)| !s.is_path())
            .map(|(r, c, _)| (r, c))
            .unwrap();
        layout.features = vec![Feature { kind: FeatureKind::Bonus, row, col }];
        let text = render_ascii_map(&layout, AsciiMode::Tiles);
        assert_eq!(text.lines().nth(row).unwrap().chars().nth(col), Some('$'));
    }

    #[test]
    fn test_export_writes_report() {
        let layout = layout();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.txt");
        export_ascii(&layout, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("=== CORRIDOR MAP ==="));
        assert!(content.contains(&format!("Seed: {}", layout.seed)));
        assert!(content.contains("=== MAP (Route View) ==="));
        assert!(content.contains("Path cells:"));
    }

    #[test]
    fn test_tile_stats_sum_to_path_count() {
        let layout = layout();
        let total: usize = tile_stats(&layout).iter().map(|(_, n)| n).sum();
        assert_eq!(total, layout.path_cell_count());
    }
}
