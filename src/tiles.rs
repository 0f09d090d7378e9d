//! Tile selection for corridor rendering
//!
//! Maps path cells to one of ten directional sprites based on their
//! neighbour bitmask. Cells on the first and last column are always drawn
//! as a horizontal straight so the corridor visibly enters and leaves the map.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bitmask::{bitmask_at, Bitmask};
use crate::grid::Grid;

/// Renderable tile identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileId {
    Grass,
    /// Left + right (10)
    Horizontal,
    /// Up + down (5)
    Vertical,
    /// Up + right (3)
    CornerUpRight,
    /// Right + down (6)
    CornerDownRight,
    /// Up + left (9)
    CornerUpLeft,
    /// Down + left (12)
    CornerDownLeft,
    /// Up + left + right (11)
    TeeUp,
    /// Down + left + right (14)
    TeeDown,
    /// Up + down + left (13)
    TeeLeft,
    /// All four arms (15)
    Cross,
    /// A path shape with no sprite. Must never survive repair.
    Missing,
}

impl TileId {
    /// Look up the tile for a path cell's bitmask.
    pub fn from_bitmask(mask: Bitmask) -> TileId {
        match mask.bits() {
            10 => TileId::Horizontal,
            5 => TileId::Vertical,
            3 => TileId::CornerUpRight,
            6 => TileId::CornerDownRight,
            9 => TileId::CornerUpLeft,
            12 => TileId::CornerDownLeft,
            11 => TileId::TeeUp,
            14 => TileId::TeeDown,
            13 => TileId::TeeLeft,
            15 => TileId::Cross,
            _ => TileId::Missing,
        }
    }

    /// The arms this tile draws, as bitmask bits. Grass and the placeholder draw none.
    pub fn arms(self) -> u8 {
        match self {
            TileId::Grass | TileId::Missing => 0,
            TileId::Horizontal => 10,
            TileId::Vertical => 5,
            TileId::CornerUpRight => 3,
            TileId::CornerDownRight => 6,
            TileId::CornerUpLeft => 9,
            TileId::CornerDownLeft => 12,
            TileId::TeeUp => 11,
            TileId::TeeDown => 14,
            TileId::TeeLeft => 13,
            TileId::Cross => 15,
        }
    }

    pub fn is_path(self) -> bool {
        self != TileId::Grass
    }

    /// Sprite file for this tile, `None` for the placeholder.
    pub fn sprite_name(self) -> Option<&'static str> {
        let name = match self {
            TileId::Grass => "MainGrass.png",
            TileId::Horizontal => "PathSpriteHorizontal.png",
            TileId::Vertical => "PathSpriteVertical.png",
            TileId::CornerUpRight => "PathSpriteTopRight.png",
            TileId::CornerDownRight => "PathSpriteBottomRight.png",
            TileId::CornerUpLeft => "PathSpriteTopleft.png",
            TileId::CornerDownLeft => "PathSpriteBottomLeft.png",
            TileId::TeeUp => "PathSprite1.png",
            TileId::TeeDown => "PathSprite2.png",
            TileId::TeeLeft => "PathSprite4.png",
            TileId::Cross => "PathSpriteCross.png",
            TileId::Missing => return None,
        };
        Some(name)
    }
}

/// Resolve the tile for `(row, col)`, applying the edge override.
pub fn tile_for(grid: &Grid, row: usize, col: usize) -> TileId {
    if !grid.is_path(row, col) {
        return TileId::Grass;
    }
    if col == 0 || col == grid.last_column() {
        return TileId::Horizontal;
    }
    TileId::from_bitmask(bitmask_at(grid, row, col))
}

/// Tile size and sprite lookup table handed to a renderer at startup.
///
/// Only computes names, candidate paths and blit positions; loading the
/// images is the renderer's job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileAtlas {
    pub tile_size: u32,
    pub search_folders: Vec<PathBuf>,
    pub path_subfolder: PathBuf,
}

impl Default for TileAtlas {
    fn default() -> Self {
        Self {
            tile_size: 64,
            search_folders: vec![PathBuf::new(), PathBuf::from("tiles"), PathBuf::from("assets")],
            path_subfolder: PathBuf::from("PathTiles"),
        }
    }
}

impl TileAtlas {
    pub fn new(tile_size: u32, search_folders: Vec<PathBuf>, path_subfolder: impl AsRef<Path>) -> Self {
        assert!(tile_size > 0, "tile size must be positive");
        Self {
            tile_size,
            search_folders,
            path_subfolder: path_subfolder.as_ref().to_path_buf(),
        }
    }

    /// Top-left pixel of a cell.
    pub fn blit_origin(&self, row: usize, col: usize) -> (u32, u32) {
        (col as u32 * self.tile_size, row as u32 * self.tile_size)
    }

    /// Pixel size of a whole grid.
    pub fn canvas_size(&self, grid: &Grid) -> (u32, u32) {
        (
            grid.columns() as u32 * self.tile_size,
            grid.rows() as u32 * self.tile_size,
        )
    }

    /// Paths a loader should try for a tile's sprite, in search order.
    /// Path sprites live under the path subfolder; the grass sprite does not.
    pub fn candidate_paths(&self, tile: TileId) -> Vec<PathBuf> {
        let Some(name) = tile.sprite_name() else {
            return Vec::new();
        };
        self.search_folders
            .iter()
            .map(|folder| {
                if tile.is_path() {
                    folder.join(&self.path_subfolder).join(name)
                } else {
                    folder.join(name)
                }
            })
            .collect()
    }

    /// Colour used for tiles without a sprite.
    pub fn placeholder_color(&self) -> [u8; 3] {
        [255, 0, 255]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_renderable_shape_has_a_sprite() {
        for bits in crate::bitmask::RENDERABLE_SHAPES {
            let tile = TileId::from_bitmask(Bitmask::new(bits));
            assert_ne!(tile, TileId::Missing, "bitmask {}", bits);
            assert_eq!(tile.arms(), bits);
            assert!(tile.sprite_name().is_some());
        }
    }

    #[test]
    fn test_stub_shapes_map_to_missing() {
        for bits in [0, 1, 2, 4, 7, 8] {
            assert_eq!(TileId::from_bitmask(Bitmask::new(bits)), TileId::Missing);
        }
        assert_eq!(TileId::Missing.sprite_name(), None);
    }

    #[test]
    fn test_edge_override_on_first_column() {
        // (1,0) is vertical: path above and below it
        let grid = Grid::with_path(3, 4, &[(0, 0), (1, 0), (2, 0)]);
        assert_eq!(bitmask_at(&grid, 1, 0).bits(), 5);
        assert_eq!(tile_for(&grid, 1, 0), TileId::Horizontal);
    }

    #[test]
    fn test_edge_override_on_last_column() {
        let grid = Grid::with_path(3, 4, &[(1, 2), (1, 3), (2, 3)]);
        assert_eq!(tile_for(&grid, 1, 3), TileId::Horizontal);
        assert_eq!(tile_for(&grid, 2, 3), TileId::Horizontal);
    }

    #[test]
    fn test_interior_uses_bitmask() {
        let grid = Grid::with_path(3, 4, &[(1, 0), (1, 1), (2, 1)]);
        assert_eq!(tile_for(&grid, 1, 1), TileId::CornerDownLeft);
        assert_eq!(tile_for(&grid, 2, 1), TileId::Missing);
        assert_eq!(tile_for(&grid, 0, 0), TileId::Grass);
    }

    #[test]
    fn test_atlas_positions_and_paths() {
        let atlas = TileAtlas::new(32, vec![PathBuf::from("assets")], "PathTiles");
        assert_eq!(atlas.blit_origin(2, 3), (96, 64));
        assert_eq!(
            atlas.candidate_paths(TileId::Cross),
            vec![PathBuf::from("assets/PathTiles/PathSpriteCross.png")]
        );
        assert_eq!(
            atlas.candidate_paths(TileId::Grass),
            vec![PathBuf::from("assets/MainGrass.png")]
        );
        assert!(atlas.candidate_paths(TileId::Missing).is_empty());
    }
}
