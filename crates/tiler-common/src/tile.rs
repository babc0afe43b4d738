//! Tile addressing, quadtree subdivision and supertile grouping.
//!
//! Tiles are never stored as a tree. At zoom level `z` the root extent is cut
//! into `2^z × 2^z` equal cells and a tile's footprint is derived from its
//! column and row. Row 0 is the top (max y) row, matching the XYZ convention
//! used by web map viewers.

use crate::Extent;
use serde::{Deserialize, Serialize};

/// Tile edge length in pixels.
pub const TILE_SIZE: u32 = 256;

/// Maximum number of tiles per axis batched into one supertile.
pub const MAX_TILE_DIM: u32 = 16;

/// Highest zoom level the tiler accepts.
pub const MAX_ZOOM: u32 = 14;

/// Half the side of the square Web Mercator world, in metres.
pub const WEB_MERCATOR_MAX: f64 = 20037508.342789244;

/// A tile coordinate (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y), 0 at the top
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Relative path fragment "z/x/y".
    pub fn path_key(&self) -> String {
        format!("{}/{}/{}", self.z, self.x, self.y)
    }

    /// True when column and row are inside the `2^z` grid.
    pub fn is_valid(&self) -> bool {
        self.z < 32 && self.x < tiles_per_axis(self.z) && self.y < tiles_per_axis(self.z)
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path_key())
    }
}

/// Number of tiles along one axis at zoom `z`.
pub fn tiles_per_axis(z: u32) -> u32 {
    1u32 << z
}

/// The `2^z × 2^z` subdivision of a root extent at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGrid {
    root: Extent,
    z: u32,
}

impl TileGrid {
    pub fn new(root: Extent, z: u32) -> Self {
        Self { root, z }
    }

    /// Grid over the full square Web Mercator world.
    pub fn web_mercator(z: u32) -> Self {
        Self::new(
            Extent::new(
                -WEB_MERCATOR_MAX,
                -WEB_MERCATOR_MAX,
                WEB_MERCATOR_MAX,
                WEB_MERCATOR_MAX,
            ),
            z,
        )
    }

    pub fn zoom(&self) -> u32 {
        self.z
    }

    pub fn root(&self) -> &Extent {
        &self.root
    }

    pub fn tiles_per_axis(&self) -> u32 {
        tiles_per_axis(self.z)
    }

    /// Total number of tiles at this level (`4^z`).
    pub fn tile_count(&self) -> u64 {
        let n = self.tiles_per_axis() as u64;
        n * n
    }

    /// X coordinate of the left edge of column `i` (`i == n` gives the right edge).
    fn x_edge(&self, i: u32) -> f64 {
        let n = self.tiles_per_axis();
        if i >= n {
            return self.root.max_x;
        }
        self.root.min_x + self.root.width() * (i as f64 / n as f64)
    }

    /// Y coordinate of the top edge of row `j` (`j == n` gives the bottom edge).
    fn y_edge(&self, j: u32) -> f64 {
        let n = self.tiles_per_axis();
        if j >= n {
            return self.root.min_y;
        }
        self.root.max_y - self.root.height() * (j as f64 / n as f64)
    }

    /// Footprint of a block of `cols × rows` tiles starting at (`col`, `row`).
    pub fn block_extent(&self, col: u32, row: u32, cols: u32, rows: u32) -> Extent {
        Extent::new(
            self.x_edge(col),
            self.y_edge(row + rows),
            self.x_edge(col + cols),
            self.y_edge(row),
        )
    }

    /// Footprint of a single tile.
    pub fn tile_extent(&self, col: u32, row: u32) -> Extent {
        self.block_extent(col, row, 1, 1)
    }

    /// Partition the grid into supertiles of at most `max_dim` tiles per axis,
    /// in row-major raster order. Edge blocks take the remainder.
    pub fn supertiles(&self, max_dim: u32) -> Vec<SuperTile> {
        let max_dim = max_dim.max(1);
        let n = self.tiles_per_axis();
        let mut blocks = Vec::new();

        let mut row = 0;
        while row < n {
            let rows = max_dim.min(n - row);
            let mut col = 0;
            while col < n {
                let cols = max_dim.min(n - col);
                blocks.push(SuperTile {
                    z: self.z,
                    col,
                    row,
                    cols,
                    rows,
                    extent: self.block_extent(col, row, cols, rows),
                });
                col += cols;
            }
            row += rows;
        }

        blocks
    }

    /// A one-tile supertile for rendering a single address.
    pub fn single_tile(&self, coord: TileCoord) -> Option<SuperTile> {
        if coord.z != self.z || !coord.is_valid() {
            return None;
        }
        Some(SuperTile {
            z: self.z,
            col: coord.x,
            row: coord.y,
            cols: 1,
            rows: 1,
            extent: self.tile_extent(coord.x, coord.y),
        })
    }
}

/// A rectangular run of adjacent tiles at one zoom level rendered in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuperTile {
    pub z: u32,
    /// Column of the top-left member tile
    pub col: u32,
    /// Row of the top-left member tile
    pub row: u32,
    /// Member tiles per row
    pub cols: u32,
    /// Member tiles per column
    pub rows: u32,
    /// Union of member tile extents
    pub extent: Extent,
}

impl SuperTile {
    pub fn tile_count(&self) -> u32 {
        self.cols * self.rows
    }

    pub fn pixel_width(&self, tile_size: u32) -> u32 {
        self.cols * tile_size
    }

    pub fn pixel_height(&self, tile_size: u32) -> u32 {
        self.rows * tile_size
    }

    /// Member tiles with their pixel offset inside the supertile image,
    /// row-major.
    pub fn tiles(&self, tile_size: u32) -> impl Iterator<Item = (TileCoord, u32, u32)> + '_ {
        (0..self.rows).flat_map(move |j| {
            (0..self.cols).map(move |i| {
                (
                    TileCoord::new(self.z, self.col + i, self.row + j),
                    i * tile_size,
                    j * tile_size,
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_zero_is_root() {
        let root = Extent::new(-100.0, -100.0, 100.0, 100.0);
        let grid = TileGrid::new(root, 0);
        assert_eq!(grid.tile_count(), 1);
        assert_eq!(grid.tile_extent(0, 0), root);
    }

    #[test]
    fn test_row_zero_is_top() {
        let grid = TileGrid::new(Extent::new(0.0, 0.0, 4.0, 4.0), 1);
        assert_eq!(grid.tile_extent(0, 0), Extent::new(0.0, 2.0, 2.0, 4.0));
        assert_eq!(grid.tile_extent(1, 1), Extent::new(2.0, 0.0, 4.0, 2.0));
    }

    #[test]
    fn test_supertile_remainders() {
        let grid = TileGrid::new(Extent::new(0.0, 0.0, 1.0, 1.0), 3);
        let blocks = grid.supertiles(3);

        // 8 = 3 + 3 + 2 on each axis
        assert_eq!(blocks.len(), 9);
        assert_eq!((blocks[0].cols, blocks[0].rows), (3, 3));
        assert_eq!((blocks[2].col, blocks[2].cols), (6, 2));
        assert_eq!((blocks[8].row, blocks[8].rows), (6, 2));
        let covered: u32 = blocks.iter().map(SuperTile::tile_count).sum();
        assert_eq!(covered as u64, grid.tile_count());
    }

    #[test]
    fn test_supertile_member_offsets() {
        let grid = TileGrid::new(Extent::new(0.0, 0.0, 1.0, 1.0), 1);
        let block = grid.supertiles(MAX_TILE_DIM)[0];
        let tiles: Vec<_> = block.tiles(TILE_SIZE).collect();
        assert_eq!(
            tiles,
            vec![
                (TileCoord::new(1, 0, 0), 0, 0),
                (TileCoord::new(1, 1, 0), 256, 0),
                (TileCoord::new(1, 0, 1), 0, 256),
                (TileCoord::new(1, 1, 1), 256, 256),
            ]
        );
    }

    #[test]
    fn test_single_tile() {
        let grid = TileGrid::web_mercator(2);
        let block = grid.single_tile(TileCoord::new(2, 3, 0)).unwrap();
        assert_eq!(block.tile_count(), 1);
        assert!((block.extent.max_x - WEB_MERCATOR_MAX).abs() < 1e-6);
        assert!((block.extent.max_y - WEB_MERCATOR_MAX).abs() < 1e-6);
        assert!(grid.single_tile(TileCoord::new(2, 4, 0)).is_none());
        assert!(grid.single_tile(TileCoord::new(3, 0, 0)).is_none());
    }
}
