//! Common types shared across the map tiler crates.

pub mod crs;
pub mod error;
pub mod extent;
pub mod tile;

pub use crs::CoordinateSystem;
pub use error::{ErrorClass, TilerError, TilerResult};
pub use extent::{Extent, MIN_EXTENT_SPAN};
pub use tile::{SuperTile, TileCoord, TileGrid, MAX_TILE_DIM, MAX_ZOOM, TILE_SIZE};
