//! Static tile pyramid rendering.
//!
//! For each zoom level the root extent is cut into `2^z × 2^z` tiles, the
//! tiles are batched into supertiles of at most [`MAX_TILE_DIM`] per axis, and
//! every supertile runs through a [`TilePipeline`] before being sliced into
//! `<root>/<z>/<col>/<row>.png` files by the [`TileWriter`].
//!
//! [`MAX_TILE_DIM`]: tiler_common::MAX_TILE_DIM

pub mod config;
pub mod pipeline;
pub mod scheduler;
pub mod writer;

pub use config::{validate_zoom_range, ColorRanging, PyramidConfig};
pub use pipeline::{FnPipeline, PointPipeline, TilePipeline};
pub use scheduler::{render_tile, LevelSummary, Levels, ProgressEvent, PyramidRenderer};
pub use writer::{encode_png, TileFormat, TileWriter};
