//! Default rasterization and shading for point datasets.
//!
//! - Count aggregation of points onto a pixel canvas
//! - Named colour ramps
//! - Shading of aggregate grids into RGBA images

pub mod canvas;
pub mod colormap;
pub mod shade;

pub use canvas::{rasterize_points, rasterize_points_within, Grid};
pub use colormap::{hex_to_rgb, Colormap, Palette};
pub use shade::{shade, ShadeHow, Span};
