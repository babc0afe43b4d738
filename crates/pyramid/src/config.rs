//! Render session configuration.

use std::fmt;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tiler_common::{Extent, TilerError, TilerResult, MAX_TILE_DIM, MAX_ZOOM, TILE_SIZE};

/// How shading spans are chosen within a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorRanging {
    /// One span per level from a statistics pass over every supertile, so
    /// colours match across supertile seams.
    #[default]
    Fullscan,
    /// Each supertile is shaded against its own value range.
    PerSupertile,
}

impl fmt::Display for ColorRanging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColorRanging::Fullscan => "fullscan",
            ColorRanging::PerSupertile => "per-supertile",
        })
    }
}

impl FromStr for ColorRanging {
    type Err = TilerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "fullscan" | "full-scan" => Ok(ColorRanging::Fullscan),
            "per-supertile" | "supertile" => Ok(ColorRanging::PerSupertile),
            other => Err(TilerError::InvalidArgument(format!(
                "unknown color ranging '{}' (expected fullscan or per-supertile)",
                other
            ))),
        }
    }
}

/// Check a zoom range against `0..=MAX_ZOOM` and `min <= max`.
pub fn validate_zoom_range(min_zoom: u32, max_zoom: u32) -> TilerResult<()> {
    for zoom in [min_zoom, max_zoom] {
        if zoom > MAX_ZOOM {
            return Err(TilerError::ZoomOutOfRange {
                zoom,
                max: MAX_ZOOM,
            });
        }
    }
    if min_zoom > max_zoom {
        return Err(TilerError::InvalidZoomRange {
            min: min_zoom,
            max: max_zoom,
        });
    }
    Ok(())
}

/// Immutable settings for one render session.
#[derive(Debug, Clone, PartialEq)]
pub struct PyramidConfig {
    root: Extent,
    min_zoom: u32,
    max_zoom: u32,
    tile_size: u32,
    max_tile_dim: u32,
    color_ranging: ColorRanging,
    output: PathBuf,
}

impl PyramidConfig {
    /// Validate the zoom range and root extent.
    ///
    /// A root extent with a zero-width axis is padded to
    /// [`tiler_common::MIN_EXTENT_SPAN`] so every tile has a positive area.
    pub fn new(
        root: Extent,
        min_zoom: u32,
        max_zoom: u32,
        output: impl Into<PathBuf>,
    ) -> TilerResult<Self> {
        validate_zoom_range(min_zoom, max_zoom)?;

        let root = Extent::try_new(root.min_x, root.min_y, root.max_x, root.max_y)?;

        Ok(Self {
            root: root.padded_to_min_span(),
            min_zoom,
            max_zoom,
            tile_size: TILE_SIZE,
            max_tile_dim: MAX_TILE_DIM,
            color_ranging: ColorRanging::default(),
            output: output.into(),
        })
    }

    pub fn with_color_ranging(mut self, color_ranging: ColorRanging) -> Self {
        self.color_ranging = color_ranging;
        self
    }

    /// Override the supertile batch size. Only tests need this.
    pub fn with_max_tile_dim(mut self, max_tile_dim: u32) -> Self {
        self.max_tile_dim = max_tile_dim.max(1);
        self
    }

    /// Override the tile edge length in pixels. Only tests need this.
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size.max(1);
        self
    }

    pub fn root(&self) -> Extent {
        self.root
    }

    pub fn min_zoom(&self) -> u32 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> u32 {
        self.max_zoom
    }

    pub fn zoom_levels(&self) -> RangeInclusive<u32> {
        self.min_zoom..=self.max_zoom
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn max_tile_dim(&self) -> u32 {
        self.max_tile_dim
    }

    pub fn color_ranging(&self) -> ColorRanging {
        self.color_ranging
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}
