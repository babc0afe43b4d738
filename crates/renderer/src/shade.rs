//! Shading of aggregate grids into RGBA images.

use std::fmt;
use std::str::FromStr;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tiler_common::TilerError;
use tracing::trace;

use crate::{Colormap, Grid};

/// Value range used to normalize a grid before colouring.
///
/// Only positive cells count: empty pixels carry no data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Range of the positive, finite cells of `grid`, if any.
    pub fn of(grid: &Grid) -> Option<Span> {
        grid.data()
            .iter()
            .copied()
            .filter(|v| v.is_finite() && *v > 0.0)
            .fold(None, |acc: Option<Span>, v| match acc {
                None => Some(Span::new(v, v)),
                Some(s) => Some(Span::new(s.min.min(v), s.max.max(v))),
            })
    }

    pub fn union(&self, other: &Span) -> Span {
        Span::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Fold two optional spans.
    pub fn merge(a: Option<Span>, b: Option<Span>) -> Option<Span> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.union(&b)),
            (a, None) => a,
            (None, b) => b,
        }
    }
}

/// How aggregate values are mapped onto the colour ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadeHow {
    Linear,
    #[default]
    Log,
    /// Histogram equalization over the grid's own values
    EqHist,
}

impl fmt::Display for ShadeHow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShadeHow::Linear => "linear",
            ShadeHow::Log => "log",
            ShadeHow::EqHist => "eq_hist",
        })
    }
}

impl FromStr for ShadeHow {
    type Err = TilerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "linear" => Ok(ShadeHow::Linear),
            "log" => Ok(ShadeHow::Log),
            "eq_hist" => Ok(ShadeHow::EqHist),
            other => Err(TilerError::InvalidArgument(format!(
                "unknown shading '{}' (expected linear, log or eq_hist)",
                other
            ))),
        }
    }
}

/// Maps a cell value to [0, 1].
enum Normalizer {
    Linear { min: f32, range: f32 },
    Log { min: f32, range: f32 },
    EqHist { sorted: Vec<f32>, floor: f32 },
}

impl Normalizer {
    fn new(how: ShadeHow, span: Span, grid: &Grid) -> Self {
        match how {
            ShadeHow::Linear => Normalizer::Linear {
                min: span.min,
                range: span.max - span.min,
            },
            ShadeHow::Log => {
                let min = span.min.ln_1p();
                Normalizer::Log {
                    min,
                    range: span.max.ln_1p() - min,
                }
            }
            ShadeHow::EqHist => {
                let mut sorted: Vec<f32> = grid
                    .data()
                    .iter()
                    .copied()
                    .filter(|v| v.is_finite() && *v > 0.0)
                    .map(|v| v.max(span.min).min(span.max))
                    .collect();
                sorted.sort_by(f32::total_cmp);
                let floor = cdf(&sorted, sorted.first().copied().unwrap_or(0.0));
                Normalizer::EqHist { sorted, floor }
            }
        }
    }

    fn normalize(&self, v: f32) -> f32 {
        match self {
            Normalizer::Linear { min, range } => ratio(v - min, *range),
            Normalizer::Log { min, range } => ratio(v.ln_1p() - min, *range),
            Normalizer::EqHist { sorted, floor } => ratio(cdf(sorted, v) - floor, 1.0 - floor),
        }
    }
}

/// Fraction of `sorted` that is `<= v`.
fn cdf(sorted: &[f32], v: f32) -> f32 {
    if sorted.is_empty() {
        return 1.0;
    }
    sorted.partition_point(|&x| x <= v) as f32 / sorted.len() as f32
}

/// `num / den`, or full intensity when the range collapses.
fn ratio(num: f32, den: f32) -> f32 {
    if den <= f32::EPSILON {
        1.0
    } else {
        (num / den).clamp(0.0, 1.0)
    }
}

/// Colour a grid.
///
/// Cells that are zero, negative or NaN stay fully transparent. Others are
/// normalized against `span` (or the grid's own span when `None`) and looked
/// up in the colormap at full opacity.
pub fn shade(grid: &Grid, cmap: Colormap, how: ShadeHow, span: Option<Span>) -> RgbaImage {
    let mut image = RgbaImage::new(grid.width(), grid.height());

    let Some(span) = span.or_else(|| Span::of(grid)) else {
        trace!(
            width = grid.width(),
            height = grid.height(),
            "Grid holds no data, leaving image transparent"
        );
        return image;
    };

    let palette = cmap.palette();
    let normalizer = Normalizer::new(how, span, grid);
    let width = grid.width() as usize;

    for (idx, &value) in grid.data().iter().enumerate() {
        if value.is_nan() || value <= 0.0 {
            continue;
        }
        let [r, g, b] = palette.color_at(normalizer.normalize(value));
        let x = (idx % width) as u32;
        let y = (idx / width) as u32;
        image.put_pixel(x, y, Rgba([r, g, b, 255]));
    }

    image
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(width: u32, height: u32, data: &[f32]) -> Grid {
        Grid::from_vec(width, height, data.to_vec()).unwrap()
    }

    #[test]
    fn test_span_ignores_empty_cells() {
        let g = grid(2, 2, &[0.0, 3.0, 1.0, f32::NAN]);
        assert_eq!(Span::of(&g), Some(Span::new(1.0, 3.0)));
        assert_eq!(Span::of(&Grid::new(4, 4)), None);
    }

    #[test]
    fn test_span_merge() {
        let a = Some(Span::new(1.0, 4.0));
        let b = Some(Span::new(2.0, 9.0));
        assert_eq!(Span::merge(a, b), Some(Span::new(1.0, 9.0)));
        assert_eq!(Span::merge(None, b), b);
        assert_eq!(Span::merge(a, None), a);
        assert_eq!(Span::merge(None, None), None);
    }

    #[test]
    fn test_blank_grid_is_transparent() {
        let image = shade(&Grid::new(3, 2), Colormap::Fire, ShadeHow::Log, None);
        assert_eq!(image.dimensions(), (3, 2));
        assert!(image.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_linear_maps_span_to_ramp_ends() {
        let g = grid(3, 1, &[1.0, 0.0, 5.0]);
        let image = shade(&g, Colormap::Gray, ShadeHow::Linear, None);

        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(image.get_pixel(1, 0).0[3], 0);
        assert_eq!(image.get_pixel(2, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_external_span_changes_colours() {
        let g = grid(1, 1, &[5.0]);
        let own = shade(&g, Colormap::Gray, ShadeHow::Linear, None);
        let wide = shade(&g, Colormap::Gray, ShadeHow::Linear, Some(Span::new(0.0, 10.0)));

        // A single value is its own max
        assert_eq!(own.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(wide.get_pixel(0, 0).0, [128, 128, 128, 255]);
    }

    #[test]
    fn test_eq_hist_spreads_skewed_values() {
        // Mostly ones with a single large outlier
        let mut data = vec![1.0; 8];
        data.push(2.0);
        data.push(1000.0);
        let g = grid(10, 1, &data);

        let linear = shade(&g, Colormap::Gray, ShadeHow::Linear, None);
        let eq = shade(&g, Colormap::Gray, ShadeHow::EqHist, None);

        // Linearly the 2 is indistinguishable from the 1s; equalized it is not
        assert_eq!(linear.get_pixel(8, 0).0[0], linear.get_pixel(0, 0).0[0]);
        assert!(eq.get_pixel(8, 0).0[0] > eq.get_pixel(0, 0).0[0]);
        assert_eq!(eq.get_pixel(9, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_parse_how() {
        assert_eq!("eq-hist".parse::<ShadeHow>().unwrap(), ShadeHow::EqHist);
        assert_eq!("LOG".parse::<ShadeHow>().unwrap(), ShadeHow::Log);
        assert!("cubic".parse::<ShadeHow>().is_err());
    }
}
