//! Planar extents (axis-aligned bounding boxes).

use serde::{Deserialize, Serialize};

use crate::TilerError;

/// Span, in planar units, given to a zero-width axis of a root extent.
///
/// Zero-area extents (all points identical, or all on one line) are padded
/// symmetrically to this span before tiling.
pub const MIN_EXTENT_SPAN: f64 = 1.0;

/// An axis-aligned bounding box in planar projection units.
///
/// Invariant: `min_x <= max_x` and `min_y <= max_y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// Create a new extent from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Create an extent, rejecting inverted or non-finite corners.
    pub fn try_new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self, TilerError> {
        let corners = [min_x, min_y, max_x, max_y];
        if corners.iter().any(|v| !v.is_finite()) {
            return Err(TilerError::InvalidExtent(format!(
                "non-finite corner in ({}, {}, {}, {})",
                min_x, min_y, max_x, max_y
            )));
        }
        if min_x > max_x || min_y > max_y {
            return Err(TilerError::InvalidExtent(format!(
                "min exceeds max in ({}, {}, {}, {})",
                min_x, min_y, max_x, max_y
            )));
        }
        Ok(Self::new(min_x, min_y, max_x, max_y))
    }

    /// Width of the extent in planar units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the extent in planar units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// True if either axis has zero span.
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Closed-interval containment on both axes.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Smallest extent covering both.
    pub fn union(&self, other: &Extent) -> Extent {
        Extent {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grow the extent to include a point.
    pub fn include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Pad each zero-width axis to [`MIN_EXTENT_SPAN`], centered on its value.
    pub fn padded_to_min_span(&self) -> Extent {
        if !self.is_degenerate() {
            return *self;
        }
        let (min_x, max_x) = pad_axis(self.min_x, self.max_x);
        let (min_y, max_y) = pad_axis(self.min_y, self.max_y);
        Extent::new(min_x, min_y, max_x, max_y)
    }
}

fn pad_axis(min: f64, max: f64) -> (f64, f64) {
    if max > min {
        return (min, max);
    }
    let center = (min + max) / 2.0;
    let half = MIN_EXTENT_SPAN / 2.0;
    (center - half, center + half)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_closed() {
        let extent = Extent::new(0.0, 0.0, 10.0, 10.0);
        assert!(extent.contains_point(0.0, 0.0));
        assert!(extent.contains_point(10.0, 10.0));
        assert!(!extent.contains_point(10.000001, 5.0));
    }

    #[test]
    fn test_union() {
        let a = Extent::new(0.0, 0.0, 1.0, 1.0);
        let b = Extent::new(1.0, -1.0, 2.0, 0.5);
        assert_eq!(a.union(&b), Extent::new(0.0, -1.0, 2.0, 1.0));
    }

    #[test]
    fn test_padding_degenerate() {
        let point = Extent::new(5.0, 7.0, 5.0, 7.0);
        assert!(point.is_degenerate());

        let padded = point.padded_to_min_span();
        assert_eq!(padded, Extent::new(4.5, 6.5, 5.5, 7.5));
        assert!(!padded.is_degenerate());

        let wide = Extent::new(0.0, 3.0, 100.0, 3.0).padded_to_min_span();
        assert_eq!(wide.min_x, 0.0);
        assert_eq!(wide.max_x, 100.0);
        assert_eq!(wide.height(), MIN_EXTENT_SPAN);
    }

    #[test]
    fn test_narrow_axis_is_not_padded() {
        let narrow = Extent::new(0.0, 0.0, 0.25, 0.5);
        assert_eq!(narrow.padded_to_min_span(), narrow);
    }
}
