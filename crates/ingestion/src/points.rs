//! Columnar storage for normalized planar points.

use tiler_common::Extent;

/// A set of points in planar (Web Mercator) coordinates.
///
/// Stored column-wise so extent filtering walks two contiguous `f64` slices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl PointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            xs: Vec::with_capacity(capacity),
            ys: Vec::with_capacity(capacity),
        }
    }

    /// Build from parallel columns. Extra values in the longer column are ignored.
    pub fn from_columns(mut xs: Vec<f64>, mut ys: Vec<f64>) -> Self {
        let len = xs.len().min(ys.len());
        xs.truncate(len);
        ys.truncate(len);
        Self { xs, ys }
    }

    pub fn push(&mut self, x: f64, y: f64) {
        self.xs.push(x);
        self.ys.push(y);
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }

    /// Bounding extent of all points, `None` when empty.
    pub fn extent(&self) -> Option<Extent> {
        let mut points = self.iter();
        let (x0, y0) = points.next()?;
        let mut extent = Extent::new(x0, y0, x0, y0);
        for (x, y) in points {
            extent.include(x, y);
        }
        Some(extent)
    }

    /// Points whose x and y both fall within `extent` (closed interval).
    pub fn within(&self, extent: &Extent) -> PointSet {
        let mut subset = PointSet::new();
        for (x, y) in self.iter() {
            if extent.contains_point(x, y) {
                subset.push(x, y);
            }
        }
        subset
    }
}

impl FromIterator<(f64, f64)> for PointSet {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        let mut points = PointSet::new();
        for (x, y) in iter {
            points.push(x, y);
        }
        points
    }
}
