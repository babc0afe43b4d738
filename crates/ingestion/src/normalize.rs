//! Coordinate normalization into planar Web Mercator points.

use projection::{in_latitude_band, lnglat_to_meters};
use tiler_common::CoordinateSystem;

use crate::{PointSet, RawColumns};

/// Row accounting for one normalization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub input_rows: usize,
    /// Geographic rows with latitude outside [-85.06, 85.06]
    pub dropped_out_of_band: usize,
    /// Rows with a missing, null or non-finite value
    pub dropped_invalid: usize,
}

impl NormalizeReport {
    pub fn kept(&self) -> usize {
        self.input_rows - self.dropped_out_of_band - self.dropped_invalid
    }
}

/// Turn raw columns into planar `x`/`y` points.
///
/// Geographic input is filtered to the projectable latitude band and then
/// projected. Pre-projected input is passed through. Either way, rows with a
/// non-finite value are dropped.
pub fn normalize(raw: RawColumns, crs: CoordinateSystem) -> (PointSet, NormalizeReport) {
    let mut report = NormalizeReport {
        input_rows: raw.len(),
        ..Default::default()
    };
    let mut points = PointSet::with_capacity(raw.len());

    for (a, b) in raw.x.into_iter().zip(raw.y) {
        if !a.is_finite() || !b.is_finite() {
            report.dropped_invalid += 1;
            continue;
        }

        match crs {
            CoordinateSystem::Wgs84 => {
                if !in_latitude_band(b) {
                    report.dropped_out_of_band += 1;
                    continue;
                }
                let (x, y) = lnglat_to_meters(a, b);
                points.push(x, y);
            }
            CoordinateSystem::WebMercator => points.push(a, b),
        }
    }

    (points, report)
}
