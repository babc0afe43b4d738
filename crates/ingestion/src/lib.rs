//! Point dataset ingestion.
//!
//! Loads longitude/latitude (or pre-projected x/y) columns from delimited text
//! or Parquet files and normalizes them into a planar [`PointSet`].
//!
//! # Architecture
//!
//! - [`reader`] pulls the two declared columns out of the file as raw `f64`s
//!   (unparsable or null cells become NaN)
//! - [`normalize`] drops rows outside the projectable latitude band or with
//!   invalid values and projects the rest into Web Mercator
//! - [`PointSet`] holds the result for the lifetime of a render session

pub mod config;
pub mod normalize;
pub mod points;
pub mod reader;

pub use config::{InputFormat, LoadOptions};
pub use normalize::{normalize, NormalizeReport};
pub use points::PointSet;
pub use reader::RawColumns;

use tiler_common::{TilerError, TilerResult};
use tracing::info;

/// Read and normalize a dataset in one step.
pub fn load_dataset(options: &LoadOptions) -> TilerResult<(PointSet, NormalizeReport)> {
    if !options.path.is_file() {
        return Err(TilerError::InputNotFound(options.path.display().to_string()));
    }

    info!(
        path = %options.path.display(),
        format = %options.format,
        crs = %options.crs,
        x_column = %options.x_column,
        y_column = %options.y_column,
        "Loading dataset"
    );

    let raw = reader::read_columns(options)?;
    let (points, report) = normalize(raw, options.crs);

    info!(
        input_rows = report.input_rows,
        kept = points.len(),
        dropped_out_of_band = report.dropped_out_of_band,
        dropped_invalid = report.dropped_invalid,
        "Dataset normalized"
    );

    if points.is_empty() {
        return Err(TilerError::EmptyDataset);
    }

    Ok((points, report))
}
