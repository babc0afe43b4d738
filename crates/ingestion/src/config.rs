//! Input configuration: file format, columns and coordinate system.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tiler_common::{CoordinateSystem, TilerError};

/// Supported input file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Row-oriented delimited text with a header row.
    Csv,
    /// Columnar binary (Apache Parquet).
    Parquet,
}

impl InputFormat {
    /// Guess the format from a file extension.
    pub fn from_extension(path: &std::path::Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" | "txt" => Some(InputFormat::Csv),
            "parquet" | "parq" => Some(InputFormat::Parquet),
            _ => None,
        }
    }
}

impl FromStr for InputFormat {
    type Err = TilerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(InputFormat::Csv),
            "parquet" | "parq" => Ok(InputFormat::Parquet),
            _ => Err(TilerError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Csv => write!(f, "CSV"),
            InputFormat::Parquet => write!(f, "Parquet"),
        }
    }
}

/// Everything needed to turn an input file into a [`crate::PointSet`].
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub path: PathBuf,
    pub format: InputFormat,
    /// Longitude (geographic) or x (projected) column name
    pub x_column: String,
    /// Latitude (geographic) or y (projected) column name
    pub y_column: String,
    pub crs: CoordinateSystem,
}

impl LoadOptions {
    /// Geographic input with the conventional `longitude`/`latitude` columns.
    pub fn new(path: impl Into<PathBuf>, format: InputFormat) -> Self {
        Self {
            path: path.into(),
            format,
            x_column: "longitude".to_string(),
            y_column: "latitude".to_string(),
            crs: CoordinateSystem::Wgs84,
        }
    }

    pub fn with_columns(mut self, x_column: impl Into<String>, y_column: impl Into<String>) -> Self {
        self.x_column = x_column.into();
        self.y_column = y_column.into();
        self
    }

    pub fn with_crs(mut self, crs: CoordinateSystem) -> Self {
        self.crs = crs;
        self
    }
}
