//! Column readers for delimited text and Parquet inputs.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow_array::cast::AsArray;
use arrow_array::types::Float64Type;
use arrow_array::{Array, ArrayRef};
use arrow_schema::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ProjectionMask;
use tiler_common::{TilerError, TilerResult};
use tracing::debug;

use crate::config::{InputFormat, LoadOptions};

/// The two declared columns, row-aligned. Missing, null or unparsable cells are NaN.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawColumns {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl RawColumns {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Read the configured columns from the configured file.
pub fn read_columns(options: &LoadOptions) -> TilerResult<RawColumns> {
    match options.format {
        InputFormat::Csv => read_csv(&options.path, &options.x_column, &options.y_column),
        InputFormat::Parquet => read_parquet(&options.path, &options.x_column, &options.y_column),
    }
}

/// Read two numeric columns from a CSV file with a header row.
pub fn read_csv(path: &Path, x_column: &str, y_column: &str) -> TilerResult<RawColumns> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_error)?;

    let headers = reader.headers().map_err(csv_error)?.clone();
    let column_index = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TilerError::MissingColumn(name.to_string()))
    };
    let x_idx = column_index(x_column)?;
    let y_idx = column_index(y_column)?;

    let mut columns = RawColumns::default();
    let mut record = csv::StringRecord::new();
    while reader.read_record(&mut record).map_err(csv_error)? {
        columns.x.push(parse_cell(record.get(x_idx)));
        columns.y.push(parse_cell(record.get(y_idx)));
    }

    debug!(rows = columns.len(), path = %path.display(), "Read CSV columns");
    Ok(columns)
}

fn parse_cell(cell: Option<&str>) -> f64 {
    cell.and_then(|s| s.parse::<f64>().ok()).unwrap_or(f64::NAN)
}

fn csv_error(err: csv::Error) -> TilerError {
    match err.kind() {
        csv::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
            TilerError::InputNotFound(err.to_string())
        }
        _ => TilerError::Read(format!("CSV: {}", err)),
    }
}

/// Read two numeric columns from a Parquet file.
///
/// Only the two requested columns are decoded. Any numeric physical type is
/// cast to `f64`; nulls become NaN.
pub fn read_parquet(path: &Path, x_column: &str, y_column: &str) -> TilerResult<RawColumns> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TilerError::InputNotFound(path.display().to_string()),
        _ => TilerError::Io(e),
    })?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| TilerError::Read(format!("Parquet: {}", e)))?;

    let schema = builder.schema().clone();
    let x_idx = schema
        .index_of(x_column)
        .map_err(|_| TilerError::MissingColumn(x_column.to_string()))?;
    let y_idx = schema
        .index_of(y_column)
        .map_err(|_| TilerError::MissingColumn(y_column.to_string()))?;

    let mask = ProjectionMask::roots(builder.parquet_schema(), [x_idx, y_idx]);
    let reader = builder
        .with_projection(mask)
        .build()
        .map_err(|e| TilerError::Read(format!("Parquet: {}", e)))?;

    let mut columns = RawColumns::default();
    for batch in reader {
        let batch = batch.map_err(|e| TilerError::Read(format!("Parquet: {}", e)))?;

        let x = batch
            .column_by_name(x_column)
            .ok_or_else(|| TilerError::MissingColumn(x_column.to_string()))?;
        let y = batch
            .column_by_name(y_column)
            .ok_or_else(|| TilerError::MissingColumn(y_column.to_string()))?;

        append_f64(&mut columns.x, x)?;
        append_f64(&mut columns.y, y)?;
    }

    debug!(rows = columns.len(), path = %path.display(), "Read Parquet columns");
    Ok(columns)
}

fn append_f64(out: &mut Vec<f64>, array: &ArrayRef) -> TilerResult<()> {
    let cast: ArrayRef = if array.data_type() == &DataType::Float64 {
        Arc::clone(array)
    } else {
        arrow_cast::cast::cast(array.as_ref(), &DataType::Float64).map_err(|e| {
            TilerError::Read(format!(
                "column of type {} is not numeric: {}",
                array.data_type(),
                e
            ))
        })?
    };

    let values = cast.as_primitive::<Float64Type>();
    out.reserve(values.len());
    out.extend(values.iter().map(|v| v.unwrap_or(f64::NAN)));
    Ok(())
}
