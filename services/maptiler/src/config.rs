//! Command line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ingestion::{InputFormat, LoadOptions};
use pyramid::{validate_zoom_range, ColorRanging};
use renderer::{Colormap, ShadeHow};
use tiler_common::{CoordinateSystem, TilerError, TilerResult};

/// Datashader-style map tiler
#[derive(Parser, Debug)]
#[command(name = "maptiler")]
#[command(about = "Render point datasets into a static tile pyramid or serve them live")]
pub struct Cli {
    /// Log level
    #[arg(long, default_value = "info", env = "MAPTILER_LOG_LEVEL", global = true)]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "MAPTILER_LOG_JSON", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Render mode, chosen once per invocation.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a tile pyramid to disk and exit
    Static(StaticArgs),
    /// Serve tiles rendered on demand until interrupted
    Dynamic(DynamicArgs),
    /// Repeat a static render and record per-level timings as CSV
    Benchmark(BenchmarkArgs),
}

/// Input dataset and styling, shared by every mode.
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// Input file (CSV with a header row, or Parquet)
    #[arg(env = "MAPTILER_INPUT")]
    pub input: PathBuf,

    /// Input format: csv or parquet (guessed from the extension if omitted)
    #[arg(long, env = "MAPTILER_FILE_FORMAT")]
    pub file_format: Option<String>,

    /// Coordinate system of the input columns: WGS84 or "Web Mercator"
    #[arg(long, default_value = "WGS84", env = "MAPTILER_CRS")]
    pub crs: String,

    /// Column holding longitude (or x for projected input)
    #[arg(long, default_value = "longitude", env = "MAPTILER_LONGITUDE")]
    pub longitude: String,

    /// Column holding latitude (or y for projected input)
    #[arg(long, default_value = "latitude", env = "MAPTILER_LATITUDE")]
    pub latitude: String,

    /// Colormap: fire, bgy, bgyw, kbc, blues, bmw, bmy, kgy, gray, dimgray, kb, kg, kr
    #[arg(long, default_value = "fire", env = "MAPTILER_COLOR_MAP")]
    pub color_map: String,

    /// Value scaling: linear, log or eq-hist
    #[arg(long, default_value = "log", env = "MAPTILER_SHADE")]
    pub shade: String,
}

/// Validated dataset settings.
#[derive(Debug, Clone)]
pub struct DatasetSettings {
    pub load: LoadOptions,
    pub colormap: Colormap,
    pub how: ShadeHow,
}

impl DatasetArgs {
    /// Parse every string option, failing on the first unknown value.
    pub fn resolve(&self) -> TilerResult<DatasetSettings> {
        let format = match &self.file_format {
            Some(f) => f.parse::<InputFormat>()?,
            None => InputFormat::from_extension(&self.input).ok_or_else(|| {
                TilerError::UnsupportedFormat(format!(
                    "cannot infer format of {}; pass --file-format",
                    self.input.display()
                ))
            })?,
        };
        let crs = CoordinateSystem::parse(&self.crs)?;

        let load = LoadOptions::new(&self.input, format)
            .with_columns(&self.longitude, &self.latitude)
            .with_crs(crs);

        Ok(DatasetSettings {
            load,
            colormap: self.color_map.parse()?,
            how: self.shade.parse()?,
        })
    }
}

/// Zoom range and output for a pyramid render.
#[derive(Args, Debug, Clone)]
pub struct PyramidArgs {
    /// Lowest zoom level to render (0..=14)
    #[arg(long, default_value = "0", env = "MAPTILER_MIN_ZOOM")]
    pub min_zoom: u32,

    /// Highest zoom level to render (0..=14)
    #[arg(long, default_value = "0", env = "MAPTILER_MAX_ZOOM")]
    pub max_zoom: u32,

    /// Output directory for the tile pyramid
    #[arg(short, long, default_value = "tiles", env = "MAPTILER_OUTPUT")]
    pub output: PathBuf,

    /// Span per level (fullscan) or per supertile (per-supertile)
    #[arg(long, default_value = "fullscan", env = "MAPTILER_COLOR_RANGING")]
    pub color_ranging: String,
}

impl PyramidArgs {
    pub fn validate(&self) -> TilerResult<ColorRanging> {
        validate_zoom_range(self.min_zoom, self.max_zoom)?;
        self.color_ranging.parse()
    }
}

#[derive(Args, Debug, Clone)]
pub struct StaticArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    #[command(flatten)]
    pub pyramid: PyramidArgs,
}

#[derive(Args, Debug, Clone)]
pub struct DynamicArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Listen address
    #[arg(short, long, default_value = "127.0.0.1:5006", env = "MAPTILER_LISTEN")]
    pub listen: String,
}

impl DynamicArgs {
    pub fn listen_addr(&self) -> TilerResult<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| TilerError::InvalidArgument(format!("listen address '{}': {}", self.listen, e)))
    }
}

#[derive(Args, Debug, Clone)]
pub struct BenchmarkArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    #[command(flatten)]
    pub pyramid: PyramidArgs,

    /// Number of repeated renders; run n writes to <output>/run_<n>
    #[arg(long, default_value = "10", env = "MAPTILER_RUNS")]
    pub runs: u32,

    /// CSV file receiving one row per level per run
    #[arg(long, default_value = "tile_rendering_benchmark.csv", env = "MAPTILER_REPORT")]
    pub report: PathBuf,
}
