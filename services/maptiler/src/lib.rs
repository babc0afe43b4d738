//! Map tiler service library.
//!
//! Wires dataset loading, the tile pyramid renderer and the live tile server
//! behind the `maptiler` command line.

pub mod benchmark;
pub mod config;
pub mod server;
pub mod static_mode;

use std::sync::Arc;

use anyhow::{Context, Result};
use ingestion::{load_dataset, LoadOptions, PointSet};
use tiler_common::{ErrorClass, TilerError};

use crate::config::Command;

/// Exit status for configuration problems detected before rendering.
pub const EXIT_CONFIG: u8 = 2;
/// Exit status for failures while rendering or serving.
pub const EXIT_FAILURE: u8 = 1;

/// Run the selected mode to completion.
pub async fn run(command: Command) -> Result<()> {
    match command {
        Command::Static(args) => static_mode::run(args).await.map(|_| ()),
        Command::Dynamic(args) => server::serve(args).await,
        Command::Benchmark(args) => benchmark::run(args).await,
    }
}

/// Map an error to the process exit status.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<TilerError>() {
        Some(e) if e.class() == ErrorClass::Configuration => EXIT_CONFIG,
        _ => EXIT_FAILURE,
    }
}

/// Load and normalize the dataset on a blocking worker.
pub async fn load_points(options: LoadOptions) -> Result<Arc<PointSet>> {
    let path = options.path.display().to_string();
    let (points, _report) = tokio::task::spawn_blocking(move || load_dataset(&options))
        .await
        .context("dataset loader task failed")?
        .with_context(|| format!("failed to load {}", path))?;
    Ok(Arc::new(points))
}
