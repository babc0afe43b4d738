//! Benchmark mode: repeated static renders with a per-level timing report.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use pyramid::{LevelSummary, PointPipeline, PyramidConfig};
use serde::Serialize;
use tracing::info;

use crate::config::BenchmarkArgs;
use crate::load_points;
use crate::static_mode::render_pyramid;

/// One report line: a level of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkRow {
    pub level: u32,
    pub supertile_count: usize,
    pub calc_stats_time: f64,
    pub render_time: f64,
    pub total_time: f64,
}

fn round2(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}

impl From<&LevelSummary> for BenchmarkRow {
    fn from(s: &LevelSummary) -> Self {
        Self {
            level: s.level,
            supertile_count: s.supertile_count,
            calc_stats_time: round2(s.calc_stats_time.as_secs_f64()),
            render_time: round2(s.render_time.as_secs_f64()),
            total_time: round2(s.total_time().as_secs_f64()),
        }
    }
}

/// Output directory for run `n`.
pub fn run_dir(output: &Path, n: u32) -> std::path::PathBuf {
    output.join(format!("run_{}", n))
}

pub async fn run(args: BenchmarkArgs) -> Result<()> {
    let color_ranging = args.pyramid.validate()?;
    let settings = args.dataset.resolve()?;
    let points = load_points(settings.load).await?;
    let root = points
        .extent()
        .ok_or(tiler_common::TilerError::EmptyDataset)?;

    let file = File::create(&args.report)
        .with_context(|| format!("failed to create {}", args.report.display()))?;
    let mut report = csv::Writer::from_writer(file);

    info!(
        runs = args.runs,
        min_zoom = args.pyramid.min_zoom,
        max_zoom = args.pyramid.max_zoom,
        report = %args.report.display(),
        "Starting benchmark"
    );

    for n in 0..args.runs {
        let config = PyramidConfig::new(
            root,
            args.pyramid.min_zoom,
            args.pyramid.max_zoom,
            run_dir(&args.pyramid.output, n),
        )?
        .with_color_ranging(color_ranging);
        let pipeline = PointPipeline::new(points.clone())
            .with_bounds(config.root())
            .with_colormap(settings.colormap)
            .with_shade_how(settings.how);

        let summaries = render_pyramid(config, pipeline).await?;
        for summary in &summaries {
            report.serialize(BenchmarkRow::from(summary))?;
        }
        report.flush()?;

        let total: f64 = summaries
            .iter()
            .map(|s| s.total_time().as_secs_f64())
            .sum();
        info!(run = n, seconds = total, "Benchmark run complete");
    }

    Ok(())
}
