//! Static mode: render the tile pyramid to disk.

use anyhow::{Context, Result};
use pyramid::{
    LevelSummary, PointPipeline, ProgressEvent, PyramidConfig, PyramidRenderer, TilePipeline,
};
use tiler_common::TilerError;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::StaticArgs;
use crate::load_points;

pub async fn run(args: StaticArgs) -> Result<Vec<LevelSummary>> {
    // Fail on bad options before touching the dataset
    let color_ranging = args.pyramid.validate()?;
    let settings = args.dataset.resolve()?;

    let points = load_points(settings.load).await?;
    let root = points.extent().ok_or(TilerError::EmptyDataset)?;

    let config = PyramidConfig::new(
        root,
        args.pyramid.min_zoom,
        args.pyramid.max_zoom,
        &args.pyramid.output,
    )?
    .with_color_ranging(color_ranging);

    info!(
        output = %args.pyramid.output.display(),
        min_zoom = config.min_zoom(),
        max_zoom = config.max_zoom(),
        points = points.len(),
        color_map = %settings.colormap,
        color_ranging = %color_ranging,
        "Rendering static tile pyramid"
    );

    let pipeline = PointPipeline::new(points)
        .with_bounds(config.root())
        .with_colormap(settings.colormap)
        .with_shade_how(settings.how);

    let summaries = render_pyramid(config, pipeline).await?;

    let tiles: u64 = summaries.iter().map(|s| s.tile_count).sum();
    info!(levels = summaries.len(), tiles = tiles, "Static render complete");
    Ok(summaries)
}

/// Run a render session on a blocking worker and log its progress.
pub async fn render_pyramid<P>(config: PyramidConfig, pipeline: P) -> Result<Vec<LevelSummary>>
where
    P: TilePipeline + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let task = tokio::task::spawn_blocking(move || {
        PyramidRenderer::new(config, pipeline)
            .with_progress(tx)
            .render_all()
    });

    // Ends once the renderer, and with it the sender, is dropped
    while let Some(event) = rx.recv().await {
        log_progress(&event);
    }

    let summaries = task.await.context("render task failed")??;
    Ok(summaries)
}

fn log_progress(event: &ProgressEvent) {
    match event {
        ProgressEvent::LevelStarted {
            level,
            supertile_count,
            tile_count,
        } => debug!(level, supertile_count, tile_count, "Level started"),
        ProgressEvent::SupertileDone {
            level,
            index,
            of,
            tiles,
        } => debug!(level, index, of, tiles, "Supertile rendered"),
        ProgressEvent::LevelFinished(summary) => info!(
            level = summary.level,
            supertile_count = summary.supertile_count,
            span = ?summary.span,
            seconds = summary.total_time().as_secs_f64(),
            "Rendered {} supertiles for zoom level {}",
            summary.supertile_count,
            summary.level
        ),
    }
}
