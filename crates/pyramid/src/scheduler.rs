//! Supertile scheduling across zoom levels.

use std::time::{Duration, Instant};

use image::RgbaImage;
use metrics::{counter, histogram};
use renderer::Span;
use serde::{Serialize, Serializer};
use tiler_common::{SuperTile, TileCoord, TileGrid, TilerError, TilerResult};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::{ColorRanging, PyramidConfig, TilePipeline, TileWriter};

fn as_secs<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Timing and shape of one rendered zoom level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelSummary {
    pub level: u32,
    pub supertile_count: usize,
    pub tile_count: u64,
    /// Time spent in `load_data` and `rasterize`, including any statistics pass
    #[serde(serialize_with = "as_secs")]
    pub calc_stats_time: Duration,
    /// Time spent in `shade` and `post_render`
    #[serde(serialize_with = "as_secs")]
    pub render_time: Duration,
    /// Time spent slicing, encoding and writing tiles
    #[serde(serialize_with = "as_secs")]
    pub write_time: Duration,
    /// Level-wide span used for shading, if one was computed
    pub span: Option<Span>,
}

impl LevelSummary {
    pub fn total_time(&self) -> Duration {
        self.calc_stats_time + self.render_time
    }
}

/// Progress notifications sent while a session runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    LevelStarted {
        level: u32,
        supertile_count: usize,
        tile_count: u64,
    },
    SupertileDone {
        level: u32,
        /// 1-based position within the level
        index: usize,
        of: usize,
        tiles: usize,
    },
    LevelFinished(LevelSummary),
}

/// Drives a [`TilePipeline`] over every supertile of every configured level.
pub struct PyramidRenderer<P> {
    config: PyramidConfig,
    pipeline: P,
    writer: TileWriter,
    progress: Option<UnboundedSender<ProgressEvent>>,
}

impl<P: TilePipeline> PyramidRenderer<P> {
    pub fn new(config: PyramidConfig, pipeline: P) -> Self {
        let writer = TileWriter::new(config.output(), config.tile_size());
        Self {
            config,
            pipeline,
            writer,
            progress: None,
        }
    }

    /// Report progress on `tx`. A closed receiver is ignored.
    pub fn with_progress(mut self, tx: UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Lazily render level after level.
    ///
    /// The iterator stops after the first error.
    pub fn levels(&self) -> Levels<'_, P> {
        Levels {
            renderer: self,
            next: self.config.min_zoom(),
            failed: false,
        }
    }

    /// Render every level, stopping at the first error.
    pub fn render_all(&self) -> TilerResult<Vec<LevelSummary>> {
        self.levels().collect()
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.progress {
            let _ = tx.send(event);
        }
    }

    /// Load and rasterize one supertile.
    fn aggregate(&self, supertile: &SuperTile) -> TilerResult<renderer::Grid> {
        let tile_size = self.config.tile_size();
        let subset = self.pipeline.load_data(&supertile.extent)?;
        self.pipeline.rasterize(
            subset,
            &supertile.extent,
            supertile.pixel_height(tile_size),
            supertile.pixel_width(tile_size),
        )
    }

    /// Statistics pass: the union of every supertile's span.
    fn scan_span(&self, supertiles: &[SuperTile]) -> TilerResult<Option<Span>> {
        let mut span = None;
        for supertile in supertiles {
            let grid = self.aggregate(supertile)?;
            span = Span::merge(span, Span::of(&grid));
        }
        Ok(span)
    }

    /// Render one zoom level.
    pub fn render_level(&self, z: u32) -> TilerResult<LevelSummary> {
        let grid = TileGrid::new(self.config.root(), z);
        let supertiles = grid.supertiles(self.config.max_tile_dim());
        let supertile_count = supertiles.len();

        info!(
            level = z,
            supertiles = supertile_count,
            tiles = grid.tile_count(),
            "Rendering level"
        );
        self.emit(ProgressEvent::LevelStarted {
            level: z,
            supertile_count,
            tile_count: grid.tile_count(),
        });

        let mut calc_stats_time = Duration::ZERO;
        let mut render_time = Duration::ZERO;
        let mut write_time = Duration::ZERO;

        let span = match self.config.color_ranging() {
            ColorRanging::Fullscan => {
                let start = Instant::now();
                let span = self.scan_span(&supertiles)?;
                calc_stats_time += start.elapsed();
                debug!(level = z, span = ?span, "Statistics pass complete");
                span
            }
            ColorRanging::PerSupertile => None,
        };

        for (i, supertile) in supertiles.iter().enumerate() {
            let start = Instant::now();
            let aggregated = self.aggregate(supertile)?;
            let elapsed = start.elapsed();
            calc_stats_time += elapsed;
            histogram!("maptiler_calc_stats_seconds").record(elapsed.as_secs_f64());

            let start = Instant::now();
            let image = self.pipeline.shade(aggregated, span)?;
            let image = self.pipeline.post_render(image)?;
            let elapsed = start.elapsed();
            render_time += elapsed;
            histogram!("maptiler_render_seconds").record(elapsed.as_secs_f64());

            let start = Instant::now();
            let tiles = self.writer.write_supertile(supertile, &image)?;
            write_time += start.elapsed();

            counter!("maptiler_supertiles_total").increment(1);
            counter!("maptiler_tiles_written_total").increment(tiles as u64);
            self.emit(ProgressEvent::SupertileDone {
                level: z,
                index: i + 1,
                of: supertile_count,
                tiles,
            });
        }

        let summary = LevelSummary {
            level: z,
            supertile_count,
            tile_count: grid.tile_count(),
            calc_stats_time,
            render_time,
            write_time,
            span,
        };

        info!(
            level = z,
            supertiles = supertile_count,
            calc_stats_ms = calc_stats_time.as_millis() as u64,
            render_ms = render_time.as_millis() as u64,
            write_ms = write_time.as_millis() as u64,
            "Level complete"
        );
        self.emit(ProgressEvent::LevelFinished(summary.clone()));

        Ok(summary)
    }
}

/// Iterator over rendered levels, see [`PyramidRenderer::levels`].
pub struct Levels<'a, P> {
    renderer: &'a PyramidRenderer<P>,
    next: u32,
    failed: bool,
}

impl<P: TilePipeline> Iterator for Levels<'_, P> {
    type Item = TilerResult<LevelSummary>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next > self.renderer.config.max_zoom() {
            return None;
        }
        let z = self.next;
        self.next += 1;

        let result = self.renderer.render_level(z);
        if let Err(e) = &result {
            warn!(level = z, error = %e, "Render session aborted");
            self.failed = true;
        }
        Some(result)
    }
}

/// Render one tile of `grid` on demand, shaded against its own span.
pub fn render_tile<P: TilePipeline>(
    pipeline: &P,
    grid: &TileGrid,
    coord: TileCoord,
    tile_size: u32,
) -> TilerResult<RgbaImage> {
    let supertile = grid.single_tile(coord).ok_or_else(|| {
        TilerError::InvalidArgument(format!("tile {} is outside the zoom {} grid", coord, grid.zoom()))
    })?;

    let subset = pipeline.load_data(&supertile.extent)?;
    let aggregated = pipeline.rasterize(subset, &supertile.extent, tile_size, tile_size)?;
    let image = pipeline.shade(aggregated, None)?;
    pipeline.post_render(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PointPipeline;
    use ingestion::PointSet;
    use std::sync::Arc;
    use tiler_common::Extent;

    fn three_points() -> Arc<PointSet> {
        Arc::new(
            [(0.0, 0.0), (100.0, 100.0), (-100.0, -100.0)]
                .into_iter()
                .collect(),
        )
    }

    #[test]
    fn test_total_time_excludes_write() {
        let summary = LevelSummary {
            level: 0,
            supertile_count: 1,
            tile_count: 1,
            calc_stats_time: Duration::from_millis(30),
            render_time: Duration::from_millis(12),
            write_time: Duration::from_millis(500),
            span: None,
        };
        assert_eq!(summary.total_time(), Duration::from_millis(42));
    }

    #[test]
    fn test_summary_serializes_seconds() {
        let summary = LevelSummary {
            level: 2,
            supertile_count: 1,
            tile_count: 16,
            calc_stats_time: Duration::from_millis(1500),
            render_time: Duration::ZERO,
            write_time: Duration::ZERO,
            span: Some(Span::new(1.0, 3.0)),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["calc_stats_time"], 1.5);
        assert_eq!(json["span"]["max"], 3.0);
    }

    #[test]
    fn test_render_tile_outside_grid() {
        let pipeline = PointPipeline::new(three_points());
        let grid = TileGrid::new(Extent::new(-100.0, -100.0, 100.0, 100.0), 1);

        assert!(render_tile(&pipeline, &grid, TileCoord::new(1, 1, 1), 8).is_ok());
        assert!(matches!(
            render_tile(&pipeline, &grid, TileCoord::new(1, 2, 0), 8),
            Err(TilerError::InvalidArgument(_))
        ));
    }
}
