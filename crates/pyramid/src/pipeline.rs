//! The four-stage pipeline every supertile runs through.

use std::marker::PhantomData;
use std::sync::Arc;

use image::RgbaImage;
use ingestion::PointSet;
use renderer::{rasterize_points_within, shade, Colormap, Grid, ShadeHow, Span};
use tiler_common::{Extent, TilerResult};

/// Stages applied to one supertile, in order:
/// `load_data → rasterize → shade → post_render`.
///
/// Each stage takes ownership of the previous stage's output. An error from
/// any stage aborts the render session.
pub trait TilePipeline {
    /// Records selected for one supertile.
    type Subset;

    /// Select every record whose `x` and `y` lie in the closed extent.
    fn load_data(&self, extent: &Extent) -> TilerResult<Self::Subset>;

    /// Aggregate a subset onto a `height × width` canvas covering `extent`.
    fn rasterize(
        &self,
        subset: Self::Subset,
        extent: &Extent,
        height: u32,
        width: u32,
    ) -> TilerResult<Grid>;

    /// Colour a grid. `span` is the level-wide value range when one was
    /// computed, otherwise the grid's own range applies.
    fn shade(&self, grid: Grid, span: Option<Span>) -> TilerResult<RgbaImage>;

    fn post_render(&self, image: RgbaImage) -> TilerResult<RgbaImage> {
        Ok(image)
    }
}

impl<P: TilePipeline + ?Sized> TilePipeline for Arc<P> {
    type Subset = P::Subset;

    fn load_data(&self, extent: &Extent) -> TilerResult<Self::Subset> {
        (**self).load_data(extent)
    }

    fn rasterize(
        &self,
        subset: Self::Subset,
        extent: &Extent,
        height: u32,
        width: u32,
    ) -> TilerResult<Grid> {
        (**self).rasterize(subset, extent, height, width)
    }

    fn shade(&self, grid: Grid, span: Option<Span>) -> TilerResult<RgbaImage> {
        (**self).shade(grid, span)
    }

    fn post_render(&self, image: RgbaImage) -> TilerResult<RgbaImage> {
        (**self).post_render(image)
    }
}

/// Count-aggregating pipeline over an in-memory point set.
///
/// Extents passed to `rasterize` are taken as cells of a tiling of `bounds`
/// (the padded data extent unless overridden), so a point on a seam between
/// two supertiles is counted by one of them only.
#[derive(Debug, Clone)]
pub struct PointPipeline {
    points: Arc<PointSet>,
    bounds: Option<Extent>,
    colormap: Colormap,
    how: ShadeHow,
}

impl PointPipeline {
    pub fn new(points: Arc<PointSet>) -> Self {
        let bounds = points.extent().map(|e| e.padded_to_min_span());
        Self {
            points,
            bounds,
            colormap: Colormap::default(),
            how: ShadeHow::default(),
        }
    }

    /// Root extent of the tiling the pipeline renders cells of.
    pub fn with_bounds(mut self, bounds: Extent) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = colormap;
        self
    }

    pub fn with_shade_how(mut self, how: ShadeHow) -> Self {
        self.how = how;
        self
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }
}

impl TilePipeline for PointPipeline {
    type Subset = PointSet;

    fn load_data(&self, extent: &Extent) -> TilerResult<PointSet> {
        Ok(self.points.within(extent))
    }

    fn rasterize(
        &self,
        subset: PointSet,
        extent: &Extent,
        height: u32,
        width: u32,
    ) -> TilerResult<Grid> {
        let bounds = self.bounds.unwrap_or(*extent);
        Ok(rasterize_points_within(
            subset.iter(),
            extent,
            &bounds,
            height,
            width,
        ))
    }

    fn shade(&self, grid: Grid, span: Option<Span>) -> TilerResult<RgbaImage> {
        Ok(shade(&grid, self.colormap, self.how, span))
    }
}

fn identity(image: RgbaImage) -> TilerResult<RgbaImage> {
    Ok(image)
}

/// A pipeline assembled from closures.
///
/// # Example
///
/// ```
/// use pyramid::{FnPipeline, TilePipeline};
/// use renderer::{Grid, Span};
/// use tiler_common::Extent;
///
/// let pipeline = FnPipeline::new(
///     |_extent: &Extent| Ok(Vec::<(f64, f64)>::new()),
///     |_subset: Vec<(f64, f64)>, _extent: &Extent, h: u32, w: u32| Ok(Grid::new(w, h)),
///     |grid: Grid, _span: Option<Span>| Ok(image::RgbaImage::new(grid.width(), grid.height())),
/// );
/// let extent = Extent::new(0.0, 0.0, 1.0, 1.0);
/// let subset = pipeline.load_data(&extent).unwrap();
/// let grid = pipeline.rasterize(subset, &extent, 2, 4).unwrap();
/// assert_eq!(pipeline.shade(grid, None).unwrap().dimensions(), (4, 2));
/// ```
pub struct FnPipeline<T, L, R, S, Q = fn(RgbaImage) -> TilerResult<RgbaImage>> {
    load: L,
    rasterize: R,
    shade: S,
    post: Q,
    _subset: PhantomData<fn() -> T>,
}

impl<T, L, R, S> FnPipeline<T, L, R, S>
where
    L: Fn(&Extent) -> TilerResult<T>,
    R: Fn(T, &Extent, u32, u32) -> TilerResult<Grid>,
    S: Fn(Grid, Option<Span>) -> TilerResult<RgbaImage>,
{
    pub fn new(load: L, rasterize: R, shade: S) -> Self {
        Self {
            load,
            rasterize,
            shade,
            post: identity,
            _subset: PhantomData,
        }
    }
}

impl<T, L, R, S, Q> FnPipeline<T, L, R, S, Q> {
    pub fn with_post_render<Q2>(self, post: Q2) -> FnPipeline<T, L, R, S, Q2>
    where
        Q2: Fn(RgbaImage) -> TilerResult<RgbaImage>,
    {
        FnPipeline {
            load: self.load,
            rasterize: self.rasterize,
            shade: self.shade,
            post,
            _subset: PhantomData,
        }
    }
}

impl<T, L, R, S, Q> TilePipeline for FnPipeline<T, L, R, S, Q>
where
    L: Fn(&Extent) -> TilerResult<T>,
    R: Fn(T, &Extent, u32, u32) -> TilerResult<Grid>,
    S: Fn(Grid, Option<Span>) -> TilerResult<RgbaImage>,
    Q: Fn(RgbaImage) -> TilerResult<RgbaImage>,
{
    type Subset = T;

    fn load_data(&self, extent: &Extent) -> TilerResult<T> {
        (self.load)(extent)
    }

    fn rasterize(&self, subset: T, extent: &Extent, height: u32, width: u32) -> TilerResult<Grid> {
        (self.rasterize)(subset, extent, height, width)
    }

    fn shade(&self, grid: Grid, span: Option<Span>) -> TilerResult<RgbaImage> {
        (self.shade)(grid, span)
    }

    fn post_render(&self, image: RgbaImage) -> TilerResult<RgbaImage> {
        (self.post)(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiler_common::TilerError;

    #[test]
    fn test_point_pipeline_stages() {
        let points: PointSet = [(0.0, 0.0), (100.0, 100.0), (-100.0, -100.0), (500.0, 0.0)]
            .into_iter()
            .collect();
        let extent = Extent::new(-100.0, -100.0, 100.0, 100.0);
        let pipeline = PointPipeline::new(Arc::new(points)).with_bounds(extent);

        let subset = pipeline.load_data(&extent).unwrap();
        assert_eq!(subset.len(), 3);

        let grid = pipeline.rasterize(subset, &extent, 1, 1).unwrap();
        assert_eq!(grid.data(), &[3.0]);

        let image = pipeline.shade(grid, None).unwrap();
        assert_eq!(image.get_pixel(0, 0).0[3], 255);

        let image = pipeline.post_render(image).unwrap();
        assert_eq!(image.dimensions(), (1, 1));
    }

    #[test]
    fn test_point_on_supertile_seam_counted_once() {
        let points: PointSet = [(0.0, 0.0), (-10.0, -10.0), (10.0, 10.0)]
            .into_iter()
            .collect();
        let pipeline = PointPipeline::new(Arc::new(points));

        let halves = [
            Extent::new(-10.0, -10.0, 0.0, 10.0),
            Extent::new(0.0, -10.0, 10.0, 10.0),
        ];
        let counts: Vec<f64> = halves
            .iter()
            .map(|extent| {
                let subset = pipeline.load_data(extent).unwrap();
                pipeline.rasterize(subset, extent, 4, 4).unwrap().total()
            })
            .collect();

        // Both halves load the origin, only the right one draws it
        assert_eq!(counts, vec![1.0, 2.0]);
    }

    #[test]
    fn test_fn_pipeline_post_render() {
        let pipeline = FnPipeline::new(
            |_: &Extent| Ok(()),
            |_: (), _: &Extent, h: u32, w: u32| Ok(Grid::new(w, h)),
            |grid: Grid, _: Option<Span>| Ok(RgbaImage::new(grid.width(), grid.height())),
        )
        .with_post_render(|_: RgbaImage| Err(TilerError::stage("post_render", "nope")));

        let image = RgbaImage::new(1, 1);
        assert!(matches!(
            pipeline.post_render(image),
            Err(TilerError::Stage { stage: "post_render", .. })
        ));
    }
}
