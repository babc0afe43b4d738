//! Point-count aggregation onto a pixel canvas.

use tiler_common::Extent;

/// A `width × height` aggregate in row-major order.
///
/// Row 0 covers the max-y edge of the extent it was rasterized from, so the
/// grid maps onto an image without flipping.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl Grid {
    /// All-zero grid.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        }
    }

    /// Wrap existing row-major values. Returns `None` if the length does not
    /// match the dimensions.
    pub fn from_vec(width: u32, height: u32, data: Vec<f32>) -> Option<Self> {
        if data.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn get(&self, col: u32, row: u32) -> Option<f32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.data
            .get(row as usize * self.width as usize + col as usize)
            .copied()
    }

    fn add(&mut self, col: u32, row: u32, value: f32) {
        let idx = row as usize * self.width as usize + col as usize;
        self.data[idx] += value;
    }

    /// Sum of all cells.
    pub fn total(&self) -> f64 {
        self.data.iter().map(|&v| v as f64).sum()
    }
}

/// Index of the pixel containing `v` along an axis of `n` pixels starting at
/// `lo` and `len` units long. Values on the far edge land in the last pixel.
fn bin(v: f64, lo: f64, len: f64, n: u32) -> u32 {
    if len <= 0.0 || n == 0 {
        return 0;
    }
    let idx = ((v - lo) / len * n as f64).floor();
    idx.clamp(0.0, (n - 1) as f64) as u32
}

/// Count points per pixel over `extent`.
///
/// Points outside the closed extent are ignored. A point exactly on the max-x
/// or min-y edge is counted in the last column or row.
pub fn rasterize_points<I>(points: I, extent: &Extent, height: u32, width: u32) -> Grid
where
    I: IntoIterator<Item = (f64, f64)>,
{
    rasterize_points_within(points, extent, extent, height, width)
}

/// Count points per pixel over `extent`, one cell of a tiling of `bounds`.
///
/// Cells own their min-x and max-y edges, matching how pixels are binned
/// inside one canvas. A point on the max-x or min-y edge of `extent` is
/// counted only when that edge is also an edge of `bounds`, so a point on a
/// seam between two neighbouring extents is drawn exactly once.
pub fn rasterize_points_within<I>(
    points: I,
    extent: &Extent,
    bounds: &Extent,
    height: u32,
    width: u32,
) -> Grid
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut grid = Grid::new(width, height);
    if width == 0 || height == 0 {
        return grid;
    }

    let own_max_x = extent.max_x >= bounds.max_x;
    let own_min_y = extent.min_y <= bounds.min_y;

    let w = extent.width();
    let h = extent.height();
    for (x, y) in points {
        if !extent.contains_point(x, y) {
            continue;
        }
        if (x == extent.max_x && !own_max_x) || (y == extent.min_y && !own_min_y) {
            continue;
        }
        let col = bin(x, extent.min_x, w, width);
        // Rows count down from the top edge
        let row = bin(extent.max_y - y, 0.0, h, height);
        grid.add(col, row, 1.0);
    }

    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_points_on_one_pixel_canvas() {
        let extent = Extent::new(-100.0, -100.0, 100.0, 100.0);
        let points = [(0.0, 0.0), (100.0, 100.0), (-100.0, -100.0)];
        let grid = rasterize_points(points, &extent, 1, 1);
        assert_eq!(grid.data(), &[3.0]);
    }

    #[test]
    fn test_corners_land_in_corner_pixels() {
        let extent = Extent::new(0.0, 0.0, 4.0, 4.0);
        let points = [(0.0, 4.0), (4.0, 0.0), (4.0, 4.0), (0.0, 0.0)];
        let grid = rasterize_points(points, &extent, 4, 4);

        assert_eq!(grid.get(0, 0), Some(1.0)); // top-left
        assert_eq!(grid.get(3, 3), Some(1.0)); // bottom-right
        assert_eq!(grid.get(3, 0), Some(1.0)); // top-right
        assert_eq!(grid.get(0, 3), Some(1.0)); // bottom-left
        assert_eq!(grid.total(), 4.0);
    }

    #[test]
    fn test_points_outside_ignored() {
        let extent = Extent::new(0.0, 0.0, 1.0, 1.0);
        let grid = rasterize_points([(2.0, 0.5), (0.5, -0.1), (0.75, 0.75)], &extent, 2, 2);
        assert_eq!(grid.total(), 1.0);
        assert_eq!(grid.get(1, 0), Some(1.0));
    }

    #[test]
    fn test_seam_point_drawn_once() {
        let bounds = Extent::new(0.0, 0.0, 2.0, 2.0);
        let left = Extent::new(0.0, 1.0, 1.0, 2.0);
        let right = Extent::new(1.0, 1.0, 2.0, 2.0);
        let below = Extent::new(0.0, 0.0, 1.0, 1.0);
        let seam = [(1.0, 1.5), (0.5, 1.0)];

        let count = |extent: &Extent| rasterize_points_within(seam, extent, &bounds, 2, 2).total();
        // x seam belongs to the right cell, y seam to the cell below
        assert_eq!(count(&left), 0.0);
        assert_eq!(count(&right), 1.0);
        assert_eq!(count(&below), 1.0);

        // Outer edges of the bounds are always kept
        let corner = [(2.0, 0.0)];
        let lower_right = Extent::new(1.0, 0.0, 2.0, 1.0);
        let grid = rasterize_points_within(corner, &lower_right, &bounds, 2, 2);
        assert_eq!(grid.get(1, 1), Some(1.0));
    }

    #[test]
    fn test_empty_input_is_zero() {
        let grid = rasterize_points(
            std::iter::empty(),
            &Extent::new(0.0, 0.0, 1.0, 1.0),
            256,
            512,
        );
        assert_eq!((grid.width(), grid.height()), (512, 256));
        assert_eq!(grid.total(), 0.0);
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(Grid::from_vec(2, 2, vec![0.0; 4]).is_some());
        assert!(Grid::from_vec(2, 2, vec![0.0; 3]).is_none());
    }
}
