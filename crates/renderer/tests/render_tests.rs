//! Tests for rasterize + shade working together.

use renderer::{rasterize_points, shade, Colormap, ShadeHow, Span};
use test_utils::{clustered_points, uniform_points};
use tiler_common::Extent;

// ============================================================================
// Rasterize
// ============================================================================

#[test]
fn test_every_point_counted_once() {
    let extent = Extent::new(-1000.0, -1000.0, 1000.0, 1000.0);
    let points = uniform_points(11, 5_000, (-1000.0, -1000.0, 1000.0, 1000.0));

    let grid = rasterize_points(points.iter().copied(), &extent, 64, 32);
    assert_eq!(grid.total(), 5_000.0);
}

#[test]
fn test_halves_add_up_to_whole() {
    let whole = Extent::new(0.0, 0.0, 2.0, 1.0);
    let left = Extent::new(0.0, 0.0, 1.0, 1.0);
    let right = Extent::new(1.0, 0.0, 2.0, 1.0);
    // Keep clear of the shared edge, which both halves own
    let points: Vec<_> = uniform_points(3, 2_000, (0.0, 0.0, 2.0, 1.0))
        .into_iter()
        .filter(|&(x, _)| x != 1.0)
        .collect();

    let g = rasterize_points(points.iter().copied(), &whole, 16, 32);
    let l = rasterize_points(points.iter().copied(), &left, 16, 16);
    let r = rasterize_points(points.iter().copied(), &right, 16, 16);

    for row in 0..16 {
        for col in 0..16 {
            assert_eq!(g.get(col, row), l.get(col, row));
            assert_eq!(g.get(col + 16, row), r.get(col, row));
        }
    }
}

// ============================================================================
// Shade
// ============================================================================

#[test]
fn test_shared_span_makes_seams_consistent() {
    let whole = Extent::new(0.0, 0.0, 2.0, 1.0);
    let left = Extent::new(0.0, 0.0, 1.0, 1.0);
    let right = Extent::new(1.0, 0.0, 2.0, 1.0);

    // Dense cluster on the left, sparse noise on the right
    let mut points = clustered_points(5, 4_000, (0.5, 0.5), 0.4);
    points.extend(uniform_points(6, 200, (1.01, 0.0, 2.0, 1.0)));

    let g = rasterize_points(points.iter().copied(), &whole, 8, 16);
    let l = rasterize_points(points.iter().copied(), &left, 8, 8);
    let r = rasterize_points(points.iter().copied(), &right, 8, 8);

    let span = Span::merge(Span::of(&l), Span::of(&r));
    assert_eq!(span, Span::of(&g));

    let full = shade(&g, Colormap::Fire, ShadeHow::Log, span);
    let right_image = shade(&r, Colormap::Fire, ShadeHow::Log, span);
    for row in 0..8 {
        for col in 0..8 {
            assert_eq!(full.get_pixel(col + 8, row), right_image.get_pixel(col, row));
        }
    }

    // Shading the sparse half alone stretches its own range instead
    let own = shade(&r, Colormap::Fire, ShadeHow::Log, None);
    assert_ne!(own, right_image);
}

#[test]
fn test_empty_pixels_transparent_others_opaque() {
    let extent = Extent::new(0.0, 0.0, 1.0, 1.0);
    let grid = rasterize_points([(0.1, 0.9), (0.9, 0.1)], &extent, 2, 2);
    let image = shade(&grid, Colormap::Bgy, ShadeHow::EqHist, None);

    assert_eq!(image.get_pixel(0, 0).0[3], 255);
    assert_eq!(image.get_pixel(1, 1).0[3], 255);
    assert_eq!(image.get_pixel(1, 0).0[3], 0);
    assert_eq!(image.get_pixel(0, 1).0[3], 0);
}
