//! Common test fixtures for map tiler tests.

/// The three-point scenario: one point at the origin and two at opposite corners.
pub const THREE_POINTS: [(f64, f64); 3] = [(0.0, 0.0), (100.0, 100.0), (-100.0, -100.0)];

/// Geographic (lon, lat) coordinates of a few cities, all inside the Mercator band.
pub mod cities {
    pub const BRATISLAVA: (f64, f64) = (17.1077, 48.1486);
    pub const NEW_YORK: (f64, f64) = (-74.0060, 40.7128);
    pub const SYDNEY: (f64, f64) = (151.2093, -33.8688);
    pub const REYKJAVIK: (f64, f64) = (-21.9426, 64.1466);
    pub const QUITO: (f64, f64) = (-78.4678, -0.1807);

    pub const ALL: [(f64, f64); 5] = [BRATISLAVA, NEW_YORK, SYDNEY, REYKJAVIK, QUITO];
}

/// Geographic coordinates outside the projectable band.
pub mod polar {
    pub const NORTH_POLE: (f64, f64) = (0.0, 90.0);
    pub const BEYOND_BAND: (f64, f64) = (10.0, 86.0);
    pub const SOUTH_POLE_STATION: (f64, f64) = (0.0, -89.9);
}

/// Render CSV text with the given header names for (lon, lat) pairs.
///
/// # Example
///
/// ```
/// use test_utils::points_csv;
///
/// let csv = points_csv("lon", "lat", &[(1.0, 2.0)]);
/// assert_eq!(csv, "lon,lat\n1,2\n");
/// ```
pub fn points_csv(x_header: &str, y_header: &str, points: &[(f64, f64)]) -> String {
    let mut out = format!("{},{}\n", x_header, y_header);
    for (x, y) in points {
        out.push_str(&format!("{},{}\n", x, y));
    }
    out
}
