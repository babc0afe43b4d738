//! Spherical (Web) Mercator projection.
//!
//! Maps WGS84 longitude/latitude in degrees onto EPSG:3857 metres:
//! - x = R · λ
//! - y = R · ln(tan(π/4 + φ/2))
//!
//! The projection diverges at the poles, so the map is conventionally cut at
//! ±85.06° where the projected square closes.

use std::f64::consts::PI;

/// Sphere radius used by EPSG:3857 (WGS84 semi-major axis), metres.
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Latitude limit, in degrees, of the projectable band.
pub const MAX_LATITUDE: f64 = 85.06;

/// True if `lat` lies inside the closed band [-85.06, 85.06].
#[inline]
pub fn in_latitude_band(lat: f64) -> bool {
    (-MAX_LATITUDE..=MAX_LATITUDE).contains(&lat)
}

/// Project a longitude/latitude pair (degrees) to Web Mercator metres.
///
/// Callers are expected to have filtered latitudes with [`in_latitude_band`];
/// values outside the band still project but grow without bound.
#[inline]
pub fn lnglat_to_meters(lon: f64, lat: f64) -> (f64, f64) {
    let x = EARTH_RADIUS * lon.to_radians();
    let y = EARTH_RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Inverse of [`lnglat_to_meters`].
#[inline]
pub fn meters_to_lnglat(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}
