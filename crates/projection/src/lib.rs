//! Coordinate reference system transformations.
//!
//! Implements the spherical Mercator projection used by web map tiles.

pub mod mercator;

pub use mercator::{
    in_latitude_band, lnglat_to_meters, meters_to_lnglat, EARTH_RADIUS, MAX_LATITUDE,
};
