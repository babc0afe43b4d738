//! Coordinate system tags for input data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TilerError;

/// Coordinate system an input dataset is declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordinateSystem {
    /// Geographic longitude/latitude in degrees (EPSG:4326).
    Wgs84,
    /// Already projected Web Mercator metres (EPSG:3857).
    WebMercator,
}

impl CoordinateSystem {
    /// Parse a user-supplied tag.
    ///
    /// Accepts formats like:
    /// - "WGS84", "EPSG:4326"
    /// - "Web Mercator", "WebMercator", "EPSG:3857"
    pub fn parse(s: &str) -> Result<Self, TilerError> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_uppercase();

        match normalized.as_str() {
            "WGS84" | "EPSG:4326" | "CRS:84" => Ok(CoordinateSystem::Wgs84),
            "WEBMERCATOR" | "EPSG:3857" | "EPSG:900913" => Ok(CoordinateSystem::WebMercator),
            _ => Err(TilerError::UnsupportedCrs(s.to_string())),
        }
    }
}

impl FromStr for CoordinateSystem {
    type Err = TilerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoordinateSystem::Wgs84 => "WGS84",
            CoordinateSystem::WebMercator => "Web Mercator",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crs() {
        assert_eq!(
            CoordinateSystem::parse("WGS84").unwrap(),
            CoordinateSystem::Wgs84
        );
        assert_eq!(
            CoordinateSystem::parse("epsg:4326").unwrap(),
            CoordinateSystem::Wgs84
        );
        assert_eq!(
            CoordinateSystem::parse("Web Mercator").unwrap(),
            CoordinateSystem::WebMercator
        );
        assert_eq!(
            CoordinateSystem::parse("EPSG:3857").unwrap(),
            CoordinateSystem::WebMercator
        );
        assert!(matches!(
            CoordinateSystem::parse("EPSG:5070"),
            Err(TilerError::UnsupportedCrs(_))
        ));
    }

    #[test]
    fn test_display_round_trips() {
        for crs in [CoordinateSystem::Wgs84, CoordinateSystem::WebMercator] {
            assert_eq!(CoordinateSystem::parse(&crs.to_string()).unwrap(), crs);
        }
    }
}
