//! Named colour ramps.
//!
//! Each ramp is a short list of evenly spaced anchor colours, linearly
//! interpolated into a 256-entry palette. Low values map to the first anchor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tiler_common::TilerError;

/// Number of entries in an expanded palette.
pub const PALETTE_SIZE: usize = 256;

/// Supported colour ramps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    #[default]
    Fire,
    Bgy,
    Bgyw,
    Kbc,
    Blues,
    Bmw,
    Bmy,
    Kgy,
    Gray,
    Dimgray,
    Kb,
    Kg,
    Kr,
}

impl Colormap {
    pub const ALL: [Colormap; 13] = [
        Colormap::Fire,
        Colormap::Bgy,
        Colormap::Bgyw,
        Colormap::Kbc,
        Colormap::Blues,
        Colormap::Bmw,
        Colormap::Bmy,
        Colormap::Kgy,
        Colormap::Gray,
        Colormap::Dimgray,
        Colormap::Kb,
        Colormap::Kg,
        Colormap::Kr,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Colormap::Fire => "fire",
            Colormap::Bgy => "bgy",
            Colormap::Bgyw => "bgyw",
            Colormap::Kbc => "kbc",
            Colormap::Blues => "blues",
            Colormap::Bmw => "bmw",
            Colormap::Bmy => "bmy",
            Colormap::Kgy => "kgy",
            Colormap::Gray => "gray",
            Colormap::Dimgray => "dimgray",
            Colormap::Kb => "kb",
            Colormap::Kg => "kg",
            Colormap::Kr => "kr",
        }
    }

    /// Anchor colours, low to high.
    pub fn stops(&self) -> &'static [&'static str] {
        match self {
            Colormap::Fire => &[
                "#000000", "#4d0000", "#9b0d00", "#e33500", "#ff7a00", "#ffb70a", "#fff25f",
                "#ffffff",
            ],
            Colormap::Bgy => &[
                "#000080", "#0041a8", "#0a7a8c", "#2ba85e", "#73c63a", "#c3dc2e", "#ffff66",
            ],
            Colormap::Bgyw => &[
                "#071e6e", "#0d63a0", "#2ba286", "#8ccb58", "#e6e74c", "#ffffff",
            ],
            Colormap::Kbc => &[
                "#000000", "#0d1170", "#1e3ccd", "#2e7ef5", "#3cb9f5", "#c1ffff",
            ],
            Colormap::Blues => &[
                "#f1f1f1", "#c2d7ee", "#8cb4e0", "#5a8fce", "#2e6bb5", "#3a3a98",
            ],
            Colormap::Bmw => &[
                "#000004", "#1c0a8c", "#6a16d6", "#bb3cde", "#ef7ce6", "#ffffff",
            ],
            Colormap::Bmy => &[
                "#000b7d", "#4a0b9a", "#97239c", "#d0497a", "#f58645", "#fdd126", "#fcfe4f",
            ],
            Colormap::Kgy => &[
                "#000000", "#0d3d1a", "#167a2d", "#3db83b", "#9be13c", "#e6ff6b",
            ],
            Colormap::Gray => &["#000000", "#ffffff"],
            Colormap::Dimgray => &["#545454", "#ffffff"],
            Colormap::Kb => &["#000000", "#0b1c6b", "#2240c7", "#6a8bff"],
            Colormap::Kg => &["#000000", "#0a4a0a", "#15a015", "#27ff27"],
            Colormap::Kr => &["#000000", "#6b0000", "#d40000", "#ff4a4a"],
        }
    }

    /// Expand the anchors into a full palette.
    pub fn palette(&self) -> Palette {
        Palette::from_stops(self.stops())
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Colormap {
    type Err = TilerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Colormap::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| TilerError::UnknownColormap(s.to_string()))
    }
}

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

/// A 256-entry RGB lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<[u8; 3]>,
}

impl Palette {
    /// Interpolate evenly spaced anchors. Unparsable anchors are skipped; with
    /// no usable anchors the palette is solid white.
    pub fn from_stops(stops: &[&str]) -> Self {
        let anchors: Vec<[f32; 3]> = stops
            .iter()
            .filter_map(|s| hex_to_rgb(s))
            .map(|(r, g, b)| [r as f32, g as f32, b as f32])
            .collect();

        let colors = match anchors.len() {
            0 => vec![[255, 255, 255]; PALETTE_SIZE],
            1 => vec![to_rgb(anchors[0]); PALETTE_SIZE],
            n => (0..PALETTE_SIZE)
                .map(|i| {
                    let pos = i as f32 / (PALETTE_SIZE - 1) as f32 * (n - 1) as f32;
                    let lo = (pos.floor() as usize).min(n - 2);
                    let t = pos - lo as f32;
                    let (a, b) = (anchors[lo], anchors[lo + 1]);
                    to_rgb([
                        a[0] + (b[0] - a[0]) * t,
                        a[1] + (b[1] - a[1]) * t,
                        a[2] + (b[2] - a[2]) * t,
                    ])
                })
                .collect(),
        };

        Self { colors }
    }

    /// Colour for a normalized value; `t` is clamped to [0, 1].
    pub fn color_at(&self, t: f32) -> [u8; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let idx = (t * (PALETTE_SIZE - 1) as f32).round() as usize;
        self.colors[idx.min(PALETTE_SIZE - 1)]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

fn to_rgb(c: [f32; 3]) -> [u8; 3] {
    [
        c[0].round().clamp(0.0, 255.0) as u8,
        c[1].round().clamp(0.0, 255.0) as u8,
        c[2].round().clamp(0.0, 255.0) as u8,
    ]
}
