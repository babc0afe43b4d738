//! Tile pyramid output: `<root>/<z>/<col>/<row>.png`.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{imageops, ImageOutputFormat, RgbaImage};
use tiler_common::{SuperTile, TileCoord, TilerError, TilerResult};
use tracing::debug;

/// On-disk tile encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileFormat {
    #[default]
    Png,
}

impl TileFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TileFormat::Png => "png",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            TileFormat::Png => "image/png",
        }
    }
}

/// Encode an image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> TilerResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageOutputFormat::Png)
        .map_err(|e| TilerError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Slices supertile images into individual tile files.
#[derive(Debug, Clone)]
pub struct TileWriter {
    root: PathBuf,
    tile_size: u32,
    format: TileFormat,
}

impl TileWriter {
    pub fn new(root: impl Into<PathBuf>, tile_size: u32) -> Self {
        Self {
            root: root.into(),
            tile_size,
            format: TileFormat::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where a tile lives on disk.
    pub fn tile_path(&self, coord: TileCoord) -> PathBuf {
        self.root
            .join(coord.z.to_string())
            .join(coord.x.to_string())
            .join(format!("{}.{}", coord.y, self.format.extension()))
    }

    /// Write every member tile of `supertile`, returning how many were written.
    ///
    /// The image must be exactly `cols·tile_size × rows·tile_size`.
    pub fn write_supertile(&self, supertile: &SuperTile, image: &RgbaImage) -> TilerResult<usize> {
        let expected_width = supertile.pixel_width(self.tile_size);
        let expected_height = supertile.pixel_height(self.tile_size);
        let (actual_width, actual_height) = image.dimensions();
        if (actual_width, actual_height) != (expected_width, expected_height) {
            return Err(TilerError::ImageSize {
                expected_width,
                expected_height,
                actual_width,
                actual_height,
            });
        }

        let mut written = 0;
        for (coord, x, y) in supertile.tiles(self.tile_size) {
            let tile = imageops::crop_imm(image, x, y, self.tile_size, self.tile_size).to_image();
            self.write_tile(coord, &tile)?;
            written += 1;
        }

        debug!(
            z = supertile.z,
            col = supertile.col,
            row = supertile.row,
            tiles = written,
            "Wrote supertile"
        );
        Ok(written)
    }

    /// Encode and write one tile, replacing any existing file.
    ///
    /// The bytes go to a sibling temp file first and are renamed into place,
    /// so readers never observe a partially written tile.
    pub fn write_tile(&self, coord: TileCoord, tile: &RgbaImage) -> TilerResult<PathBuf> {
        let path = self.tile_path(coord);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let bytes = encode_png(tile)?;
        let tmp = path.with_extension(format!(
            "{}.tmp-{}",
            self.format.extension(),
            std::process::id()
        ));
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &path)?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tiler_common::{Extent, TileGrid};

    #[test]
    fn test_tile_path_layout() {
        let writer = TileWriter::new("/data/tiles", 256);
        assert_eq!(
            writer.tile_path(TileCoord::new(3, 5, 2)),
            PathBuf::from("/data/tiles/3/5/2.png")
        );
    }

    #[test]
    fn test_rejects_wrong_image_size() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TileWriter::new(dir.path(), 4);
        let grid = TileGrid::new(Extent::new(0.0, 0.0, 1.0, 1.0), 1);
        let supertile = grid.supertiles(16)[0];

        let err = writer
            .write_supertile(&supertile, &RgbaImage::new(8, 4))
            .unwrap_err();
        assert!(matches!(
            err,
            TilerError::ImageSize {
                expected_width: 8,
                expected_height: 8,
                actual_width: 8,
                actual_height: 4,
            }
        ));
        // Nothing written on a size mismatch
        assert!(!dir.path().join("1").exists());
    }

    #[test]
    fn test_slices_into_member_tiles() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TileWriter::new(dir.path(), 2);
        let grid = TileGrid::new(Extent::new(0.0, 0.0, 1.0, 1.0), 1);
        let supertile = grid.supertiles(16)[0];

        // Top-right quadrant red, everything else transparent
        let mut image = RgbaImage::new(4, 4);
        for y in 0..2 {
            for x in 2..4 {
                image.put_pixel(x, y, Rgba([255, 0, 0, 255]));
            }
        }

        assert_eq!(writer.write_supertile(&supertile, &image).unwrap(), 4);

        let top_right = image::open(dir.path().join("1/1/0.png")).unwrap().to_rgba8();
        assert_eq!(top_right.dimensions(), (2, 2));
        assert!(top_right.pixels().all(|p| p.0 == [255, 0, 0, 255]));

        let bottom_left = image::open(dir.path().join("1/0/1.png")).unwrap().to_rgba8();
        assert!(bottom_left.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_overwrite_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TileWriter::new(dir.path(), 2);
        let coord = TileCoord::new(0, 0, 0);

        writer.write_tile(coord, &RgbaImage::new(2, 2)).unwrap();
        writer.write_tile(coord, &RgbaImage::new(2, 2)).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path().join("0/0"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("0.png")]);
    }
}
