//! Single-band GeoTIFF reader with windowed access.
//!
//! Only the strips or tiles that intersect a requested window are decoded.
//! The file is reopened for every read so a `GeoTiffSource` can be shared
//! between threads without locking.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::{debug, info, warn};

use crate::error::{RasterError, Result};
use crate::transform::GeoTransform;
use crate::types::{PixelWindow, RasterMetadata, RasterTile};

// GeoTIFF tag IDs
const GEOTIFF_MODELPIXELSCALE: u16 = 33550;
const GEOTIFF_MODELTIEPOINT: u16 = 33922;
const GEOTIFF_MODELTRANSFORMATION: u16 = 34264;
const GDAL_NODATA: u16 = 42113;

type TiffReader = Decoder<BufReader<File>>;

/// Chunk geometry of the first image directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkLayout {
    Stripped { rows_per_strip: usize },
    Tiled { tile_width: usize, tile_height: usize, tiles_across: usize },
}

impl ChunkLayout {
    fn from_dimensions(width: usize, chunk_width: usize, chunk_height: usize) -> Self {
        if chunk_width >= width {
            Self::Stripped {
                rows_per_strip: chunk_height,
            }
        } else {
            Self::Tiled {
                tile_width: chunk_width,
                tile_height: chunk_height,
                tiles_across: width.div_ceil(chunk_width),
            }
        }
    }

    /// Chunk indices intersecting `window`, with each chunk's pixel origin.
    fn chunks_for(&self, window: &PixelWindow) -> Vec<(u32, usize, usize)> {
        let mut chunks = Vec::new();
        match *self {
            Self::Stripped { rows_per_strip } => {
                let first = window.row_min / rows_per_strip;
                let last = (window.row_max - 1) / rows_per_strip;
                for strip in first..=last {
                    chunks.push((strip as u32, strip * rows_per_strip, 0));
                }
            }
            Self::Tiled {
                tile_width,
                tile_height,
                tiles_across,
            } => {
                for tile_row in window.row_min / tile_height..=(window.row_max - 1) / tile_height {
                    for tile_col in window.col_min / tile_width..=(window.col_max - 1) / tile_width {
                        let index = tile_row * tiles_across + tile_col;
                        chunks.push((index as u32, tile_row * tile_height, tile_col * tile_width));
                    }
                }
            }
        }
        chunks
    }
}

/// A GeoTIFF file whose metadata has been parsed.
#[derive(Debug, Clone)]
pub struct GeoTiffSource {
    path: PathBuf,
    metadata: RasterMetadata,
    layout: ChunkLayout,
}

impl GeoTiffSource {
    /// Open a GeoTIFF and read dimensions, georeferencing and nodata.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut decoder = open_decoder(&path)?;

        let (width, height) = decoder.dimensions()?;
        let (width, height) = (width as usize, height as usize);
        if width == 0 || height == 0 {
            return Err(RasterError::invalid_metadata("raster has zero extent"));
        }

        let (chunk_width, chunk_height) = decoder.chunk_dimensions();
        if chunk_width == 0 || chunk_height == 0 {
            return Err(RasterError::invalid_metadata("raster has zero-sized chunks"));
        }
        let layout = ChunkLayout::from_dimensions(width, chunk_width as usize, chunk_height as usize);

        let transform = read_transform(&mut decoder);
        if transform.is_none() {
            warn!(path = %path.display(), "GeoTIFF has no usable georeferencing");
        }
        let bounds = transform.map(|t| t.bounds(width, height));
        let nodata = read_nodata(&mut decoder);

        info!(
            path = %path.display(),
            width,
            height,
            ?layout,
            ?bounds,
            ?nodata,
            "Opened GeoTIFF"
        );

        Ok(Self {
            path,
            metadata: RasterMetadata {
                width,
                height,
                transform,
                bounds,
                nodata,
            },
            layout,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> &RasterMetadata {
        &self.metadata
    }

    pub fn width(&self) -> usize {
        self.metadata.width
    }

    pub fn height(&self) -> usize {
        self.metadata.height
    }

    /// Read band 1 over `window`.
    ///
    /// Nodata and non-finite samples become `NaN`. A window with no valid
    /// samples is an error.
    pub fn read_window(&self, window: &PixelWindow) -> Result<RasterTile> {
        if window.is_empty()
            || window.row_max > self.metadata.height
            || window.col_max > self.metadata.width
        {
            return Err(RasterError::EmptyTile(format!(
                "window {:?} outside {}x{} raster",
                window, self.metadata.width, self.metadata.height
            )));
        }

        let mut decoder = open_decoder(&self.path)?;
        let mut data = vec![f32::NAN; window.len()];
        let nodata = self.metadata.nodata;

        for (index, origin_row, origin_col) in self.layout.chunks_for(window) {
            let (chunk_width, chunk_height) = decoder.chunk_data_dimensions(index);
            let (chunk_width, chunk_height) = (chunk_width as usize, chunk_height as usize);
            let values = decoding_to_f32(decoder.read_chunk(index)?);

            let pixels = chunk_width * chunk_height;
            if pixels == 0 || values.len() < pixels {
                return Err(RasterError::read_failed(format!(
                    "chunk {} decoded to {} samples, expected {}",
                    index,
                    values.len(),
                    pixels
                )));
            }
            let samples_per_pixel = values.len() / pixels;

            let row_start = window.row_min.max(origin_row);
            let row_end = window.row_max.min(origin_row + chunk_height);
            let col_start = window.col_min.max(origin_col);
            let col_end = window.col_max.min(origin_col + chunk_width);

            for row in row_start..row_end {
                for col in col_start..col_end {
                    let local = (row - origin_row) * chunk_width + (col - origin_col);
                    let value = values[local * samples_per_pixel];
                    let out = (row - window.row_min) * window.cols() + (col - window.col_min);
                    data[out] = mask_value(value, nodata);
                }
            }
        }

        let tile = RasterTile::new(data, *window);
        let valid = tile.valid_count();
        debug!(
            rows = tile.rows,
            cols = tile.cols,
            valid,
            "Read raster window"
        );
        if valid == 0 {
            return Err(RasterError::EmptyTile(format!(
                "all {} samples invalid",
                tile.data.len()
            )));
        }
        Ok(tile)
    }
}

fn open_decoder(path: &Path) -> Result<TiffReader> {
    let file = File::open(path)
        .map_err(|e| RasterError::open_failed(format!("{}: {}", path.display(), e)))?;
    Decoder::new(BufReader::new(file))
        .map_err(|e| RasterError::open_failed(format!("{}: {}", path.display(), e)))
}

fn read_f64_tag(decoder: &mut TiffReader, tag: u16) -> Option<Vec<f64>> {
    match decoder.find_tag(Tag::Unknown(tag)) {
        Ok(Some(value)) => value.into_f64_vec().ok(),
        Ok(None) => None,
        Err(e) => {
            debug!(tag, error = %e, "Failed to read GeoTIFF tag");
            None
        }
    }
}

fn read_transform(decoder: &mut TiffReader) -> Option<GeoTransform> {
    if let Some(matrix) = read_f64_tag(decoder, GEOTIFF_MODELTRANSFORMATION) {
        if let Some(transform) = GeoTransform::from_model_transformation(&matrix) {
            return Some(transform);
        }
    }
    let scale = read_f64_tag(decoder, GEOTIFF_MODELPIXELSCALE)?;
    let tiepoint = read_f64_tag(decoder, GEOTIFF_MODELTIEPOINT)?;
    GeoTransform::from_scale_and_tiepoint(&scale, &tiepoint)
}

fn read_nodata(decoder: &mut TiffReader) -> Option<f64> {
    let value = decoder.find_tag(Tag::Unknown(GDAL_NODATA)).ok()??;
    let text = value.into_string().ok()?;
    parse_nodata(&text)
}

/// Parse a GDAL nodata string ("-9999", "nan", with optional NUL padding).
fn parse_nodata(text: &str) -> Option<f64> {
    let trimmed = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    if trimmed.eq_ignore_ascii_case("nan") {
        return Some(f64::NAN);
    }
    trimmed.parse::<f64>().ok()
}

fn mask_value(value: f32, nodata: Option<f64>) -> f32 {
    if !value.is_finite() {
        return f32::NAN;
    }
    // Compare at storage precision; a NaN nodata never matches.
    match nodata {
        Some(nd) if value == nd as f32 => f32::NAN,
        _ => value,
    }
}

fn decoding_to_f32(result: DecodingResult) -> Vec<f32> {
    match result {
        DecodingResult::U8(values) => values.iter().map(|&v| v as f32).collect(),
        DecodingResult::U16(values) => values.iter().map(|&v| v as f32).collect(),
        DecodingResult::U32(values) => values.iter().map(|&v| v as f32).collect(),
        DecodingResult::U64(values) => values.iter().map(|&v| v as f32).collect(),
        DecodingResult::I8(values) => values.iter().map(|&v| v as f32).collect(),
        DecodingResult::I16(values) => values.iter().map(|&v| v as f32).collect(),
        DecodingResult::I32(values) => values.iter().map(|&v| v as f32).collect(),
        DecodingResult::I64(values) => values.iter().map(|&v| v as f32).collect(),
        DecodingResult::F32(values) => values,
        DecodingResult::F64(values) => values.iter().map(|&v| v as f32).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nodata() {
        assert_eq!(parse_nodata("-9999"), Some(-9999.0));
        assert_eq!(parse_nodata("0\0"), Some(0.0));
        assert!(parse_nodata("nan").is_some_and(f64::is_nan));
        assert_eq!(parse_nodata("none"), None);
    }

    #[test]
    fn test_mask_value() {
        assert!(mask_value(-9999.0, Some(-9999.0)).is_nan());
        assert!(mask_value(f32::INFINITY, None).is_nan());
        assert_eq!(mask_value(12.5, Some(-9999.0)), 12.5);
        assert_eq!(mask_value(12.5, Some(f64::NAN)), 12.5);
    }

    #[test]
    fn test_strip_chunks_for_window() {
        let layout = ChunkLayout::from_dimensions(100, 100, 16);
        assert_eq!(layout, ChunkLayout::Stripped { rows_per_strip: 16 });
        let chunks = layout.chunks_for(&PixelWindow::new(10, 40, 5, 50));
        assert_eq!(chunks, vec![(0, 0, 0), (1, 16, 0), (2, 32, 0)]);
    }

    #[test]
    fn test_tile_chunks_for_window() {
        let layout = ChunkLayout::from_dimensions(100, 32, 32);
        assert_eq!(
            layout,
            ChunkLayout::Tiled {
                tile_width: 32,
                tile_height: 32,
                tiles_across: 4
            }
        );
        let chunks = layout.chunks_for(&PixelWindow::new(30, 40, 60, 70));
        assert_eq!(
            chunks,
            vec![(1, 0, 32), (2, 0, 64), (5, 32, 32), (6, 32, 64)]
        );
    }

    #[test]
    fn test_open_missing_file() {
        let err = GeoTiffSource::open("/nonexistent/no2.tif").unwrap_err();
        assert_eq!(err.kind(), "raster_open_failed");
    }
}
