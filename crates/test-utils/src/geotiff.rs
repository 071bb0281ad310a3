//! GeoTIFF fixture writer.
//!
//! Writes small single-band rasters with GeoTIFF georeferencing tags and an
//! optional GDAL nodata tag. Stripped files go through the `tiff` encoder;
//! the encoder cannot write tiles, so tiled files are assembled by hand as
//! little-endian classic TIFF with uncompressed, zero-padded tiles.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tiff::encoder::colortype::{ColorType, Gray32Float, Gray8};
use tiff::encoder::{TiffEncoder, TiffValue};
use tiff::tags::Tag;
use tiff::TiffResult;

use crate::fixtures::grid::GridSpec;

// GeoTIFF tag IDs
const GEOTIFF_MODELPIXELSCALE: u16 = 33550;
const GEOTIFF_MODELTIEPOINT: u16 = 33922;
const GEOTIFF_MODELTRANSFORMATION: u16 = 34264;
const GEOTIFF_GEOKEYDIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

// Baseline and tiling tag IDs for the hand-assembled layout
const IMAGE_WIDTH: u16 = 256;
const IMAGE_LENGTH: u16 = 257;
const BITS_PER_SAMPLE: u16 = 258;
const COMPRESSION: u16 = 259;
const PHOTOMETRIC: u16 = 262;
const SAMPLES_PER_PIXEL: u16 = 277;
const PLANAR_CONFIG: u16 = 284;
const TILE_WIDTH: u16 = 322;
const TILE_LENGTH: u16 = 323;
const TILE_OFFSETS: u16 = 324;
const TILE_BYTE_COUNTS: u16 = 325;
const SAMPLE_FORMAT: u16 = 339;

const SAMPLE_FORMAT_UINT: u16 = 1;
const SAMPLE_FORMAT_FLOAT: u16 = 3;

// GeoKeys for a WGS84 geographic raster, PixelIsArea
const WGS84_GEOKEYS: [u16; 16] = [
    1, 1, 0, 3, // header: version, revision, minor, key count
    1024, 0, 1, 2, // GTModelType = geographic
    1025, 0, 1, 1, // GTRasterType = PixelIsArea
    2048, 0, 1, 4326, // GeographicType = WGS84
];

/// How a fixture file is georeferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Georeferencing {
    /// `ModelPixelScaleTag` + `ModelTiepointTag`.
    ScaleTiepoint,
    /// `ModelTransformationTag`.
    Transformation,
    /// No georeferencing tags at all.
    None,
}

/// Value of one TIFF field.
#[derive(Debug, Clone, PartialEq)]
enum TagValue {
    Shorts(Vec<u16>),
    Longs(Vec<u32>),
    Doubles(Vec<f64>),
    Ascii(String),
}

impl TagValue {
    /// (field type, count, little-endian payload)
    fn encode(&self) -> (u16, u32, Vec<u8>) {
        match self {
            Self::Shorts(v) => (3, v.len() as u32, v.iter().flat_map(|x| x.to_le_bytes()).collect()),
            Self::Longs(v) => (4, v.len() as u32, v.iter().flat_map(|x| x.to_le_bytes()).collect()),
            Self::Doubles(v) => {
                (12, v.len() as u32, v.iter().flat_map(|x| x.to_le_bytes()).collect())
            }
            Self::Ascii(s) => {
                let mut bytes = s.as_bytes().to_vec();
                bytes.push(0);
                (2, bytes.len() as u32, bytes)
            }
        }
    }
}

/// Builder for a single-band GeoTIFF test file.
#[derive(Debug, Clone)]
pub struct GeoTiffFixture {
    spec: GridSpec,
    rows_per_strip: u32,
    tile_size: Option<(u32, u32)>,
    nodata: Option<String>,
    georeferencing: Georeferencing,
}

impl GeoTiffFixture {
    pub fn new(spec: GridSpec) -> Self {
        Self {
            spec,
            rows_per_strip: 16,
            tile_size: None,
            nodata: None,
            georeferencing: Georeferencing::ScaleTiepoint,
        }
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Rows per strip; small values give many chunks to exercise windowed reads.
    pub fn rows_per_strip(mut self, rows: u32) -> Self {
        self.rows_per_strip = rows.max(1);
        self
    }

    /// Store the image as tiles instead of strips. Edge tiles are padded
    /// with zeros to the full tile size, as TIFF requires.
    pub fn tiled(mut self, tile_width: u32, tile_height: u32) -> Self {
        self.tile_size = Some((tile_width.max(1), tile_height.max(1)));
        self
    }

    /// Write a GDAL nodata tag with this value.
    pub fn nodata(mut self, value: f64) -> Self {
        self.nodata = Some(value.to_string());
        self
    }

    pub fn georeferencing(mut self, georeferencing: Georeferencing) -> Self {
        self.georeferencing = georeferencing;
        self
    }

    /// Write 32-bit float samples.
    pub fn write_f32(&self, path: &Path, data: &[f32]) -> TiffResult<()> {
        match self.tile_size {
            Some(tile) => {
                let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
                self.write_tiled(path, tile, 32, SAMPLE_FORMAT_FLOAT, &bytes)
            }
            None => self.write::<Gray32Float>(path, data),
        }
    }

    /// Write 8-bit unsigned samples.
    pub fn write_u8(&self, path: &Path, data: &[u8]) -> TiffResult<()> {
        match self.tile_size {
            Some(tile) => self.write_tiled(path, tile, 8, SAMPLE_FORMAT_UINT, data),
            None => self.write::<Gray8>(path, data),
        }
    }

    /// Write float samples to `no2.tif` in a fresh temporary directory.
    ///
    /// Keep the returned `TempDir` alive for as long as the file is needed.
    pub fn write_temp_f32(&self, data: &[f32]) -> TiffResult<(TempDir, PathBuf)> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("no2.tif");
        self.write_f32(&path, data)?;
        Ok((dir, path))
    }

    fn write<C: ColorType>(&self, path: &Path, data: &[C::Inner]) -> TiffResult<()>
    where
        [C::Inner]: TiffValue,
    {
        let file = BufWriter::new(File::create(path)?);
        let mut encoder = TiffEncoder::new(file)?;
        let mut image =
            encoder.new_image::<C>(self.spec.width as u32, self.spec.height as u32)?;
        image.rows_per_strip(self.rows_per_strip)?;

        let dir = image.encoder();
        for (tag, value) in self.geo_tags() {
            let tag = Tag::Unknown(tag);
            match value {
                TagValue::Shorts(v) => dir.write_tag(tag, v.as_slice())?,
                TagValue::Longs(v) => dir.write_tag(tag, v.as_slice())?,
                TagValue::Doubles(v) => dir.write_tag(tag, v.as_slice())?,
                TagValue::Ascii(v) => dir.write_tag(tag, v.as_str())?,
            }
        }

        image.write_data(data)
    }

    /// Georeferencing and nodata tags, in ascending tag order.
    fn geo_tags(&self) -> Vec<(u16, TagValue)> {
        let GridSpec {
            west,
            north,
            pixel_size,
            ..
        } = self.spec;
        let mut tags = Vec::new();
        match self.georeferencing {
            Georeferencing::ScaleTiepoint => {
                tags.push((
                    GEOTIFF_MODELPIXELSCALE,
                    TagValue::Doubles(vec![pixel_size, pixel_size, 0.0]),
                ));
                tags.push((
                    GEOTIFF_MODELTIEPOINT,
                    TagValue::Doubles(vec![0.0, 0.0, 0.0, west, north, 0.0]),
                ));
            }
            Georeferencing::Transformation => {
                let matrix = vec![
                    pixel_size, 0.0, 0.0, west, //
                    0.0, -pixel_size, 0.0, north, //
                    0.0, 0.0, 0.0, 0.0, //
                    0.0, 0.0, 0.0, 1.0,
                ];
                tags.push((GEOTIFF_MODELTRANSFORMATION, TagValue::Doubles(matrix)));
            }
            Georeferencing::None => {}
        }
        if self.georeferencing != Georeferencing::None {
            tags.push((GEOTIFF_GEOKEYDIRECTORY, TagValue::Shorts(WGS84_GEOKEYS.to_vec())));
        }
        if let Some(nodata) = &self.nodata {
            tags.push((GDAL_NODATA, TagValue::Ascii(nodata.clone())));
        }
        tags
    }

    /// `samples` holds row-major little-endian samples of `bits` each.
    fn write_tiled(
        &self,
        path: &Path,
        (tile_width, tile_height): (u32, u32),
        bits: u16,
        sample_format: u16,
        samples: &[u8],
    ) -> TiffResult<()> {
        let (width, height) = (self.spec.width, self.spec.height);
        let sample_bytes = usize::from(bits / 8);
        if samples.len() != width * height * sample_bytes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} sample bytes for a {width}x{height} image", samples.len()),
            )
            .into());
        }

        let (tw, th) = (tile_width as usize, tile_height as usize);
        let tiles_across = width.div_ceil(tw);
        let tiles_down = height.div_ceil(th);
        let tile_bytes = tw * th * sample_bytes;

        // Header; the IFD offset is patched once the IFD position is known.
        let mut out = Vec::with_capacity(8 + tiles_across * tiles_down * tile_bytes);
        out.extend_from_slice(b"II");
        out.extend_from_slice(&42u16.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());

        let mut offsets = Vec::with_capacity(tiles_across * tiles_down);
        for tile_row in 0..tiles_down {
            for tile_col in 0..tiles_across {
                offsets.push(out.len() as u32);
                let mut tile = vec![0u8; tile_bytes];
                let col0 = tile_col * tw;
                let cols = tw.min(width - col0);
                for r in 0..th.min(height - tile_row * th) {
                    let src = ((tile_row * th + r) * width + col0) * sample_bytes;
                    let dst = r * tw * sample_bytes;
                    tile[dst..dst + cols * sample_bytes]
                        .copy_from_slice(&samples[src..src + cols * sample_bytes]);
                }
                out.extend_from_slice(&tile);
            }
        }

        let mut tags = vec![
            (IMAGE_WIDTH, TagValue::Longs(vec![width as u32])),
            (IMAGE_LENGTH, TagValue::Longs(vec![height as u32])),
            (BITS_PER_SAMPLE, TagValue::Shorts(vec![bits])),
            (COMPRESSION, TagValue::Shorts(vec![1])),
            (PHOTOMETRIC, TagValue::Shorts(vec![1])),
            (SAMPLES_PER_PIXEL, TagValue::Shorts(vec![1])),
            (PLANAR_CONFIG, TagValue::Shorts(vec![1])),
            (TILE_WIDTH, TagValue::Longs(vec![tile_width])),
            (TILE_LENGTH, TagValue::Longs(vec![tile_height])),
            (TILE_BYTE_COUNTS, TagValue::Longs(vec![tile_bytes as u32; offsets.len()])),
            (TILE_OFFSETS, TagValue::Longs(offsets)),
            (SAMPLE_FORMAT, TagValue::Shorts(vec![sample_format])),
        ];
        tags.extend(self.geo_tags());
        tags.sort_by_key(|(tag, _)| *tag);

        // Values over four bytes live outside the IFD, word aligned.
        let mut entries = Vec::with_capacity(tags.len());
        for (tag, value) in &tags {
            let (field_type, count, payload) = value.encode();
            let mut field = [0u8; 4];
            if payload.len() <= 4 {
                field[..payload.len()].copy_from_slice(&payload);
            } else {
                if out.len() % 2 == 1 {
                    out.push(0);
                }
                field = (out.len() as u32).to_le_bytes();
                out.extend_from_slice(&payload);
            }
            entries.push((*tag, field_type, count, field));
        }

        if out.len() % 2 == 1 {
            out.push(0);
        }
        let ifd_offset = out.len() as u32;
        out[4..8].copy_from_slice(&ifd_offset.to_le_bytes());
        out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        for (tag, field_type, count, field) in entries {
            out.extend_from_slice(&tag.to_le_bytes());
            out.extend_from_slice(&field_type.to_le_bytes());
            out.extend_from_slice(&count.to_le_bytes());
            out.extend_from_slice(&field);
        }
        out.extend_from_slice(&0u32.to_le_bytes());

        fs::write(path, out)?;
        Ok(())
    }
}
