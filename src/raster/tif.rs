use std::fs::File;
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;

use crate::raster::{ElevationRaster, RasterError};
use crate::tile::Cell;

// GeoTIFF tags: ModelPixelScale, ModelTiepoint, GDAL_NODATA
const TAG_PIXEL_SCALE: u16 = 33550;
const TAG_TIEPOINT: u16 = 33922;
const TAG_GDAL_NODATA: u16 = 42113;

const DEFAULT_NO_DATA: f32 = -32768.0;

/// Reads a single-band elevation GeoTIFF. The grid position comes from the
/// ModelTiepoint/ModelPixelScale tags; tiles without geotags fall back to
/// the 1°×1° cell named in the file name.
pub fn load_tif(path: &Path, cell: Option<Cell>) -> Result<ElevationRaster, RasterError> {
    let file = File::open(path)?;
    let mut decoder = Decoder::new(file)?;

    // SRTM1 tiles are 3601x3601 f32/i16, well above the default limits
    let mut limits = Limits::default();
    limits.decoding_buffer_size = 1024 * 1024 * 1024;
    limits.intermediate_buffer_size = 1024 * 1024 * 1024;
    limits.ifd_value_size = 1024 * 1024 * 1024;
    decoder = decoder.with_limits(limits);

    let (width, height) = decoder.dimensions()?;
    let (width, height) = (width as usize, height as usize);

    let (west, north, step) = grid_position(&mut decoder, path, cell, width)?;
    let no_data_value = read_no_data(&mut decoder);
    let data = decode_samples(&mut decoder)?;

    if data.len() != width * height {
        return Err(RasterError::NotSquare(path.to_path_buf(), data.len() as u64));
    }

    Ok(ElevationRaster::new(
        width,
        height,
        west,
        north,
        step,
        no_data_value,
        data,
    ))
}

fn grid_position(
    decoder: &mut Decoder<File>,
    path: &Path,
    cell: Option<Cell>,
    width: usize,
) -> Result<(f64, f64, f64), RasterError> {
    let tiepoint = decoder.get_tag_f64_vec(Tag::Unknown(TAG_TIEPOINT));
    let scale = decoder.get_tag_f64_vec(Tag::Unknown(TAG_PIXEL_SCALE));

    if let (Ok(tiepoint), Ok(scale)) = (tiepoint, scale) {
        if tiepoint.len() >= 6 && scale.len() >= 2 {
            // Tiepoint format: [i, j, k, x, y, z]; (x, y) is the outer
            // corner of the top-left pixel, so the sample center sits half
            // a pixel further in.
            let step = scale[0];
            let west = tiepoint[3] + step / 2.0;
            let north = tiepoint[4] - scale[1] / 2.0;

            return Ok((west, north, step));
        }
    }

    match cell {
        Some(cell) => {
            let step = 1.0 / (width - 1) as f64;
            Ok((cell.lon as f64, (cell.lat + 1) as f64, step))
        }
        None => Err(RasterError::MissingGeoreference(path.to_path_buf())),
    }
}

fn read_no_data(decoder: &mut Decoder<File>) -> f32 {
    decoder
        .get_tag_ascii_string(Tag::Unknown(TAG_GDAL_NODATA))
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_NO_DATA)
}

fn decode_samples(decoder: &mut Decoder<File>) -> Result<Vec<f32>, RasterError> {
    let result = decoder.read_image()?;

    let data = match result {
        DecodingResult::F32(data) => data,
        DecodingResult::F64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I16(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U8(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U16(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U64(data) => data.into_iter().map(|v| v as f32).collect(),
    };

    Ok(data)
}
