#[cfg(test)]
mod test_helper;

use image::{codecs::png::PngEncoder, DynamicImage, GenericImageView};
use std::fs::File;
use std::io::{BufWriter, Error, ErrorKind};
use std::path::Path;

#[cfg(test)]
pub use test_helper::{
    synthetic_hgt_bytes, synthetic_hgt_bytes_with, with_input_and_output_paths,
    write_tile_archive,
};

pub fn encode_png(
    file_path: &Path,
    img: &DynamicImage,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let file = File::create(file_path)?;
    let ref mut buf = BufWriter::new(file);
    let encoder = PngEncoder::new(buf);

    let dim = img.dimensions();
    match encoder.encode(&img.to_bytes(), dim.0, dim.1, img.color()) {
        Ok(_) => Ok(()),
        Err(err) => Err(Box::new(Error::new(ErrorKind::Other, err.to_string()))),
    }
}
