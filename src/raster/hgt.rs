use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt};

use crate::raster::{ElevationRaster, RasterError};
use crate::tile::Cell;

/// SRTM void sentinel.
pub const HGT_NO_DATA: f32 = -32768.0;

#[cfg(test)]
#[allow(unused_must_use)]
mod tests {
    use std::fs;

    use crate::raster::hgt::{load_hgt, HGT_NO_DATA};
    use crate::tile::Cell;
    use crate::utils::{synthetic_hgt_bytes, synthetic_hgt_bytes_with, with_input_and_output_paths};

    #[test]
    fn loads_a_square_grid_with_inferred_side_length() {
        with_input_and_output_paths(|input_path, _| {
            let path = input_path.join("N20E112.hgt");
            fs::write(&path, synthetic_hgt_bytes(5, 100)).unwrap();

            let raster = load_hgt(&path, Cell { lat: 20, lon: 112 }).unwrap();

            assert_eq!((5, 5), raster.dimensions());
            assert_eq!(112.0, raster.x(0));
            assert_eq!(21.0, raster.y(0));
            assert_eq!(113.0, raster.east());
            assert_eq!(20.0, raster.south());
            assert_eq!(0.25, raster.step());
            assert_eq!(100.0, raster.z(2, 2));
        });
    }

    #[test]
    fn voids_keep_the_srtm_sentinel() {
        with_input_and_output_paths(|input_path, _| {
            let path = input_path.join("N20E112.hgt");
            let bytes = synthetic_hgt_bytes_with(3, |col, row| {
                if col == 1 && row == 1 {
                    -32768
                } else {
                    42
                }
            });
            fs::write(&path, bytes).unwrap();

            let raster = load_hgt(&path, Cell { lat: 20, lon: 112 }).unwrap();

            assert_eq!(HGT_NO_DATA, raster.get_no_data_value());
            assert!(raster.is_no_data(raster.z(1, 1)));
            assert!(!raster.is_no_data(raster.z(0, 0)));
        });
    }

    #[test]
    fn truncated_files_are_rejected() {
        with_input_and_output_paths(|input_path, _| {
            let path = input_path.join("N20E112.hgt");
            fs::write(&path, vec![0u8; 24]).unwrap();

            assert!(load_hgt(&path, Cell { lat: 20, lon: 112 }).is_err());
        });
    }
}

/// Reads a raw SRTM .hgt grid: big-endian i16 samples in a square grid whose
/// side length is inferred from the file size (3601 for SRTM1, 1201 for
/// SRTM3). The outermost samples sit exactly on the cell edges, so the
/// sample spacing is 1/(side-1) degrees.
pub fn load_hgt(path: &Path, cell: Cell) -> Result<ElevationRaster, RasterError> {
    let len = path.metadata()?.len();
    let side = ((len / 2) as f64).sqrt() as usize;

    if side < 2 || (side * side * 2) as u64 != len {
        return Err(RasterError::NotSquare(path.to_path_buf(), len));
    }

    let mut samples = vec![0i16; side * side];
    let mut reader = BufReader::new(File::open(path)?);
    reader.read_i16_into::<BigEndian>(&mut samples)?;

    let data = samples.into_iter().map(|v| v as f32).collect();
    let step = 1.0 / (side - 1) as f64;

    Ok(ElevationRaster::new(
        side,
        side,
        cell.lon as f64,
        (cell.lat + 1) as f64,
        step,
        HGT_NO_DATA,
        data,
    ))
}
