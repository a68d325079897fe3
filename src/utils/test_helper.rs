use std::fs::{DirBuilder, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, WriteBytesExt};
use tempdir::TempDir;
use zip::write::FileOptions;
use zip::ZipWriter;

/// Runs `f` with a fresh input and output directory below a tempdir.
pub fn with_input_and_output_paths(f: impl FnOnce(PathBuf, PathBuf)) -> std::io::Result<()> {
    let dir = TempDir::new("terrain-utils")?;
    let temp_dir_path = dir.path();
    let input_path = temp_dir_path.join("input");
    let output_path = temp_dir_path.join("output");
    DirBuilder::new().create(&input_path)?;
    DirBuilder::new().create(&output_path)?;

    f(input_path, output_path);

    dir.close()
}

/// Raw .hgt bytes for a square grid with per-sample elevations.
pub fn synthetic_hgt_bytes_with(side: usize, elevation: impl Fn(usize, usize) -> i16) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(side * side * 2);

    for row in 0..side {
        for col in 0..side {
            bytes
                .write_i16::<BigEndian>(elevation(col, row))
                .expect("write to vec");
        }
    }

    bytes
}

/// Raw .hgt bytes for a square grid of constant elevation.
pub fn synthetic_hgt_bytes(side: usize, elevation: i16) -> Vec<u8> {
    synthetic_hgt_bytes_with(side, |_, _| elevation)
}

/// Writes a zip archive holding a single member, the way SRTM tiles are
/// distributed, and returns its path.
pub fn write_tile_archive(
    dir: &Path,
    archive_name: &str,
    member_name: &str,
    payload: &[u8],
) -> PathBuf {
    let path = dir.join(archive_name);

    let file = File::create(&path).expect("create archive");
    let mut zip = ZipWriter::new(file);
    zip.start_file(member_name, FileOptions::default())
        .expect("start zip member");
    zip.write_all(payload).expect("write zip member");
    zip.finish().expect("finish archive");

    path
}
