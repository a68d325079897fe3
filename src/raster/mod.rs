mod hgt;
mod mosaic;
mod tif;

use std::path::{Path, PathBuf};

pub use mosaic::merge;

use crate::tile::Cell;

#[derive(thiserror::Error, Debug)]
pub enum RasterError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("{} is not a square elevation grid ({} bytes)", .0.display(), .1)]
    NotSquare(PathBuf, u64),

    #[error("{} carries no geotransform and no tile coordinate in its name", .0.display())]
    MissingGeoreference(PathBuf),

    #[error("Unsupported raster format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// An elevation raster on a geographic grid. `west`/`north` locate the
/// center of the top-left sample, `step` is the spacing between neighboring
/// sample centers in degrees on both axes.
#[derive(Debug)]
pub struct ElevationRaster {
    columns: usize,
    rows: usize,
    west: f64,
    north: f64,
    step: f64,
    /// the magic value used for "unknown value in this cell"
    no_data_value: f32,
    data: Vec<f32>,
}

impl ElevationRaster {
    pub fn new(
        columns: usize,
        rows: usize,
        west: f64,
        north: f64,
        step: f64,
        no_data_value: f32,
        data: Vec<f32>,
    ) -> Self {
        debug_assert_eq!(columns * rows, data.len());

        ElevationRaster {
            columns,
            rows,
            west,
            north,
            step,
            no_data_value,
            data,
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    /// Longitude of the sample centers in `column`.
    pub fn x(&self, column: usize) -> f64 {
        self.west + column as f64 * self.step
    }

    /// Latitude of the sample centers in `row`. Rows run north to south.
    pub fn y(&self, row: usize) -> f64 {
        self.north - row as f64 * self.step
    }

    pub fn z(&self, column: usize, row: usize) -> f32 {
        self.data[column + row * self.columns]
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    pub fn east(&self) -> f64 {
        self.x(self.columns - 1)
    }

    pub fn south(&self) -> f64 {
        self.y(self.rows - 1)
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn get_no_data_value(&self) -> f32 {
        self.no_data_value
    }

    pub fn is_no_data(&self, value: f32) -> bool {
        value == self.no_data_value
    }
}

/// Loads a raster by extension. `.hgt` carries no georeference of its own,
/// so the tile cell (usually parsed from the file name) is required there
/// and serves as the fallback for GeoTIFFs without geotags.
pub fn load_raster(path: &Path, cell: Option<Cell>) -> Result<ElevationRaster, RasterError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "hgt" => {
            let cell = cell.ok_or_else(|| RasterError::MissingGeoreference(path.to_path_buf()))?;
            hgt::load_hgt(path, cell)
        }
        "tif" | "tiff" => tif::load_tif(path, cell),
        _ => Err(RasterError::UnsupportedFormat(path.to_path_buf())),
    }
}
