pub mod extract;
pub mod name;

use std::path::{Path, PathBuf};

use anyhow::bail;
use glob::glob;

use crate::bbox::BoundingBox;

pub use name::{parse_tile_name, Cell};


/// A located tile archive together with the cell its name encodes.
#[derive(Debug, Clone)]
pub struct TileArchive {
    pub path: PathBuf,
    pub cell: Cell,
}

impl TileArchive {
    fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    fn is_hgt(&self) -> bool {
        self.file_name().contains(".hgt")
    }
}

fn is_metadata_archive(file_name: &str) -> bool {
    file_name.contains(".num") || file_name.contains(".swb")
}

/// Recursively collects elevation tile archives below `data_dir`. Archives
/// carrying only auxiliary SRTM products and macOS "._" sidecars are
/// excluded; every exclusion besides the sidecars is reported.
pub fn locate_archives(data_dir: &Path) -> anyhow::Result<Vec<TileArchive>> {
    if !data_dir.is_dir() {
        bail!("Tile directory {} does not exist", data_dir.display());
    }

    let mut archives = Vec::new();

    for pattern in ["**/*.zip", "**/*.gz"] {
        let full_pattern = match data_dir.join(pattern).to_str() {
            Some(p) => p.to_owned(),
            None => bail!("Tile directory {} is not valid UTF-8", data_dir.display()),
        };

        for entry in glob(&full_pattern)? {
            let path = entry?;

            let file_name = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n.to_owned(),
                None => continue,
            };

            if file_name.starts_with("._") {
                continue;
            }

            if is_metadata_archive(&file_name) {
                println!(
                    "⚠️  Skipping {}: contains no elevation data (metadata product)",
                    path.display()
                );
                continue;
            }

            match parse_tile_name(&file_name) {
                Ok(cell) => archives.push(TileArchive { path, cell }),
                Err(_) => println!(
                    "⚠️  Skipping {}: no tile coordinate in file name",
                    path.display()
                ),
            }
        }
    }

    archives.sort_by(|a, b| a.cell.cmp(&b.cell).then_with(|| a.path.cmp(&b.path)));

    Ok(archives)
}

/// Keeps the archives whose cells overlap the bounding box. When one cell is
/// covered by several archives the .hgt one wins (elevation exchange format
/// over rendered GeoTIFF).
pub fn select_tiles(archives: Vec<TileArchive>, bbox: &BoundingBox) -> Vec<TileArchive> {
    let mut selected: Vec<TileArchive> = archives
        .into_iter()
        .filter(|a| a.cell.intersects(bbox))
        .collect();

    selected.sort_by(|a, b| a.cell.cmp(&b.cell).then_with(|| b.is_hgt().cmp(&a.is_hgt())));
    selected.dedup_by_key(|a| a.cell);

    selected
}
