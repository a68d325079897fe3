use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{create_dir_all, File};
use std::io::{copy, BufReader};
use std::path::{Path, PathBuf};

use anyhow::bail;
use flate2::bufread::GzDecoder;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use zip::ZipArchive;

use crate::tile::{Cell, TileArchive};


type Underlying = Box<dyn Error + Send + Sync>;

/// Extraction failure for one archive, carrying the archive path so the
/// aggregated report names the offender.
#[derive(Debug)]
pub struct ExtractError {
    archive: PathBuf,
    original_error: Underlying,
}

impl ExtractError {
    pub fn new(archive: &Path, original_error: impl Into<Underlying>) -> Self {
        ExtractError {
            archive: archive.to_path_buf(),
            original_error: original_error.into(),
        }
    }
}

impl Display for ExtractError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}: {}", self.archive.display(), self.original_error)
    }
}

impl Error for ExtractError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.original_error)
    }
}

#[derive(thiserror::Error, Debug)]
enum ArchiveContentError {
    #[error("archive holds only metadata members (.num), no elevation data")]
    MetadataOnly,

    #[error("no .hgt or .tif member found")]
    NoElevationMember,
}

fn member_extension(member_name: &str) -> Option<&'static str> {
    let base = member_name.rsplit('/').next().unwrap_or(member_name);
    let lower = base.to_lowercase();

    if lower.starts_with("._") {
        return None;
    }

    if lower.ends_with(".hgt") {
        Some("hgt")
    } else if lower.ends_with(".tif") || lower.ends_with(".tiff") {
        Some("tif")
    } else {
        None
    }
}

fn cached_raster(cell: Cell, cache_dir: &Path) -> Option<PathBuf> {
    for ext in ["hgt", "tif"] {
        let candidate = cache_dir.join(format!("{}.{}", cell.name(), ext));

        match candidate.metadata() {
            Ok(meta) if meta.len() > 0 => return Some(candidate),
            _ => continue,
        }
    }

    None
}

fn extract_zip(archive_path: &Path, cell: Cell, cache_dir: &Path) -> Result<PathBuf, Underlying> {
    let file = File::open(archive_path)?;
    let mut zip = ZipArchive::new(BufReader::new(file))?;

    let mut member_index = None;
    let mut saw_metadata = false;

    for index in 0..zip.len() {
        let name = zip.by_index(index)?.name().to_owned();

        if name.to_lowercase().ends_with(".num") {
            saw_metadata = true;
            continue;
        }

        if member_extension(&name).is_some() {
            member_index = Some(index);
            break;
        }
    }

    let index = match member_index {
        Some(index) => index,
        None if saw_metadata => return Err(ArchiveContentError::MetadataOnly.into()),
        None => return Err(ArchiveContentError::NoElevationMember.into()),
    };

    let mut member = zip.by_index(index)?;
    let extension = member_extension(member.name()).unwrap_or("hgt");
    let target = cache_dir.join(format!("{}.{}", cell.name(), extension));

    let mut out = File::create(&target)?;
    copy(&mut member, &mut out)?;

    Ok(target)
}

fn extract_gz(archive_path: &Path, cell: Cell, cache_dir: &Path) -> Result<PathBuf, Underlying> {
    let inner_name = archive_path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let extension = match member_extension(inner_name) {
        Some(ext) => ext,
        None => return Err(ArchiveContentError::NoElevationMember.into()),
    };

    let file = File::open(archive_path)?;
    let mut decoder = GzDecoder::new(BufReader::new(file));

    let target = cache_dir.join(format!("{}.{}", cell.name(), extension));
    let mut out = File::create(&target)?;
    copy(&mut decoder, &mut out)?;

    Ok(target)
}

/// Decompresses one archive into the cache, skipping work when the raster is
/// already there. Returns the path of the cached raster.
pub fn extract_tile(archive: &TileArchive, cache_dir: &Path) -> Result<PathBuf, ExtractError> {
    if let Some(cached) = cached_raster(archive.cell, cache_dir) {
        return Ok(cached);
    }

    let is_gz = archive
        .path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);

    let result = if is_gz {
        extract_gz(&archive.path, archive.cell, cache_dir)
    } else {
        extract_zip(&archive.path, archive.cell, cache_dir)
    };

    result.map_err(|e| ExtractError::new(&archive.path, e))
}

/// Fans the extraction of independent archives out over a rayon worker pool.
/// Tile cells are disjoint by name, so the workers never write the same
/// cache file. Per-archive failures are reported and the survivors carry on;
/// only a fully failed batch aborts the run.
pub fn extract_all(
    archives: &[TileArchive],
    cache_dir: &Path,
) -> anyhow::Result<Vec<(Cell, PathBuf)>> {
    create_dir_all(cache_dir)?;

    let (ok_results, err_results): (Vec<_>, Vec<_>) = archives
        .par_iter()
        .map(|archive| -> Result<(Cell, PathBuf), ExtractError> {
            let path = extract_tile(archive, cache_dir)?;
            Ok((archive.cell, path))
        })
        .partition(Result::is_ok);

    for result in &err_results {
        println!("    ❌  {}", result.as_ref().err().unwrap());
    }

    if ok_results.is_empty() {
        bail!("All {} archive extraction(s) failed", err_results.len());
    }

    Ok(ok_results.into_iter().map(|r| r.unwrap()).collect())
}
