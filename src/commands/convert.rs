use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{arg, App, ArgMatches};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::bbox::BoundingBox;
use crate::commands::Command;
use crate::raster::{load_raster, merge, ElevationRaster};
use crate::sample::sample_raster;
use crate::tile::extract::extract_all;
use crate::tile::{locate_archives, parse_tile_name, select_tiles};
use crate::vector::{estimated_shp_bytes, write_points, SHAPEFILE_MAX_BYTES};


pub struct ConvertOptions {
    pub bbox: BoundingBox,
    pub step: usize,
    pub file: Option<PathBuf>,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
}

pub struct Convert {}

impl Command for Convert {
    fn identifier(&self) -> &'static str {
        "convert"
    }

    fn register(&self) -> App<'static> {
        App::new(self.identifier())
            .about("Convert SRTM elevation tiles to a point Shapefile clipped to a bounding box.")
            .arg(arg!(--min_lon <MIN_LON> "Western edge of the bounding box in degrees"))
            .arg(arg!(--max_lon <MAX_LON> "Eastern edge of the bounding box in degrees"))
            .arg(arg!(--min_lat <MIN_LAT> "Southern edge of the bounding box in degrees"))
            .arg(arg!(--max_lat <MAX_LAT> "Northern edge of the bounding box in degrees"))
            .arg(arg!(--step [STEP] "Downsampling step, 1 keeps every pixel").default_value("1"))
            .arg(arg!(--file [FILE] "Explicit raster file, bypassing the tile search"))
            .arg(arg!(--data [DATA_DIR] "Directory to search for tile archives").default_value("earthdata"))
            .arg(arg!(-o --output [OUTPUT_DIR] "Path to output directory").default_value("output"))
    }

    fn run(&self, args: &ArgMatches) -> anyhow::Result<()> {
        let bbox = BoundingBox::new(
            float_arg(args, "min_lon")?,
            float_arg(args, "min_lat")?,
            float_arg(args, "max_lon")?,
            float_arg(args, "max_lat")?,
        )?;

        let raw_step = args.value_of("step").unwrap();
        let step: usize = raw_step
            .parse()
            .with_context(|| format!("--step expects a positive integer, got \"{}\"", raw_step))?;
        if step < 1 {
            bail!("--step must be at least 1");
        }

        let opts = ConvertOptions {
            bbox,
            step,
            file: args.value_of("file").map(PathBuf::from),
            data_dir: PathBuf::from(args.value_of("data").unwrap()),
            output_dir: PathBuf::from(args.value_of("output").unwrap()),
        };

        self.exec(&opts)
    }
}

impl Convert {
    pub fn exec(&self, opts: &ConvertOptions) -> anyhow::Result<()> {
        let start = Instant::now();

        let rasters = match &opts.file {
            Some(file) => vec![load_explicit_raster(file)?],
            None => load_covering_tiles(opts)?,
        };

        let now = Instant::now();
        println!("▶️  Merging {} raster(s)", rasters.len());
        let mosaic = merge(rasters);
        println!("✔️  Merged in {}ms", now.elapsed().as_millis());

        let now = Instant::now();
        println!("▶️  Clipping and sampling (step {})", opts.step);
        let points = sample_raster(&mosaic, &opts.bbox, opts.step);
        if points.is_empty() {
            bail!(
                "No valid elevation points found for the requested range ({})",
                opts.bbox
            );
        }
        println!(
            "✔️  Sampled {} points in {}ms",
            points.len(),
            now.elapsed().as_millis()
        );

        if points.len() > 1_000_000 {
            println!("⚠️  Generating more than one million points, this may be slow");
        }

        if estimated_shp_bytes(points.len()) > SHAPEFILE_MAX_BYTES {
            println!(
                "⚠️  Estimated output exceeds the 2GB Shapefile limit, consider a larger --step; writing anyway"
            );
        }

        let out_dir = opts.output_dir.join(opts.bbox.dir_name());
        std::fs::create_dir_all(&out_dir)?;

        let now = Instant::now();
        println!("▶️  Saving Shapefile");
        let shp_path = out_dir.join("terrain.shp");
        write_points(&shp_path, &points, &opts.bbox.min_corner_label())?;
        println!(
            "✔️  Saved {} in {}ms",
            shp_path.display(),
            now.elapsed().as_millis()
        );

        println!("\n    🎉  Finished in {}ms", start.elapsed().as_millis());

        Ok(())
    }
}

fn float_arg(args: &ArgMatches, name: &str) -> anyhow::Result<f64> {
    let raw = args.value_of(name).unwrap();

    raw.parse()
        .with_context(|| format!("--{} expects a number, got \"{}\"", name, raw))
}

fn load_explicit_raster(file: &Path) -> anyhow::Result<ElevationRaster> {
    let now = Instant::now();
    println!("▶️  Loading raster {}", file.display());

    let cell = file
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| parse_tile_name(n).ok());

    let raster = load_raster(file, cell)?;
    println!("✔️  Loaded raster in {}ms", now.elapsed().as_millis());

    Ok(raster)
}

fn load_covering_tiles(opts: &ConvertOptions) -> anyhow::Result<Vec<ElevationRaster>> {
    println!("▶️  Searching for tiles in {}", opts.data_dir.display());
    let archives = locate_archives(&opts.data_dir)?;

    if archives.is_empty() {
        println!("⚠️  No tile archives found below {}", opts.data_dir.display());
    }

    let selected = select_tiles(archives, &opts.bbox);
    if selected.is_empty() {
        bail!("No elevation data found for the requested range ({})", opts.bbox);
    }

    let names: Vec<String> = selected.iter().map(|a| a.cell.name()).collect();
    println!("✔️  Selected {} tile(s): {}", selected.len(), names.join(", "));

    let now = Instant::now();
    println!("▶️  Extracting archives");
    let cache_dir = opts.output_dir.join("temp_tiles");
    let extracted = extract_all(&selected, &cache_dir)?;
    println!(
        "✔️  Extracted {} archive(s) in {}ms",
        extracted.len(),
        now.elapsed().as_millis()
    );

    let now = Instant::now();
    println!("▶️  Reading rasters");

    let (ok_results, err_results): (Vec<_>, Vec<_>) = extracted
        .into_par_iter()
        .map(|(cell, path)| load_raster(&path, Some(cell)))
        .partition(Result::is_ok);

    if !err_results.is_empty() {
        let error_string: Vec<_> = err_results
            .into_iter()
            .map(|r| format!("\t{}", r.err().unwrap()))
            .collect();

        bail!("Failed to read (multiple) raster(s):\n{}", error_string.join("\n"));
    }

    println!("✔️  Read rasters in {}ms", now.elapsed().as_millis());

    Ok(ok_results.into_iter().map(|r| r.unwrap()).collect())
}
