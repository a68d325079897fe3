use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::bail;
use clap::{arg, App, ArgMatches};

use crate::bbox::BoundingBox;
use crate::commands::Command;
use crate::heatmap::render_heatmap;
use crate::vector::read_points;


/// Elevation summary of a verified dataset.
#[derive(Debug)]
pub struct VerifyReport {
    pub count: usize,
    pub min_elevation: f32,
    pub max_elevation: f32,
    pub mean_elevation: f32,
}

pub struct Verify {}

impl Command for Verify {
    fn identifier(&self) -> &'static str {
        "verify"
    }

    fn register(&self) -> App<'static> {
        App::new(self.identifier())
            .about("Verify a written terrain Shapefile and render a heatmap preview.")
            .arg(arg!(--file [FILE] "Path to the .shp file"))
            .arg(arg!(--min_lon [MIN_LON] "Western edge of the bounding box in degrees"))
            .arg(arg!(--max_lon [MAX_LON] "Eastern edge of the bounding box in degrees"))
            .arg(arg!(--min_lat [MIN_LAT] "Southern edge of the bounding box in degrees"))
            .arg(arg!(--max_lat [MAX_LAT] "Northern edge of the bounding box in degrees"))
            .arg(arg!(-o --output [OUTPUT_DIR] "Path to output directory").default_value("output"))
    }

    fn run(&self, args: &ArgMatches) -> anyhow::Result<()> {
        let shp_path = target_path(args)?;
        self.exec(&shp_path)?;

        Ok(())
    }
}

impl Verify {
    pub fn exec(&self, shp_path: &Path) -> anyhow::Result<VerifyReport> {
        let start = Instant::now();

        if !shp_path.is_file() {
            bail!("Dataset not found at {}", shp_path.display());
        }

        let now = Instant::now();
        println!("▶️  Loading {}", shp_path.display());
        let points = read_points(shp_path)?;
        println!("✔️  Loaded dataset in {}ms", now.elapsed().as_millis());

        if points.is_empty() {
            bail!("Dataset {} holds no features", shp_path.display());
        }

        let min_x = points.iter().map(|p| p.position.x).fold(f64::INFINITY, f64::min);
        let max_x = points.iter().map(|p| p.position.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = points.iter().map(|p| p.position.y).fold(f64::INFINITY, f64::min);
        let max_y = points.iter().map(|p| p.position.y).fold(f64::NEG_INFINITY, f64::max);

        let min_elevation = points.iter().map(|p| p.elevation).fold(f32::MAX, f32::min);
        let max_elevation = points.iter().map(|p| p.elevation).fold(f32::MIN, f32::max);
        let mean_elevation =
            (points.iter().map(|p| p.elevation as f64).sum::<f64>() / points.len() as f64) as f32;

        println!("ℹ️  Feature count: {}", points.len());
        println!(
            "ℹ️  Bounds: lon {} to {}, lat {} to {}",
            min_x, max_x, min_y, max_y
        );
        println!("ℹ️  Elevation min: {:.2} m", min_elevation);
        println!("ℹ️  Elevation max: {:.2} m", max_elevation);
        println!("ℹ️  Elevation mean: {:.2} m", mean_elevation);

        let prj_path = shp_path.with_extension("prj");
        if prj_path.is_file() {
            println!("ℹ️  CRS sidecar: {}", prj_path.display());
        } else {
            println!("⚠️  No .prj sidecar found, coordinate system is undeclared");
        }

        let now = Instant::now();
        println!("▶️  Rendering heatmap preview");
        let png_path = shp_path.with_file_name("terrain_preview.png");
        render_heatmap(&points, &png_path)?;
        println!(
            "✔️  Saved {} in {}ms",
            png_path.display(),
            now.elapsed().as_millis()
        );

        println!("\n    🎉  Finished in {}ms", start.elapsed().as_millis());

        Ok(VerifyReport {
            count: points.len(),
            min_elevation,
            max_elevation,
            mean_elevation,
        })
    }
}

/// The dataset either comes straight from --file or is re-derived from the
/// bounding box through the same directory naming the converter uses.
fn target_path(args: &ArgMatches) -> anyhow::Result<PathBuf> {
    if let Some(file) = args.value_of("file") {
        return Ok(PathBuf::from(file));
    }

    let corners = ["min_lon", "min_lat", "max_lon", "max_lat"]
        .map(|name| args.value_of(name).map(|raw| raw.parse::<f64>()));

    match corners {
        [Some(Ok(min_lon)), Some(Ok(min_lat)), Some(Ok(max_lon)), Some(Ok(max_lat))] => {
            let bbox = BoundingBox::new(min_lon, min_lat, max_lon, max_lat)?;
            let output_dir = PathBuf::from(args.value_of("output").unwrap());

            Ok(output_dir.join(bbox.dir_name()).join("terrain.shp"))
        }
        [None, None, None, None] => {
            bail!("Provide either --file or all of --min_lon, --max_lon, --min_lat, --max_lat")
        }
        _ => bail!("Incomplete or invalid bounding box flags"),
    }
}
