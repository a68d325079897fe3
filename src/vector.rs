use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail};
use geo::Coordinate;
use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};

use crate::sample::SamplePoint;


/// ESRI well-known text for EPSG:4326, written next to the .shp so GIS tools
/// pick the coordinate system up.
pub const WGS84_WKT: &str = "GEOGCS[\"GCS_WGS_1984\",DATUM[\"D_WGS_1984\",\
SPHEROID[\"WGS_1984\",6378137.0,298.257223563]],PRIMEM[\"Greenwich\",0.0],\
UNIT[\"Degree\",0.0174532925199433]]";

/// The Shapefile container caps at 2GB.
pub const SHAPEFILE_MAX_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// Estimated .shp size: 100 byte file header plus 28 bytes per point record
/// (8 byte record header, 20 byte point geometry).
pub fn estimated_shp_bytes(point_count: usize) -> u64 {
    100 + point_count as u64 * 28
}

/// Writes the sample points as a point Shapefile with `elevation` and `city`
/// attributes, plus the EPSG:4326 .prj sidecar.
pub fn write_points(shp_path: &Path, points: &[SamplePoint], region: &str) -> anyhow::Result<()> {
    let table = TableWriterBuilder::new()
        .add_numeric_field(field_name("elevation")?, 10, 2)
        .add_character_field(field_name("city")?, 16);

    let mut writer = shapefile::Writer::from_path(shp_path, table)?;

    for point in points {
        let mut record = Record::default();
        record.insert(
            "elevation".to_string(),
            FieldValue::Numeric(Some(point.elevation as f64)),
        );
        record.insert(
            "city".to_string(),
            FieldValue::Character(Some(region.to_string())),
        );

        let shape = shapefile::Point::new(point.position.x, point.position.y);
        writer.write_shape_and_record(&shape, &record)?;
    }

    drop(writer);

    fs::write(shp_path.with_extension("prj"), WGS84_WKT)?;

    Ok(())
}

fn field_name(name: &str) -> anyhow::Result<FieldName> {
    FieldName::try_from(name).map_err(|e| anyhow!("Invalid dBase field name \"{}\": {:?}", name, e))
}

/// Reads a point dataset written by [write_points] back into sample points.
pub fn read_points(shp_path: &Path) -> anyhow::Result<Vec<SamplePoint>> {
    let mut reader = shapefile::Reader::from_path(shp_path)?;
    let mut points = Vec::new();

    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result?;

        let point = match shape {
            shapefile::Shape::Point(point) => point,
            other => bail!("Expected point geometry, found {}", other.shapetype()),
        };

        let elevation = match record.get("elevation") {
            Some(FieldValue::Numeric(Some(value))) => *value as f32,
            _ => bail!("'elevation' field missing from {}", shp_path.display()),
        };

        points.push(SamplePoint {
            position: Coordinate {
                x: point.x,
                y: point.y,
            },
            elevation,
        });
    }

    Ok(points)
}
