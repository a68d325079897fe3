use nom::{
    branch::alt,
    character::complete::{one_of, u32 as u32_parser},
    combinator::value,
    error::ParseError,
    sequence::pair,
    IResult,
};

use crate::bbox::BoundingBox;


#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TileNameError {
    #[error("No tile coordinate found in \"{0}\"")]
    NoCoordinate(String),

    #[error("Latitude {0} is out of range")]
    LatitudeOutOfRange(u32),

    #[error("Longitude {0} is out of range")]
    LongitudeOutOfRange(u32),

    #[error("NOM returned an error: {}", .0.description())]
    Nom(nom::error::ErrorKind),
}

impl<I> ParseError<I> for TileNameError {
    fn from_error_kind(_: I, kind: nom::error::ErrorKind) -> Self {
        TileNameError::Nom(kind)
    }

    fn append(_: I, _: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

/// One 1°×1° elevation tile cell, anchored at its southwest corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cell {
    pub lat: i32,
    pub lon: i32,
}

impl Cell {
    /// Canonical tile name, e.g. "N30E120" or "S01W077".
    pub fn name(&self) -> String {
        let ns = if self.lat >= 0 { 'N' } else { 'S' };
        let ew = if self.lon >= 0 { 'E' } else { 'W' };

        format!("{}{:02}{}{:03}", ns, self.lat.abs(), ew, self.lon.abs())
    }

    /// Overlap test against a bounding box. The cell covers the half-open
    /// square [lat, lat+1) × [lon, lon+1); the box is closed on all edges.
    pub fn intersects(&self, bbox: &BoundingBox) -> bool {
        let (lat, lon) = (self.lat as f64, self.lon as f64);

        lat <= bbox.max_lat
            && lat + 1.0 > bbox.min_lat
            && lon <= bbox.max_lon
            && lon + 1.0 > bbox.min_lon
    }
}

fn hemisphere_lat(input: &str) -> IResult<&str, i32, TileNameError> {
    alt((value(1, one_of("Nn")), value(-1, one_of("Ss"))))(input)
}

fn hemisphere_lon(input: &str) -> IResult<&str, i32, TileNameError> {
    alt((value(1, one_of("Ee")), value(-1, one_of("Ww"))))(input)
}

fn cell(input: &str) -> IResult<&str, Cell, TileNameError> {
    let (input, (ns, lat)) = pair(hemisphere_lat, u32_parser)(input)?;
    let (input, (ew, lon)) = pair(hemisphere_lon, u32_parser)(input)?;

    if lat > 90 {
        return Err(nom::Err::Error(TileNameError::LatitudeOutOfRange(lat)));
    }

    if lon > 180 {
        return Err(nom::Err::Error(TileNameError::LongitudeOutOfRange(lon)));
    }

    Ok((
        input,
        Cell {
            lat: ns * lat as i32,
            lon: ew * lon as i32,
        },
    ))
}

/// Scans a file name (or path) for an embedded "N30E120"-style coordinate
/// and returns the cell it names.
pub fn parse_tile_name(name: &str) -> Result<Cell, TileNameError> {
    for (idx, ch) in name.char_indices() {
        if matches!(ch, 'N' | 'S' | 'n' | 's') {
            if let Ok((_, cell)) = cell(&name[idx..]) {
                return Ok(cell);
            }
        }
    }

    Err(TileNameError::NoCoordinate(name.to_string()))
}
