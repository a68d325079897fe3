use std::fmt;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::bbox::{coord_label, BoundingBox};

    #[test]
    fn new_bails_on_flipped_axes() {
        assert!(BoundingBox::new(116.0, 20.0, 112.0, 24.0).is_err());
        assert!(BoundingBox::new(112.0, 24.0, 116.0, 20.0).is_err());
        assert!(BoundingBox::new(112.0, 20.0, 112.0, 24.0).is_err());
    }

    #[test]
    fn contains_includes_the_edges() {
        let bbox = BoundingBox::new(112.0, 20.0, 116.0, 24.0).unwrap();

        assert!(bbox.contains(112.0, 20.0));
        assert!(bbox.contains(116.0, 24.0));
        assert!(bbox.contains(114.0, 22.0));
        assert!(!bbox.contains(111.999, 22.0));
        assert!(!bbox.contains(114.0, 24.001));
    }

    #[rstest]
    #[case(20.0, true, "N20")]
    #[case(-3.0, true, "S3")]
    #[case(20.5, true, "N20.50")]
    #[case(112.25, false, "E112.25")]
    #[case(-77.0, false, "W77")]
    #[case(0.0, true, "N0")]
    fn coord_label_matches_convention(#[case] value: f64, #[case] is_lat: bool, #[case] expected: &str) {
        assert_eq!(expected, coord_label(value, is_lat));
    }

    #[test]
    fn dir_name_is_min_corner_then_max_corner() {
        let bbox = BoundingBox::new(112.0, 20.0, 116.0, 24.0).unwrap();
        assert_eq!("N20E112_N24E116", bbox.dir_name());
        assert_eq!("N20E112", bbox.min_corner_label());

        let fractional = BoundingBox::new(-77.5, -3.25, -76.0, -2.0).unwrap();
        assert_eq!("S3.25W77.50_S2W76", fractional.dir_name());
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BoundsError {
    #[error("min_lon ({0}) must be smaller than max_lon ({1})")]
    LonFlipped(f64, f64),

    #[error("min_lat ({0}) must be smaller than max_lat ({1})")]
    LatFlipped(f64, f64),
}

/// Geographic bounding box in degrees. Both edges are part of the box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self, BoundsError> {
        if min_lon >= max_lon {
            return Err(BoundsError::LonFlipped(min_lon, max_lon));
        }

        if min_lat >= max_lat {
            return Err(BoundsError::LatFlipped(min_lat, max_lat));
        }

        Ok(BoundingBox {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Label of the southwest corner, e.g. "N20E112". Doubles as the
    /// region attribute written into the output dataset.
    pub fn min_corner_label(&self) -> String {
        format!(
            "{}{}",
            coord_label(self.min_lat, true),
            coord_label(self.min_lon, false)
        )
    }

    pub fn max_corner_label(&self) -> String {
        format!(
            "{}{}",
            coord_label(self.max_lat, true),
            coord_label(self.max_lon, false)
        )
    }

    /// Name of the output directory for this box, e.g. "N20E112_N24E116".
    pub fn dir_name(&self) -> String {
        format!("{}_{}", self.min_corner_label(), self.max_corner_label())
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "lon {} to {}, lat {} to {}",
            self.min_lon, self.max_lon, self.min_lat, self.max_lat
        )
    }
}

/// Hemisphere letter plus degrees. Whole degrees lose the decimals,
/// fractional ones keep two ("N20" vs. "N20.50").
pub fn coord_label(value: f64, is_lat: bool) -> String {
    let direction = match (is_lat, value >= 0.0) {
        (true, true) => 'N',
        (true, false) => 'S',
        (false, true) => 'E',
        (false, false) => 'W',
    };

    let abs = value.abs();

    if abs.fract() == 0.0 {
        format!("{}{}", direction, abs as i64)
    } else {
        format!("{}{:.2}", direction, abs)
    }
}
