use geo::Coordinate;

use crate::bbox::BoundingBox;
use crate::raster::ElevationRaster;

#[cfg(test)]
mod tests {
    use crate::bbox::BoundingBox;
    use crate::raster::ElevationRaster;
    use crate::sample::sample_raster;

    const NO_DATA: f32 = -32768.0;

    fn flat_raster(side: usize, elevation: f32) -> ElevationRaster {
        // one 1°x1° cell with samples on the edges
        let step = 1.0 / (side - 1) as f64;
        ElevationRaster::new(
            side,
            side,
            112.0,
            21.0,
            step,
            NO_DATA,
            vec![elevation; side * side],
        )
    }

    #[test]
    fn stride_one_keeps_every_pixel_inside_the_box() {
        let raster = flat_raster(11, 100.0);
        let bbox = BoundingBox::new(112.0, 20.0, 113.0, 21.0).unwrap();

        let points = sample_raster(&raster, &bbox, 1);

        assert_eq!(121, points.len());
        assert!(points.iter().all(|p| p.elevation == 100.0));
        assert!(points
            .iter()
            .all(|p| bbox.contains(p.position.x, p.position.y)));
    }

    #[test]
    fn the_box_clips_to_pixel_centers() {
        let raster = flat_raster(11, 100.0);
        // covers sample centers 112.2..=112.5 x 20.3..=20.6 on a 0.1° grid
        let bbox = BoundingBox::new(112.15, 20.25, 112.55, 20.65).unwrap();

        let points = sample_raster(&raster, &bbox, 1);

        assert_eq!(16, points.len());
        assert!(points.iter().all(|p| p.position.x >= 112.2 - 1e-9));
        assert!(points.iter().all(|p| p.position.x <= 112.5 + 1e-9));
    }

    // stride=N keeps roughly 1/N² of the stride=1 points
    #[test]
    fn stride_thins_quadratically() {
        let raster = flat_raster(101, 100.0);
        let bbox = BoundingBox::new(112.0, 20.0, 113.0, 21.0).unwrap();

        let dense = sample_raster(&raster, &bbox, 1).len();
        let thinned = sample_raster(&raster, &bbox, 5).len();

        assert_eq!(101 * 101, dense);
        assert_eq!(21 * 21, thinned);
    }

    #[test]
    fn nodata_pixels_never_appear_in_the_output() {
        let side = 5;
        let step = 1.0 / (side - 1) as f64;
        let mut data = vec![50.0f32; side * side];
        data[0] = NO_DATA;
        data[12] = NO_DATA;
        let raster = ElevationRaster::new(side, side, 112.0, 21.0, step, NO_DATA, data);
        let bbox = BoundingBox::new(112.0, 20.0, 113.0, 21.0).unwrap();

        let points = sample_raster(&raster, &bbox, 1);

        assert_eq!(side * side - 2, points.len());
        assert!(points.iter().all(|p| p.elevation != NO_DATA));
    }

    #[test]
    fn a_disjoint_box_yields_nothing() {
        let raster = flat_raster(11, 100.0);
        let bbox = BoundingBox::new(10.0, 10.0, 11.0, 11.0).unwrap();

        assert!(sample_raster(&raster, &bbox, 1).is_empty());
    }
}

/// One decimated elevation sample: pixel center in lon/lat plus the value.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePoint {
    pub position: Coordinate<f64>,
    pub elevation: f32,
}

/// Walks the raster every `stride` pixels per axis, keeping pixels whose
/// center falls inside the (closed) bounding box. Nodata pixels are dropped,
/// never emitted as zero elevation. The stride anchors at the first row and
/// column inside the box, so the decimated grid is stable for a given box.
pub fn sample_raster(
    raster: &ElevationRaster,
    bbox: &BoundingBox,
    stride: usize,
) -> Vec<SamplePoint> {
    debug_assert!(stride >= 1);

    let (columns, rows) = raster.dimensions();

    let first_column = (0..columns).find(|&c| raster.x(c) >= bbox.min_lon);
    let first_row = (0..rows).find(|&r| raster.y(r) <= bbox.max_lat);

    let (first_column, first_row) = match (first_column, first_row) {
        (Some(c), Some(r)) => (c, r),
        _ => return Vec::new(),
    };

    let mut points = Vec::new();

    for row in (first_row..rows).step_by(stride) {
        let lat = raster.y(row);

        if lat < bbox.min_lat {
            break;
        }

        for column in (first_column..columns).step_by(stride) {
            let lon = raster.x(column);

            if lon > bbox.max_lon {
                break;
            }

            let elevation = raster.z(column, row);

            if raster.is_no_data(elevation) {
                continue;
            }

            points.push(SamplePoint {
                position: Coordinate { x: lon, y: lat },
                elevation,
            });
        }
    }

    points
}
