use crate::raster::ElevationRaster;

#[cfg(test)]
mod tests {
    use crate::raster::mosaic::merge;
    use crate::raster::ElevationRaster;

    const NO_DATA: f32 = -32768.0;

    fn raster(west: f64, north: f64, fill: f32) -> ElevationRaster {
        // 3x3 grid spanning one degree, samples on the cell edges
        ElevationRaster::new(3, 3, west, north, 0.5, NO_DATA, vec![fill; 9])
    }

    #[test]
    fn single_raster_passes_through() {
        let merged = merge(vec![raster(112.0, 21.0, 7.0)]);

        assert_eq!((3, 3), merged.dimensions());
        assert_eq!(7.0, merged.z(1, 1));
    }

    #[test]
    fn adjacent_rasters_merge_into_the_union_extent() {
        let merged = merge(vec![raster(112.0, 21.0, 1.0), raster(113.0, 21.0, 2.0)]);

        assert_eq!((5, 3), merged.dimensions());
        assert_eq!(112.0, merged.west());
        assert_eq!(21.0, merged.north());
        assert_eq!(114.0, merged.east());
        assert_eq!(20.0, merged.south());

        assert_eq!(1.0, merged.z(0, 0));
        assert_eq!(2.0, merged.z(4, 2));
        // the shared edge column comes from the first raster
        assert_eq!(1.0, merged.z(2, 1));
    }

    #[test]
    fn diagonal_rasters_leave_uncovered_corners_as_nodata() {
        let merged = merge(vec![raster(112.0, 21.0, 1.0), raster(113.0, 22.0, 2.0)]);

        assert_eq!((5, 5), merged.dimensions());
        // northwest corner is covered by neither input
        assert!(merged.is_no_data(merged.z(0, 0)));
        assert_eq!(2.0, merged.z(4, 0));
        assert_eq!(1.0, merged.z(0, 4));
    }

    #[test]
    fn nodata_inputs_are_filled_by_later_rasters() {
        let mut data = vec![5.0f32; 9];
        data[4] = NO_DATA;
        let holey = ElevationRaster::new(3, 3, 112.0, 21.0, 0.5, NO_DATA, data);

        let merged = merge(vec![holey, raster(112.0, 21.0, 9.0)]);

        assert_eq!(9.0, merged.z(1, 1));
        assert_eq!(5.0, merged.z(0, 0));
    }
}

/// Merges rasters onto one grid covering the union of their extents, at the
/// finest input resolution. The first raster wins where inputs overlap;
/// nodata cells are filled by later rasters; cells no input covers stay
/// nodata. A single input passes through untouched.
pub fn merge(mut rasters: Vec<ElevationRaster>) -> ElevationRaster {
    if rasters.len() == 1 {
        return rasters.remove(0);
    }

    let step = rasters.iter().map(|r| r.step()).fold(f64::INFINITY, f64::min);
    let west = rasters.iter().map(|r| r.west()).fold(f64::INFINITY, f64::min);
    let east = rasters.iter().map(|r| r.east()).fold(f64::NEG_INFINITY, f64::max);
    let north = rasters.iter().map(|r| r.north()).fold(f64::NEG_INFINITY, f64::max);
    let south = rasters.iter().map(|r| r.south()).fold(f64::INFINITY, f64::min);

    let columns = ((east - west) / step).round() as usize + 1;
    let rows = ((north - south) / step).round() as usize + 1;

    let no_data_value = rasters[0].get_no_data_value();
    let mut data = vec![no_data_value; columns * rows];

    for raster in &rasters {
        let col_0 = (((raster.west() - west) / step).round() as isize).max(0) as usize;
        let col_1 = ((((raster.east() - west) / step).round() as isize).min(columns as isize - 1)) as usize;
        let row_0 = (((north - raster.north()) / step).round() as isize).max(0) as usize;
        let row_1 = ((((north - raster.south()) / step).round() as isize).min(rows as isize - 1)) as usize;

        let (source_columns, source_rows) = raster.dimensions();

        for row in row_0..=row_1 {
            let lat = north - row as f64 * step;
            let source_row = ((raster.north() - lat) / raster.step()).round() as isize;

            if source_row < 0 || source_row >= source_rows as isize {
                continue;
            }

            for col in col_0..=col_1 {
                let index = col + row * columns;

                if data[index] != no_data_value {
                    continue;
                }

                let lon = west + col as f64 * step;
                let source_col = ((lon - raster.west()) / raster.step()).round() as isize;

                if source_col < 0 || source_col >= source_columns as isize {
                    continue;
                }

                let value = raster.z(source_col as usize, source_row as usize);

                if !raster.is_no_data(value) {
                    data[index] = value;
                }
            }
        }
    }

    ElevationRaster::new(columns, rows, west, north, step, no_data_value, data)
}
