use std::path::Path;

use anyhow::{anyhow, bail};
use image::{DynamicImage, Rgb, RgbImage};

use crate::sample::SamplePoint;
use crate::utils::encode_png;

#[cfg(test)]
#[allow(unused_must_use)]
mod tests {
    use geo::Coordinate;
    use image::GenericImageView;

    use crate::heatmap::{elevation_to_rgb, render_heatmap};
    use crate::sample::SamplePoint;
    use crate::utils::with_input_and_output_paths;

    fn point(x: f64, y: f64, elevation: f32) -> SamplePoint {
        SamplePoint {
            position: Coordinate { x, y },
            elevation,
        }
    }

    #[test]
    fn renders_a_png_sized_to_the_point_extent() {
        with_input_and_output_paths(|_, output_path| {
            let png_path = output_path.join("terrain_preview.png");
            let points = vec![
                point(112.0, 20.0, 0.0),
                point(113.0, 20.5, 500.0),
                point(114.0, 21.0, 1000.0),
            ];

            render_heatmap(&points, &png_path).unwrap();

            let img = image::open(&png_path).unwrap();
            let (w, h) = img.dimensions();
            assert_eq!(1024, w);
            // lat spans half the lon range
            assert_eq!(512, h);
        });
    }

    #[test]
    fn rendering_nothing_is_an_error() {
        with_input_and_output_paths(|_, output_path| {
            assert!(render_heatmap(&[], &output_path.join("preview.png")).is_err());
        });
    }

    #[test]
    fn the_ramp_spreads_over_distinct_colors() {
        assert_ne!(elevation_to_rgb(0.0), elevation_to_rgb(0.5));
        assert_ne!(elevation_to_rgb(0.5), elevation_to_rgb(1.0));
    }
}

const PREVIEW_WIDTH: u32 = 1024;
const BACKGROUND: Rgb<u8> = Rgb([245, 245, 245]);

// low-to-high terrain ramp: sea blue, shore cyan, lowland green,
// midland yellow, highland brown, peak white
const RAMP: [(f32, [u8; 3]); 6] = [
    (0.00, [51, 51, 153]),
    (0.15, [0, 153, 255]),
    (0.30, [26, 178, 102]),
    (0.55, [230, 230, 128]),
    (0.80, [128, 92, 77]),
    (1.00, [255, 255, 255]),
];

/// Maps a normalized elevation (0..=1) onto the terrain color ramp.
fn elevation_to_rgb(t: f32) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);

    for window in RAMP.windows(2) {
        let (t_0, c_0) = window[0];
        let (t_1, c_1) = window[1];

        if t <= t_1 {
            let f = if t_1 > t_0 { (t - t_0) / (t_1 - t_0) } else { 0.0 };

            let mut channels = [0u8; 3];
            for i in 0..3 {
                channels[i] = (c_0[i] as f32 + f * (c_1[i] as f32 - c_0[i] as f32)) as u8;
            }

            return Rgb(channels);
        }
    }

    Rgb(RAMP[RAMP.len() - 1].1)
}

/// Rasterizes the sample points into a colored preview image and writes it
/// as a PNG. Pure diagnostic output, the dataset itself is untouched.
pub fn render_heatmap(points: &[SamplePoint], png_path: &Path) -> anyhow::Result<()> {
    if points.is_empty() {
        bail!("No points to render");
    }

    let min_x = points.iter().map(|p| p.position.x).fold(f64::INFINITY, f64::min);
    let max_x = points.iter().map(|p| p.position.x).fold(f64::NEG_INFINITY, f64::max);
    let min_y = points.iter().map(|p| p.position.y).fold(f64::INFINITY, f64::min);
    let max_y = points.iter().map(|p| p.position.y).fold(f64::NEG_INFINITY, f64::max);

    let min_elevation = points.iter().map(|p| p.elevation).fold(f32::MAX, f32::min);
    let max_elevation = points.iter().map(|p| p.elevation).fold(f32::MIN, f32::max);
    let elevation_span = (max_elevation - min_elevation).max(1.0);

    let x_span = (max_x - min_x).max(f64::EPSILON);
    let y_span = (max_y - min_y).max(f64::EPSILON);

    let width = PREVIEW_WIDTH;
    let height = ((width as f64 * y_span / x_span).round() as u32).clamp(1, 4 * PREVIEW_WIDTH);

    let mut buffer = RgbImage::from_pixel(width, height, BACKGROUND);

    for point in points {
        let col = ((point.position.x - min_x) / x_span * (width - 1) as f64).round() as u32;
        let row = ((max_y - point.position.y) / y_span * (height - 1) as f64).round() as u32;

        let t = (point.elevation - min_elevation) / elevation_span;
        buffer.put_pixel(col.min(width - 1), row.min(height - 1), elevation_to_rgb(t));
    }

    encode_png(png_path, &DynamicImage::ImageRgb8(buffer))
        .map_err(|e| anyhow!("Failed to encode {}: {}", png_path.display(), e))
}
