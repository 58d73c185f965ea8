// THEORY:
// The `DensityEstimator` measures how much "ink" a region actually carries.
// Two logos with identical bounding boxes do not look equally sized when one
// is a solid mark and the other a thin outline; density is the scalar the
// size normalizer uses to compensate for that.
//
// Density is coverage times opacity: the fraction of the region's pixels that
// pass the shared ink predicate, weighted by the mean opacity of those pixels.
// A small fully-opaque mark and a large sparse outline therefore register
// differently even inside equal boxes. A zero-area region returns the named
// `NEUTRAL_DENSITY` so that an unmeasurable logo is treated as average, which
// biases the size computation toward neither extreme.

use crate::core_modules::bounds_detector::BoundingBox;
use crate::core_modules::pixel::pixel::Channel;
use crate::core_modules::raster::RasterImage;

pub type Density = f64;

/// The density reported when a region cannot be measured. Treated as
/// "average ink", not "empty".
pub const NEUTRAL_DENSITY: Density = 0.5;

pub mod density_estimator {
    use super::*;

    /// Measures the ink density of `region` within `image`, in [0, 1].
    ///
    /// Parts of the region falling outside the image contribute no ink but
    /// stay in the coverage denominator.
    pub fn estimate(
        image: &RasterImage,
        region: &BoundingBox,
        contrast_threshold: Channel,
    ) -> Density {
        let region_area = region.area();
        if region_area == 0 {
            return NEUTRAL_DENSITY;
        }

        let mut filled: u64 = 0;
        let mut opacity_sum = 0.0;

        let x_end = region.right().min(image.width());
        let y_end = region.bottom().min(image.height());
        for y in region.y..y_end {
            for x in region.x..x_end {
                let pixel = image.pixel(x, y);
                if pixel.is_ink(contrast_threshold) {
                    filled += 1;
                    opacity_sum += pixel.opacity();
                }
            }
        }

        let coverage_ratio = filled as f64 / region_area as f64;
        let average_opacity = if filled > 0 {
            opacity_sum / filled as f64
        } else {
            0.0
        };

        coverage_ratio * average_opacity
    }
}

#[cfg(test)]
mod tests {
    use super::density_estimator::estimate;
    use super::*;

    fn image_with_ink(width: u32, height: u32, ink: &[(u32, u32, u8)]) -> RasterImage {
        let mut data = vec![0u8; (width * height * 4) as usize];
        for &(x, y, alpha) in ink {
            let offset = ((y * width + x) * 4) as usize;
            data[offset..offset + 4].copy_from_slice(&[0, 0, 0, alpha]);
        }
        RasterImage::from_rgba8(width, height, data).unwrap()
    }

    #[test]
    fn solid_opaque_region_is_fully_dense() {
        let ink: Vec<(u32, u32, u8)> = (0..4)
            .flat_map(|y| (0..4).map(move |x| (x, y, 255)))
            .collect();
        let image = image_with_ink(4, 4, &ink);
        let density = estimate(&image, &BoundingBox::full_image(4, 4), 10);
        assert_eq!(density, 1.0);
    }

    #[test]
    fn empty_region_has_zero_density() {
        let image = image_with_ink(4, 4, &[]);
        let density = estimate(&image, &BoundingBox::full_image(4, 4), 10);
        assert_eq!(density, 0.0);
    }

    #[test]
    fn density_is_monotonic_in_coverage() {
        let sparse = image_with_ink(4, 4, &[(0, 0, 255), (1, 0, 255)]);
        let dense = image_with_ink(4, 4, &[(0, 0, 255), (1, 0, 255), (2, 0, 255), (3, 0, 255)]);
        let region = BoundingBox::full_image(4, 4);
        let sparse_density = estimate(&sparse, &region, 10);
        let dense_density = estimate(&dense, &region, 10);
        assert!(dense_density > sparse_density);
        assert!((dense_density - 2.0 * sparse_density).abs() < 1e-12);
    }

    #[test]
    fn opacity_weights_the_coverage() {
        let solid = image_with_ink(2, 1, &[(0, 0, 255), (1, 0, 255)]);
        let faded = image_with_ink(2, 1, &[(0, 0, 128), (1, 0, 128)]);
        let region = BoundingBox::full_image(2, 1);
        assert_eq!(estimate(&solid, &region, 10), 1.0);
        let faded_density = estimate(&faded, &region, 10);
        assert!((faded_density - 128.0 / 255.0).abs() < 1e-12);
    }

    #[test]
    fn zero_area_region_is_neutral() {
        let image = image_with_ink(4, 4, &[(0, 0, 255)]);
        let region = BoundingBox {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        };
        assert_eq!(estimate(&image, &region, 10), NEUTRAL_DENSITY);
    }

    #[test]
    fn density_stays_within_unit_interval() {
        let image = image_with_ink(3, 3, &[(0, 0, 255), (1, 1, 40), (2, 2, 200)]);
        let density = estimate(&image, &BoundingBox::full_image(3, 3), 10);
        assert!((0.0..=1.0).contains(&density));
    }

    #[test]
    fn out_of_image_region_parts_stay_in_the_denominator() {
        let image = image_with_ink(2, 2, &[(0, 0, 255), (1, 0, 255), (0, 1, 255), (1, 1, 255)]);
        let oversized = BoundingBox {
            x: 0,
            y: 0,
            width: 4,
            height: 2,
        };
        let density = estimate(&image, &oversized, 10);
        assert!((density - 0.5).abs() < 1e-12);
    }
}
