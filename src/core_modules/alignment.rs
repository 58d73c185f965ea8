// THEORY:
// The `Alignment` module decides where a normalized logo sits relative to its
// neighbors. Geometric centering is the default, but a logo whose ink leans
// to one side of its bounding box (a wordmark with a heavy glyph, a symbol
// with a long descender) reads as off-center even when its box is centered.
// Visual-center mode computes the opacity-weighted centroid of the ink inside
// the content box and produces the translation that re-centers the logo on
// its ink rather than on its geometry.
//
// The deviation is measured in source pixels, scaled into normalized layout
// units per axis, and negated so that applying the offset moves the ink
// center onto the geometric center. Sub-pixel offsets are suppressed; they
// would only add layout noise.

use crate::core_modules::bounds_detector::BoundingBox;
use crate::core_modules::pixel::pixel::Channel;
use crate::core_modules::raster::RasterImage;
use crate::core_modules::size_normalizer::NormalizedSize;
use serde::{Deserialize, Serialize};

/// How logos align across the strip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignmentMode {
    /// Center on the bounding box. Never produces an offset.
    #[default]
    Bounds,
    /// Center on the ink-weighted centroid of the content.
    VisualCenter,
}

/// A translation in normalized layout units that re-centers a logo on its ink.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualOffset {
    pub dx: f64,
    pub dy: f64,
}

/// Offsets smaller than this (per axis, in normalized units) are noise.
const OFFSET_VISIBILITY_THRESHOLD: f64 = 0.5;

pub mod alignment_computer {
    use super::*;

    /// Computes the visual-center translation for one logo, or `None` when
    /// the mode is `Bounds`, the content cannot be measured, or the offset
    /// would be invisible.
    pub fn compute_offset(
        image: &RasterImage,
        content_box: &BoundingBox,
        normalized: &NormalizedSize,
        mode: AlignmentMode,
        contrast_threshold: Channel,
    ) -> Option<VisualOffset> {
        if mode == AlignmentMode::Bounds {
            return None;
        }
        if content_box.width == 0 || content_box.height == 0 {
            return None;
        }

        let (centroid_x, centroid_y) = ink_centroid(image, content_box, contrast_threshold)?;

        // Deviation of the ink centroid from the box's geometric center,
        // in source pixels.
        let center_x = content_box.x as f64 + content_box.width as f64 / 2.0;
        let center_y = content_box.y as f64 + content_box.height as f64 / 2.0;
        let deviation_x = centroid_x - center_x;
        let deviation_y = centroid_y - center_y;

        // Scale into normalized units per axis, then negate: the translation
        // pushes the strip the opposite way so ink lands on center.
        let dx = suppress_subpixel(
            -deviation_x * (normalized.width / content_box.width as f64),
        );
        let dy = suppress_subpixel(
            -deviation_y * (normalized.height / content_box.height as f64),
        );

        if dx == 0.0 && dy == 0.0 {
            None
        } else {
            Some(VisualOffset { dx, dy })
        }
    }

    /// The opacity-weighted centroid of ink pixels inside `region`, using
    /// pixel centers (`x + 0.5`). `None` when the region holds no ink.
    fn ink_centroid(
        image: &RasterImage,
        region: &BoundingBox,
        contrast_threshold: Channel,
    ) -> Option<(f64, f64)> {
        let mut weight_sum = 0.0;
        let mut weighted_x = 0.0;
        let mut weighted_y = 0.0;

        let x_end = region.right().min(image.width());
        let y_end = region.bottom().min(image.height());
        for y in region.y..y_end {
            for x in region.x..x_end {
                let pixel = image.pixel(x, y);
                if pixel.is_ink(contrast_threshold) {
                    let weight = pixel.opacity();
                    weight_sum += weight;
                    weighted_x += (x as f64 + 0.5) * weight;
                    weighted_y += (y as f64 + 0.5) * weight;
                }
            }
        }

        if weight_sum == 0.0 {
            return None;
        }
        Some((weighted_x / weight_sum, weighted_y / weight_sum))
    }

    fn suppress_subpixel(value: f64) -> f64 {
        if value.abs() < OFFSET_VISIBILITY_THRESHOLD {
            0.0
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::alignment_computer::compute_offset;
    use super::*;

    fn image_with_ink(width: u32, height: u32, ink: &[(u32, u32, u8)]) -> RasterImage {
        let mut data = vec![0u8; (width * height * 4) as usize];
        for &(x, y, alpha) in ink {
            let offset = ((y * width + x) * 4) as usize;
            data[offset..offset + 4].copy_from_slice(&[0, 0, 0, alpha]);
        }
        RasterImage::from_rgba8(width, height, data).unwrap()
    }

    fn normalized(width: f64, height: f64) -> NormalizedSize {
        NormalizedSize {
            width,
            height,
            aspect_ratio: width / height,
        }
    }

    #[test]
    fn bounds_mode_never_offsets() {
        let ink: Vec<(u32, u32, u8)> = (0..5).map(|y| (0, y, 255)).collect();
        let image = image_with_ink(10, 5, &ink);
        let offset = compute_offset(
            &image,
            &BoundingBox::full_image(10, 5),
            &normalized(48.0, 24.0),
            AlignmentMode::Bounds,
            10,
        );
        assert_eq!(offset, None);
    }

    #[test]
    fn symmetric_ink_needs_no_offset() {
        let ink: Vec<(u32, u32, u8)> = (0..4)
            .flat_map(|y| (0..4).map(move |x| (x, y, 255)))
            .collect();
        let image = image_with_ink(4, 4, &ink);
        let offset = compute_offset(
            &image,
            &BoundingBox::full_image(4, 4),
            &normalized(48.0, 48.0),
            AlignmentMode::VisualCenter,
            10,
        );
        assert_eq!(offset, None);
    }

    #[test]
    fn left_heavy_ink_pushes_the_logo_right() {
        // A full opaque column on the left, a single pixel on the right edge.
        let mut ink: Vec<(u32, u32, u8)> = (0..10).map(|y| (0, y, 255)).collect();
        ink.push((9, 5, 255));
        let image = image_with_ink(10, 10, &ink);
        let offset = compute_offset(
            &image,
            &BoundingBox::full_image(10, 10),
            &normalized(48.0, 48.0),
            AlignmentMode::VisualCenter,
            10,
        )
        .expect("deviation is far beyond the visibility threshold");
        assert!(offset.dx > 0.0);
    }

    #[test]
    fn top_heavy_ink_pushes_the_logo_down() {
        let mut ink: Vec<(u32, u32, u8)> = (0..10).map(|x| (x, 0, 255)).collect();
        ink.push((5, 9, 255));
        let image = image_with_ink(10, 10, &ink);
        let offset = compute_offset(
            &image,
            &BoundingBox::full_image(10, 10),
            &normalized(48.0, 48.0),
            AlignmentMode::VisualCenter,
            10,
        )
        .expect("deviation is far beyond the visibility threshold");
        assert!(offset.dy > 0.0);
    }

    #[test]
    fn opacity_weighting_shifts_the_centroid() {
        // Equal coverage left and right, but the left column is far more
        // opaque, so the centroid leans left and the offset pushes right.
        let ink = [(0, 0, 255), (0, 1, 255), (3, 0, 40), (3, 1, 40)];
        let image = image_with_ink(4, 2, &ink);
        let offset = compute_offset(
            &image,
            &BoundingBox::full_image(4, 2),
            &normalized(96.0, 48.0),
            AlignmentMode::VisualCenter,
            10,
        )
        .expect("opacity imbalance is visible at this scale");
        assert!(offset.dx > 0.0);
    }

    #[test]
    fn subpixel_offsets_are_suppressed() {
        // Nearly symmetric opacity; the residual deviation scales to well
        // under half a layout pixel.
        let ink = [(0, 0, 255), (2, 0, 250)];
        let image = image_with_ink(3, 1, &ink);
        let offset = compute_offset(
            &image,
            &BoundingBox::full_image(3, 1),
            &normalized(48.0, 16.0),
            AlignmentMode::VisualCenter,
            10,
        );
        assert_eq!(offset, None);
    }

    #[test]
    fn inkless_box_yields_no_offset() {
        let image = image_with_ink(4, 4, &[]);
        let offset = compute_offset(
            &image,
            &BoundingBox::full_image(4, 4),
            &normalized(48.0, 48.0),
            AlignmentMode::VisualCenter,
            10,
        );
        assert_eq!(offset, None);
    }
}
