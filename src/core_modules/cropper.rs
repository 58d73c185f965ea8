// THEORY:
// The `Cropper` re-encodes a logo's buffer restricted to its content box, so
// downstream rendering can work with the trimmed artwork instead of the
// padded canvas. It is a pure sub-buffer copy: no resampling, no filtering,
// just row-wise extraction at the same addressing the scans use. The region
// is clamped to the image bounds first, so a fallback or oversized box can
// never read past the buffer.

use crate::core_modules::bounds_detector::BoundingBox;
use crate::core_modules::pixel::pixel::CHANNELS;
use crate::core_modules::raster::RasterImage;

pub mod cropper {
    use super::*;

    /// Copies the pixels of `region` out of `image` into a new buffer.
    /// The region is clamped to the image bounds; a region lying entirely
    /// outside the image produces a zero-area result.
    pub fn crop(image: &RasterImage, region: &BoundingBox) -> RasterImage {
        let x = region.x.min(image.width());
        let y = region.y.min(image.height());
        let width = region.width.min(image.width() - x);
        let height = region.height.min(image.height() - y);

        let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for row in y..y + height {
            let source = image.row_bytes(row);
            let start = x as usize * CHANNELS;
            let end = start + width as usize * CHANNELS;
            data.extend_from_slice(&source[start..end]);
        }

        RasterImage::from_rgba8(width, height, data)
            .expect("crop buffer length follows from the clamped dimensions")
    }
}
