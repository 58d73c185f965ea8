// THEORY:
// The `RasterImage` module wraps a decoded logo as a flat, row-major RGBA8
// buffer and exposes random-access pixel reads. It is the only representation
// of image data the analysis layers ever see; decoding file formats into this
// shape is a boundary concern handled by `utils::image_helper`.
//
// Key architectural principles:
// 1.  **Immutability**: Once constructed, a `RasterImage` is never mutated.
//     Every analysis over it is a pure read, which is what makes the per-logo
//     batch work safe to run concurrently with no locking.
// 2.  **Validated Construction**: The buffer length is checked against
//     `width * height * 4` up front. After construction, every in-bounds
//     `pixel(x, y)` read is guaranteed to succeed, so the scan loops carry no
//     per-pixel error paths.
// 3.  **Flat Addressing**: A pixel lives at byte offset `(y * width + x) * 4`,
//     the same addressing every scan and the cropper use.

use crate::core_modules::pixel::pixel::{CHANNELS, Pixel};
use crate::error::NormalizeError;

/// An immutable, decoded RGBA8 image buffer with known dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// The image width in pixels.
    width: u32,
    /// The image height in pixels.
    height: u32,
    /// The flattened row-major RGBA8 pixel data, `width * height * 4` bytes.
    data: Vec<u8>,
}

impl RasterImage {
    /// Wraps a raw RGBA8 buffer, validating its length against the dimensions.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self, NormalizeError> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(NormalizeError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total pixel count. Zero for a degenerate image.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// True when either dimension is zero and no geometry can be computed.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Random-access read of the pixel at `(x, y)`. Callers stay within
    /// `width`/`height`; construction already guaranteed the backing bytes.
    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        debug_assert!(x < self.width && y < self.height);
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Pixel::from(&self.data[offset..offset + CHANNELS])
    }

    /// The raw RGBA bytes of row `y`.
    pub fn row_bytes(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * CHANNELS;
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// The full flattened RGBA buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl From<image::RgbaImage> for RasterImage {
    fn from(decoded: image::RgbaImage) -> Self {
        let width = decoded.width();
        let height = decoded.height();
        Self {
            width,
            height,
            data: decoded.into_raw(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(width: u32, height: u32) -> RasterImage {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let on = (x + y) % 2 == 0;
                let value = if on { 0u8 } else { 255u8 };
                data.extend_from_slice(&[value, value, value, 255]);
            }
        }
        RasterImage::from_rgba8(width, height, data).unwrap()
    }

    #[test]
    fn rejects_mismatched_buffer() {
        let result = RasterImage::from_rgba8(2, 2, vec![0u8; 15]);
        assert!(matches!(
            result,
            Err(NormalizeError::BufferSizeMismatch {
                expected: 16,
                actual: 15
            })
        ));
    }

    #[test]
    fn accepts_zero_area_image() {
        let image = RasterImage::from_rgba8(0, 0, Vec::new()).unwrap();
        assert!(image.is_degenerate());
        assert_eq!(image.pixel_count(), 0);
    }

    #[test]
    fn pixel_addressing_is_row_major() {
        let board = checkerboard(3, 2);
        assert_eq!(board.pixel(0, 0).red, 0);
        assert_eq!(board.pixel(1, 0).red, 255);
        assert_eq!(board.pixel(0, 1).red, 255);
        assert_eq!(board.pixel(2, 1).red, 0);
    }

    #[test]
    fn row_bytes_covers_one_stride() {
        let board = checkerboard(3, 2);
        assert_eq!(board.row_bytes(0).len(), 12);
        assert_eq!(board.row_bytes(1)[0], 255);
    }
}
