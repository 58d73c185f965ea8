// Boundary adapters between encoded image formats and the engine's
// `RasterImage` buffers, built on the `image` crate. Decoding always lands in
// RGBA8, whatever the source format carried.

use crate::core_modules::raster::RasterImage;
use crate::error::NormalizeError;
use image::ImageEncoder;

pub mod image_helper {
    use super::*;

    /// Decodes encoded bytes (PNG, JPEG, ...) into an RGBA8 `RasterImage`.
    pub fn decode(bytes: &[u8]) -> Result<RasterImage, NormalizeError> {
        let decoded = image::load_from_memory(bytes)?;
        Ok(RasterImage::from(decoded.to_rgba8()))
    }

    /// Loads and decodes an image file.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<RasterImage, NormalizeError> {
        let decoded = image::open(path)?;
        Ok(RasterImage::from(decoded.to_rgba8()))
    }

    /// Encodes a `RasterImage` as PNG bytes.
    pub fn encode_png(image: &RasterImage) -> Result<Vec<u8>, NormalizeError> {
        let mut bytes = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut bytes);
        encoder.write_image(
            image.as_bytes(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(bytes)
    }

    /// Writes a `RasterImage` to a PNG file.
    pub fn save(
        path: impl AsRef<std::path::Path>,
        image: &RasterImage,
    ) -> Result<(), NormalizeError> {
        let output = std::fs::File::create(path).map_err(image::ImageError::IoError)?;
        let encoder = image::codecs::png::PngEncoder::new(output);
        encoder.write_image(
            image.as_bytes(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(())
    }
}
