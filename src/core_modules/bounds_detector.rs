// THEORY:
// The `BoundsDetector` is the engine of the content-measurement layer. Its job
// is to find the tightest axis-aligned box enclosing every pixel that passes
// the shared ink predicate, so that a logo's padding and whitespace stop
// counting toward its perceived size.
//
// Key architectural principles & algorithm steps:
// 1.  **Exhaustive Scan**: Every pixel is visited exactly once. The bound must
//     be exact, so there is no early exit; the scan is O(width * height).
// 2.  **Pure Fold**: The scan is a fold over row accumulators. A
//     `BoundsAccumulator` observes qualifying coordinates and tracks running
//     min/max extents; accumulators from separate rows merge associatively,
//     so the scan order never changes the result.
// 3.  **Named Fallback**: When no pixel qualifies (an all-white or fully
//     transparent image), the detector resolves to `BoundingBox::full_image`
//     rather than an empty or negative box. Downstream sizing then behaves as
//     if the whole canvas were content.
// 4.  **Inclusive Extents**: Both extremal pixels belong to the box, so
//     `width = max_x - min_x + 1` and likewise for height.
// 5.  **Stateless Utility**: Like the rest of the measurement layer, the
//     detector holds no state. One image in, one box out.

use crate::core_modules::pixel::pixel::Channel;
use crate::core_modules::raster::RasterImage;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in source-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// The column of the box's left edge.
    pub x: u32,
    /// The row of the box's top edge.
    pub y: u32,
    /// The box width in pixels. At least 1 whenever content was found.
    pub width: u32,
    /// The box height in pixels. At least 1 whenever content was found.
    pub height: u32,
}

impl BoundingBox {
    /// The fallback box covering the entire image extent.
    pub fn full_image(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// The box area in pixels.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// The exclusive right edge (`x + width`).
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// The exclusive bottom edge (`y + height`).
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

pub mod bounds_detector {
    use super::*; // Make structs from the parent module available.

    /// Running min/max extents over qualifying pixel coordinates.
    /// Empty until the first `observe`; merging two accumulators unions them.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct BoundsAccumulator {
        extent: Option<Extent>,
    }

    #[derive(Debug, Clone, Copy)]
    struct Extent {
        min_x: u32,
        min_y: u32,
        max_x: u32,
        max_y: u32,
    }

    impl BoundsAccumulator {
        pub fn new() -> Self {
            Self::default()
        }

        /// Folds a qualifying coordinate into the running extents.
        pub fn observe(&mut self, x: u32, y: u32) {
            match &mut self.extent {
                Some(extent) => {
                    extent.min_x = extent.min_x.min(x);
                    extent.min_y = extent.min_y.min(y);
                    extent.max_x = extent.max_x.max(x);
                    extent.max_y = extent.max_y.max(y);
                }
                None => {
                    self.extent = Some(Extent {
                        min_x: x,
                        min_y: y,
                        max_x: x,
                        max_y: y,
                    });
                }
            }
        }

        /// Unions another accumulator into this one. Associative, so row
        /// chunks can be scanned independently and combined in any order.
        pub fn merge(&mut self, other: BoundsAccumulator) {
            if let Some(extent) = other.extent {
                self.observe(extent.min_x, extent.min_y);
                self.observe(extent.max_x, extent.max_y);
            }
        }

        /// Resolves the extents into a box, falling back to the full image
        /// extent when nothing was observed.
        pub fn resolve(self, image: &RasterImage) -> BoundingBox {
            match self.extent {
                Some(extent) => BoundingBox {
                    x: extent.min_x,
                    y: extent.min_y,
                    width: extent.max_x - extent.min_x + 1,
                    height: extent.max_y - extent.min_y + 1,
                },
                None => BoundingBox::full_image(image.width(), image.height()),
            }
        }
    }

    /// The main function of the content-measurement layer.
    /// Scans the whole image and returns the tightest box around its ink.
    pub fn detect(image: &RasterImage, contrast_threshold: Channel) -> BoundingBox {
        // --- 1. Row Fold ---
        // Each row produces its own accumulator; rows are merged into the
        // scan-wide result.
        let mut bounds = BoundsAccumulator::new();
        for y in 0..image.height() {
            bounds.merge(scan_row(image, y, contrast_threshold));
        }

        // --- 2. Fallback Resolution ---
        bounds.resolve(image)
    }

    fn scan_row(image: &RasterImage, y: u32, contrast_threshold: Channel) -> BoundsAccumulator {
        let mut row_bounds = BoundsAccumulator::new();
        for x in 0..image.width() {
            if image.pixel(x, y).is_ink(contrast_threshold) {
                row_bounds.observe(x, y);
            }
        }
        row_bounds
    }
}
