// THEORY:
// Error taxonomy for the normalization engine. The pure analysis and sizing
// layers never fail: every computation has a defined fallback (full-image
// bounds, neutral density, epsilon-floored dimensions). Failures therefore
// split into three families: configuration rejected before any pixel work,
// per-logo conditions that exclude one item without touching its siblings,
// and batch-level scheduler conditions.

use thiserror::Error;

/// Configuration rejected at construction, before the batch starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("base_size must be positive, got {0}")]
    NonPositiveBaseSize(f64),
    #[error("scale_factor must be within [0, 1], got {0}")]
    ScaleFactorOutOfRange(f64),
    #[error("density_factor must be within [0, 1], got {0}")]
    DensityFactorOutOfRange(f64),
}

/// A per-logo failure. Never aborts sibling analyses.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The acquisition boundary could not produce a decoded image.
    #[error("failed to acquire image: {0}")]
    Acquisition(#[from] image::ImageError),
    /// The image has no area, so no geometry can be computed for it.
    #[error("image \"{source_id}\" has zero area ({width}x{height})")]
    DegenerateImage {
        source_id: String,
        width: u32,
        height: u32,
    },
    /// A raw buffer did not match its declared dimensions.
    #[error("RGBA buffer holds {actual} bytes but the dimensions require {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },
}

/// A batch-level failure from the parallel scheduler.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The batch was cancelled before every logo completed.
    #[error("batch was cancelled")]
    Cancelled,
    /// A worker stopped receiving tasks or replying to them.
    #[error("worker pool unavailable: {0}")]
    WorkerUnavailable(String),
}
