// THEORY:
// The `pipeline` module is the top-level API for the normalization engine. It
// encapsulates the measurement and sizing stack into a single, easy-to-use
// interface: one validated configuration in, one report per logo out.
//
// The per-logo flow is a straight line through the core modules: degenerate
// exclusion, content measurement (bounds, then density when the configuration
// is density-aware), dimension computation, visual alignment, and the
// optional crop. Logos never look at each other; the only shared input is the
// read-only configuration, so the sequential `normalize_all` here and the
// worker-pool version in `parallel_pipeline` produce identical reports.
//
// Per-item failures stay per-item. A logo that cannot be measured is reported
// as `Excluded` in its input position and its siblings are untouched. An
// empty batch is a normal case and yields an empty report list.

use crate::core_modules::alignment::alignment_computer;
use crate::core_modules::bounds_detector::bounds_detector;
use crate::core_modules::cropper::cropper;
use crate::core_modules::density_estimator::{NEUTRAL_DENSITY, density_estimator};
use crate::core_modules::size_normalizer::size_normalizer;
use crate::error::{ConfigError, NormalizeError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// Re-export key data structures for the public API.
pub use crate::core_modules::alignment::{AlignmentMode, VisualOffset};
pub use crate::core_modules::bounds_detector::BoundingBox;
pub use crate::core_modules::density_estimator::Density;
pub use crate::core_modules::pixel::pixel::Channel;
pub use crate::core_modules::raster::RasterImage;
pub use crate::core_modules::size_normalizer::{AspectRatio, NormalizedSize};

const DEFAULT_BASE_SIZE: f64 = 48.0;
const DEFAULT_SCALE_FACTOR: f64 = 0.5;
const DEFAULT_CONTRAST_THRESHOLD: Channel = 10;
const DEFAULT_DENSITY_FACTOR: f64 = 0.5;

/// Configuration for one normalization batch, allowing for tunable behavior.
/// Immutable for the duration of the batch; validated before any pixel work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// The reference size in layout units that the scale factor pivots around.
    pub base_size: f64,
    /// Width/height balance in [0, 1]: 0 gives every logo the base width,
    /// 1 gives every logo the base height, values between blend smoothly.
    pub scale_factor: f64,
    /// Content-versus-background sensitivity for the shared ink predicate.
    pub contrast_threshold: Channel,
    /// Whether ink density is measured and compensated for.
    pub density_aware: bool,
    /// Compensation strength in [0, 1]; 0 disables the effect entirely.
    pub density_factor: f64,
    /// Whether each logo's buffer is cropped to its content box.
    pub crop_to_content: bool,
    /// How logos align across the strip.
    pub align_by: AlignmentMode,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            base_size: DEFAULT_BASE_SIZE,
            scale_factor: DEFAULT_SCALE_FACTOR,
            contrast_threshold: DEFAULT_CONTRAST_THRESHOLD,
            density_aware: true,
            density_factor: DEFAULT_DENSITY_FACTOR,
            crop_to_content: false,
            align_by: AlignmentMode::Bounds,
        }
    }
}

impl NormalizationConfig {
    /// Rejects out-of-range values up front so the core never has to clamp
    /// deep inside the algorithm. The contrast threshold is a `u8`, so its
    /// full range is valid by construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_size > 0.0) || !self.base_size.is_finite() {
            return Err(ConfigError::NonPositiveBaseSize(self.base_size));
        }
        if !(0.0..=1.0).contains(&self.scale_factor) {
            return Err(ConfigError::ScaleFactorOutOfRange(self.scale_factor));
        }
        if !(0.0..=1.0).contains(&self.density_factor) {
            return Err(ConfigError::DensityFactorOutOfRange(self.density_factor));
        }
        Ok(())
    }
}

/// One logo entering the batch: a caller-chosen identifier plus its decoded
/// pixel buffer. Acquiring and decoding the buffer is the caller's concern.
#[derive(Debug, Clone)]
pub struct LogoImage {
    /// Caller-chosen identifier carried through to the report.
    pub id: String,
    /// The decoded RGBA8 buffer.
    pub image: RasterImage,
}

impl LogoImage {
    pub fn new(id: impl Into<String>, image: RasterImage) -> Self {
        Self {
            id: id.into(),
            image,
        }
    }
}

/// The measured content properties of one logo. Derived data; recomputed
/// whenever the source image or threshold changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    /// The tightest box around the logo's ink, or the full-image fallback.
    pub bounds: BoundingBox,
    /// The measured ink density; `None` when the batch is not density-aware.
    pub density: Option<Density>,
}

/// The complete normalized geometry for one logo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLogo {
    /// The identifier of the source logo.
    pub source_id: String,
    /// The intrinsic width of the source image in pixels.
    pub original_width: u32,
    /// The intrinsic height of the source image in pixels.
    pub original_height: u32,
    /// The detected content box in source-pixel coordinates.
    pub content_box: Option<BoundingBox>,
    /// The final display width in layout units.
    pub normalized_width: f64,
    /// The final display height in layout units.
    pub normalized_height: f64,
    /// `normalized_width / normalized_height`.
    pub aspect_ratio: AspectRatio,
    /// The measured ink density; `None` when the batch is not density-aware.
    pub density: Option<Density>,
    /// The visual-center translation; `None` in bounds mode or when the
    /// offset would be invisible.
    pub visual_center_offset: Option<VisualOffset>,
    /// The buffer cropped to the content box, when cropping is enabled.
    #[serde(skip)]
    pub cropped: Option<RasterImage>,
}

/// The per-logo outcome of a batch.
#[derive(Debug)]
pub enum LogoReport {
    /// The logo was analyzed and sized.
    Normalized(NormalizedLogo),
    /// The logo was excluded from geometric computation. Its siblings are
    /// unaffected.
    Excluded {
        source_id: String,
        reason: NormalizeError,
    },
}

impl LogoReport {
    pub fn source_id(&self) -> &str {
        match self {
            LogoReport::Normalized(logo) => &logo.source_id,
            LogoReport::Excluded { source_id, .. } => source_id,
        }
    }

    pub fn as_normalized(&self) -> Option<&NormalizedLogo> {
        match self {
            LogoReport::Normalized(logo) => Some(logo),
            LogoReport::Excluded { .. } => None,
        }
    }
}

/// The main, top-level struct for the normalization engine.
pub struct LogoPipeline {
    config: NormalizationConfig,
}

impl LogoPipeline {
    /// Builds a pipeline around a validated configuration.
    pub fn new(config: NormalizationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &NormalizationConfig {
        &self.config
    }

    /// Measures one logo's content box and, when density-aware, its ink
    /// density. A logo whose scan finds no ink at all gets the neutral
    /// density alongside its full-image fallback box, so an unmeasurable
    /// logo is treated as average rather than maximally sparse.
    pub fn analyze(&self, image: &RasterImage) -> ContentAnalysis {
        let threshold = self.config.contrast_threshold;
        let bounds = bounds_detector::detect(image, threshold);
        let density = self.config.density_aware.then(|| {
            let measured = density_estimator::estimate(image, &bounds, threshold);
            if measured > 0.0 { measured } else { NEUTRAL_DENSITY }
        });
        ContentAnalysis { bounds, density }
    }

    /// Runs the full per-logo flow and reports the outcome.
    pub fn normalize_logo(&self, logo: &LogoImage) -> LogoReport {
        // --- 1. Degenerate Exclusion ---
        if logo.image.is_degenerate() {
            debug!(source_id = %logo.id, "excluding zero-area logo");
            return LogoReport::Excluded {
                source_id: logo.id.clone(),
                reason: NormalizeError::DegenerateImage {
                    source_id: logo.id.clone(),
                    width: logo.image.width(),
                    height: logo.image.height(),
                },
            };
        }

        // --- 2. Content Measurement ---
        let analysis = self.analyze(&logo.image);

        // --- 3. Dimension Computation ---
        // The cropped artwork is what gets displayed when cropping is on, so
        // that is when the content box drives the sizing.
        let (sizing_width, sizing_height) = if self.config.crop_to_content {
            (analysis.bounds.width, analysis.bounds.height)
        } else {
            (logo.image.width(), logo.image.height())
        };
        let size = size_normalizer::normalize(
            sizing_width,
            sizing_height,
            analysis.density,
            &self.config,
        );

        // --- 4. Visual Alignment ---
        let visual_center_offset = alignment_computer::compute_offset(
            &logo.image,
            &analysis.bounds,
            &size,
            self.config.align_by,
            self.config.contrast_threshold,
        );

        // --- 5. Optional Crop ---
        let cropped = self
            .config
            .crop_to_content
            .then(|| cropper::crop(&logo.image, &analysis.bounds));

        debug!(
            source_id = %logo.id,
            width = size.width,
            height = size.height,
            "logo normalized"
        );

        LogoReport::Normalized(NormalizedLogo {
            source_id: logo.id.clone(),
            original_width: logo.image.width(),
            original_height: logo.image.height(),
            content_box: Some(analysis.bounds),
            normalized_width: size.width,
            normalized_height: size.height,
            aspect_ratio: size.aspect_ratio,
            density: analysis.density,
            visual_center_offset,
            cropped,
        })
    }

    /// Normalizes a whole batch sequentially, preserving input order.
    /// An empty input yields an empty report list, not an error.
    pub fn normalize_all(&self, logos: &[LogoImage]) -> Vec<LogoReport> {
        info!(count = logos.len(), "normalizing logo batch");
        logos.iter().map(|logo| self.normalize_logo(logo)).collect()
    }
}
