// THEORY:
// The `SizeNormalizer` is the algorithmic heart of the engine. Given one
// logo's sizing dimensions and ink density plus the batch-wide configuration,
// it computes the final display width and height. Each logo is computed
// independently; logos relate to each other only through the shared
// configuration, which is what makes the batch embarrassingly parallel.
//
// Key architectural principles & algorithm steps:
// 1.  **Scale-Factor Interpolation**: The scale factor blends between "every
//     logo gets the base width" (factor 0) and "every logo gets the base
//     height" (factor 1). The blend is exponential on the aspect ratio:
//         target_w = base_size * aspect^factor
//         target_h = base_size * aspect^(factor - 1)
//     At factor 0 the aspect exponent on width vanishes, so widths are
//     uniform; at factor 1 the exponent on height vanishes, so heights are
//     uniform. Because the two exponents always differ by exactly 1, the
//     ratio target_w / target_h equals the aspect ratio at every factor, so
//     no logo is ever distorted.
// 2.  **Density Compensation**: When enabled, both dimensions are scaled by
//     `1 + density_factor * (0.5 - density)`, clamped to a sane positive
//     range. Sparse-ink logos grow, solid logos shrink, compensating for the
//     perceptual effect that equal boxes with unequal ink coverage do not
//     look equally sized. A density factor of 0 disables the effect.
// 3.  **Defined Output Everywhere**: Inputs and outputs are floored at a tiny
//     positive epsilon, so even a degenerate request produces finite,
//     positive dimensions rather than a NaN or a zero-size box.

use crate::core_modules::density_estimator::{Density, NEUTRAL_DENSITY};
use crate::pipeline::NormalizationConfig;
use serde::{Deserialize, Serialize};

pub type AspectRatio = f64;

const DENSITY_MULTIPLIER_FLOOR: f64 = 0.5;
const DENSITY_MULTIPLIER_CEIL: f64 = 2.0;
const MIN_DIMENSION: f64 = 1e-6;

/// The computed display geometry for a single logo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSize {
    /// The final display width in layout units.
    pub width: f64,
    /// The final display height in layout units.
    pub height: f64,
    /// `width / height`, recorded for downstream consumers.
    pub aspect_ratio: AspectRatio,
}

pub mod size_normalizer {
    use super::*;

    /// Computes a logo's display size from its sizing dimensions, its
    /// measured ink density (neutral when unmeasured), and the shared
    /// configuration.
    pub fn normalize(
        sizing_width: u32,
        sizing_height: u32,
        density: Option<Density>,
        config: &NormalizationConfig,
    ) -> NormalizedSize {
        // --- 1. Scale-Factor Interpolation ---
        let w = (sizing_width as f64).max(MIN_DIMENSION);
        let h = (sizing_height as f64).max(MIN_DIMENSION);
        let aspect = w / h;

        let mut target_w = config.base_size * aspect.powf(config.scale_factor);
        let mut target_h = config.base_size * aspect.powf(config.scale_factor - 1.0);

        // --- 2. Density Compensation ---
        if config.density_aware {
            let multiplier = density_multiplier(
                density.unwrap_or(NEUTRAL_DENSITY),
                config.density_factor,
            );
            target_w *= multiplier;
            target_h *= multiplier;
        }

        // --- 3. Output Assembly ---
        let width = target_w.max(MIN_DIMENSION);
        let height = target_h.max(MIN_DIMENSION);
        NormalizedSize {
            width,
            height,
            aspect_ratio: width / height,
        }
    }

    /// The density compensation multiplier: below-average ink enlarges,
    /// above-average ink shrinks, clamped to a sane positive range.
    pub fn density_multiplier(density: Density, density_factor: f64) -> f64 {
        (1.0 + density_factor * (NEUTRAL_DENSITY - density))
            .clamp(DENSITY_MULTIPLIER_FLOOR, DENSITY_MULTIPLIER_CEIL)
    }
}
