// This file is an example of how to use the `logo_vision` library.
// The main library entry point is `src/lib.rs`.

use logo_vision::parallel_pipeline::BatchNormalizer;
use logo_vision::pipeline::{LogoImage, LogoReport, NormalizationConfig, RasterImage};

/// Builds a synthetic opaque-black logo buffer for the demo.
fn solid_logo(width: u32, height: u32) -> RasterImage {
    let data: Vec<u8> = [0u8, 0, 0, 255]
        .iter()
        .copied()
        .cycle()
        .take((width * height * 4) as usize)
        .collect();
    RasterImage::from_rgba8(width, height, data).expect("demo buffer matches its dimensions")
}

#[tokio::main]
async fn main() {
    println!("Logo Vision Engine - Example Runner");

    let normalizer = BatchNormalizer::new(NormalizationConfig::default())
        .expect("default configuration is valid");

    let logos = vec![
        LogoImage::new("wide-wordmark", solid_logo(300, 100)),
        LogoImage::new("square-emblem", solid_logo(120, 120)),
        LogoImage::new("tall-monogram", solid_logo(60, 180)),
    ];

    match normalizer.normalize_all(logos).await {
        Ok(reports) => {
            for report in reports {
                match report {
                    LogoReport::Normalized(logo) => println!(
                        "{:>14}: {:>3}x{:<3} -> {:.1} x {:.1} (aspect {:.2})",
                        logo.source_id,
                        logo.original_width,
                        logo.original_height,
                        logo.normalized_width,
                        logo.normalized_height,
                        logo.aspect_ratio,
                    ),
                    LogoReport::Excluded { source_id, reason } => {
                        println!("{source_id:>14}: excluded ({reason})")
                    }
                }
            }
        }
        Err(error) => eprintln!("batch failed: {error}"),
    }
}
