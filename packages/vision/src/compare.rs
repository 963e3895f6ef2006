//! Baseline vs. current comparison

use crate::config::ResolvedConfig;
use crate::differ::{self, DiffOptions};
use crate::reporter::{ReportEvent, Reporter};
use crate::types::{ComparisonResult, Dimensions};
use crate::{Result, Stores};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::PathBuf;
use thiserror::Error;

/// Problems that stop a comparison pass before any verdict
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Baseline not found: {}. Run \"vizreg baseline\" first.", .path.display())]
    BaselineMissing { target: String, path: PathBuf },

    #[error("Current screenshot not found: {}. Capture failed for \"{target}\".", .path.display())]
    CurrentMissing { target: String, path: PathBuf },

    #[error(
        "Dimension mismatch for \"{target}\": baseline is {baseline}, current is {current}. \
         Run \"vizreg baseline --update\" to recapture baselines."
    )]
    DimensionMismatch {
        target: String,
        baseline: Dimensions,
        current: Dimensions,
    },

    #[error("Cannot decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot encode diff for \"{target}\": {source}")]
    Encode {
        target: String,
        #[source]
        source: image::ImageError,
    },
}

/// Mismatch count and diff image for a pair of PNGs
#[derive(Debug, Clone)]
pub struct ImageComparison {
    pub dimensions: Dimensions,
    pub mismatched_pixels: u64,
    pub diff: RgbaImage,
}

impl ImageComparison {
    pub fn total_pixels(&self) -> u64 {
        self.dimensions.area()
    }

    /// Share of mismatched pixels, in percent
    pub fn diff_percentage(&self) -> f64 {
        diff_percentage(self.mismatched_pixels, self.total_pixels())
    }
}

/// `mismatched / total * 100`, or 0 for an empty image
pub fn diff_percentage(mismatched: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    mismatched as f64 / total as f64 * 100.0
}

/// Decode a PNG into RGBA pixels
pub fn decode_png(
    bytes: &[u8],
    path: &std::path::Path,
) -> std::result::Result<RgbaImage, CompareError> {
    image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map(|img| img.to_rgba8())
        .map_err(|source| CompareError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Encode RGBA pixels as PNG
pub fn encode_png(image: &RgbaImage) -> std::result::Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Diff two decoded images after checking their geometry
pub fn compare_images(
    target: &str,
    baseline: &RgbaImage,
    current: &RgbaImage,
    threshold: f64,
) -> std::result::Result<ImageComparison, CompareError> {
    let pixels = differ::diff(baseline, current, &DiffOptions::with_threshold(threshold))
        .map_err(|mismatch| CompareError::DimensionMismatch {
            target: target.to_string(),
            baseline: mismatch.left,
            current: mismatch.right,
        })?;

    Ok(ImageComparison {
        dimensions: differ::dimensions(baseline),
        mismatched_pixels: pixels.mismatched,
        diff: pixels.image,
    })
}

/// Compare every target's current capture against its baseline
///
/// Setup problems (missing files, unequal sizes) abort the pass. A target
/// over the allowed difference is still a normal result.
pub fn run_comparisons(
    config: &ResolvedConfig,
    stores: &Stores,
    reporter: &dyn Reporter,
) -> Result<Vec<ComparisonResult>> {
    stores.diffs.prepare()?;

    let mut results = Vec::with_capacity(config.targets.len());

    for target in &config.targets {
        let key = target.filename();
        let baseline_path = stores.baselines.locate(&key);
        let current_path = stores.current.locate(&key);
        let diff_path = stores.diffs.locate(&key);

        if !stores.baselines.exists(&key) {
            return Err(CompareError::BaselineMissing {
                target: target.name.clone(),
                path: baseline_path,
            }
            .into());
        }

        if !stores.current.exists(&key) {
            return Err(CompareError::CurrentMissing {
                target: target.name.clone(),
                path: current_path,
            }
            .into());
        }

        let baseline = decode_png(&stores.baselines.read(&key)?, &baseline_path)?;
        let current = decode_png(&stores.current.read(&key)?, &current_path)?;

        let comparison = compare_images(&target.name, &baseline, &current, config.threshold)?;

        let diff_percentage = comparison.diff_percentage();
        let passed = diff_percentage <= config.max_diff_percentage;

        let png = encode_png(&comparison.diff).map_err(|source| CompareError::Encode {
            target: target.name.clone(),
            source,
        })?;
        stores.diffs.write(&key, &png)?;

        tracing::debug!(
            "{}: {} of {} pixels differ",
            target.name,
            comparison.mismatched_pixels,
            comparison.total_pixels()
        );

        let result = ComparisonResult {
            target_name: target.name.clone(),
            baseline_path,
            current_path,
            diff_path,
            total_pixels: comparison.total_pixels(),
            mismatched_pixels: comparison.mismatched_pixels,
            diff_percentage,
            passed,
        };

        reporter.on_event(&ReportEvent::Compared {
            result: result.clone(),
        });
        results.push(result);
    }

    Ok(results)
}
