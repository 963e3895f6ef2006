//! Example: baseline and compare a page without the rendering service
//!
//! A small in-process renderer paints the "page" so the whole lifecycle can be
//! watched on disk: `baselines/`, `current/` and `diffs/` inside a temp dir.

use image::{ImageFormat, Rgba, RgbaImage};
use std::cell::Cell;
use std::io::Cursor;
use tempfile::tempdir;
use vizreg_vision::{
    resolve, CaptureError, Pipeline, Renderer, ScreenshotTarget, Stores, VisualRegressionConfig,
};

/// Paints a white page with a blue banner that moves down on every capture
struct DriftingBanner {
    offset: Cell<u32>,
}

impl Renderer for DriftingBanner {
    fn capture(&self, target: &ScreenshotTarget) -> Result<Vec<u8>, CaptureError> {
        let size = target.viewport();
        let mut page = RgbaImage::from_pixel(size.width, size.height, Rgba([255, 255, 255, 255]));

        let top = self.offset.get();
        for y in top..(top + 40).min(size.height) {
            for x in 0..size.width {
                page.put_pixel(x, y, Rgba([51, 102, 255, 255]));
            }
        }
        self.offset.set(top + 2);

        let mut png = Vec::new();
        page.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .expect("in-memory PNG encoding");
        Ok(png)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;
    println!("Output directory: {}", temp_dir.path().display());

    let config = resolve(VisualRegressionConfig {
        targets: vec![
            ScreenshotTarget::new("landing", "https://example.com").with_viewport(640, 360),
        ],
        threshold: Some(0.1),
        max_diff_percentage: Some(0.5),
    })?;

    let renderer = DriftingBanner {
        offset: Cell::new(0),
    };
    let pipeline = Pipeline::new(config, renderer, Stores::in_dir(temp_dir.path()));

    let report = pipeline.baseline(false)?;
    println!("Captured baselines: {:?}", report.captured);

    let summary = pipeline.compare()?;
    for result in &summary.results {
        println!(
            "  [{}] {} - {:.3}% diff ({} pixels)",
            if result.passed { "PASS" } else { "FAIL" },
            result.target_name,
            result.diff_percentage,
            result.mismatched_pixels
        );
        println!("    diff: {}", result.diff_path.display());
    }

    println!("\nPress Enter to exit (the temp directory is removed afterwards)...");
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    Ok(())
}
