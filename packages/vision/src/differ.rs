//! Per-pixel image differ
//!
//! Colour distance is measured in YIQ space against a squared threshold, with
//! anti-aliased edges detected and left out of the mismatch count. Output
//! pixels are red for mismatches, yellow for anti-aliasing and a faded
//! grayscale of the baseline everywhere else.

use crate::types::Dimensions;
use image::{Rgba, RgbaImage};
use thiserror::Error;

/// Largest possible YIQ delta between two colours
const MAX_YIQ_DELTA: f64 = 35215.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffOptions {
    /// Matching threshold (0-1); smaller is more sensitive
    pub threshold: f64,

    /// Count anti-aliased pixels as mismatches
    pub include_anti_aliasing: bool,

    /// Opacity of unchanged pixels in the diff image
    pub alpha: f64,

    pub diff_color: Rgba<u8>,
    pub aa_color: Rgba<u8>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            include_anti_aliasing: false,
            alpha: 0.1,
            diff_color: Rgba([255, 0, 0, 255]),
            aa_color: Rgba([255, 255, 0, 255]),
        }
    }
}

impl DiffOptions {
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Default::default()
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot diff {left} image against {right} image")]
pub struct SizeMismatch {
    pub left: Dimensions,
    pub right: Dimensions,
}

/// Mismatch count plus visual diff
#[derive(Debug, Clone)]
pub struct PixelDiff {
    pub mismatched: u64,
    pub image: RgbaImage,
}

pub fn dimensions(image: &RgbaImage) -> Dimensions {
    Dimensions::new(image.width(), image.height())
}

/// Compare two equally sized images pixel by pixel
pub fn diff(
    baseline: &RgbaImage,
    current: &RgbaImage,
    options: &DiffOptions,
) -> Result<PixelDiff, SizeMismatch> {
    let (left, right) = (dimensions(baseline), dimensions(current));
    if left != right {
        return Err(SizeMismatch { left, right });
    }

    let (width, height) = (baseline.width(), baseline.height());
    let mut output = RgbaImage::new(width, height);
    let max_delta = MAX_YIQ_DELTA * options.threshold * options.threshold;
    let mut mismatched = 0;

    for y in 0..height {
        for x in 0..width {
            let a = baseline.get_pixel(x, y);
            let b = current.get_pixel(x, y);
            let delta = color_delta(a, b, false);

            if delta.abs() > max_delta {
                let anti_aliased = !options.include_anti_aliasing
                    && (is_anti_aliased(baseline, current, x, y)
                        || is_anti_aliased(current, baseline, x, y));

                if anti_aliased {
                    output.put_pixel(x, y, options.aa_color);
                } else {
                    output.put_pixel(x, y, options.diff_color);
                    mismatched += 1;
                }
            } else {
                output.put_pixel(x, y, faded_gray(a, options.alpha));
            }
        }
    }

    Ok(PixelDiff {
        mismatched,
        image: output,
    })
}

/// Signed YIQ distance; negative when `a` is brighter than `b`
fn color_delta(a: &Rgba<u8>, b: &Rgba<u8>, luma_only: bool) -> f64 {
    if a == b {
        return 0.0;
    }

    let (r1, g1, b1) = blend_on_white(a);
    let (r2, g2, b2) = blend_on_white(b);

    let y1 = rgb_to_y(r1, g1, b1);
    let y2 = rgb_to_y(r2, g2, b2);
    let y = y1 - y2;

    if luma_only {
        return y;
    }

    let i = rgb_to_i(r1, g1, b1) - rgb_to_i(r2, g2, b2);
    let q = rgb_to_q(r1, g1, b1) - rgb_to_q(r2, g2, b2);
    let delta = 0.5053 * y * y + 0.299 * i * i + 0.1957 * q * q;

    if y1 > y2 {
        -delta
    } else {
        delta
    }
}

fn blend_on_white(px: &Rgba<u8>) -> (f64, f64, f64) {
    let [r, g, b, a] = px.0;
    let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
    if a == 255 {
        return (r, g, b);
    }
    let alpha = f64::from(a) / 255.0;
    (blend(r, alpha), blend(g, alpha), blend(b, alpha))
}

fn blend(channel: f64, alpha: f64) -> f64 {
    255.0 + (channel - 255.0) * alpha
}

fn rgb_to_y(r: f64, g: f64, b: f64) -> f64 {
    r * 0.29889531 + g * 0.58662247 + b * 0.11448223
}

fn rgb_to_i(r: f64, g: f64, b: f64) -> f64 {
    r * 0.59597799 - g * 0.27417610 - b * 0.32180189
}

fn rgb_to_q(r: f64, g: f64, b: f64) -> f64 {
    r * 0.21147017 - g * 0.52261711 + b * 0.31114694
}

fn faded_gray(px: &Rgba<u8>, alpha: f64) -> Rgba<u8> {
    let [r, g, b, a] = px.0;
    let luma = rgb_to_y(f64::from(r), f64::from(g), f64::from(b));
    let value = blend(luma, alpha * f64::from(a) / 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba([value, value, value, 255])
}

/// 3x3 neighbourhood around `(x, y)`, clamped to the image
fn neighbourhood(image: &RgbaImage, x: u32, y: u32) -> (u32, u32, u32, u32) {
    (
        x.saturating_sub(1),
        y.saturating_sub(1),
        (x + 1).min(image.width() - 1),
        (y + 1).min(image.height() - 1),
    )
}

fn on_edge(x: u32, y: u32, bounds: (u32, u32, u32, u32)) -> bool {
    let (x0, y0, x2, y2) = bounds;
    x == x0 || x == x2 || y == y0 || y == y2
}

/// Whether the pixel at `(x, y)` of `image` looks like an anti-aliased edge
fn is_anti_aliased(image: &RgbaImage, other: &RgbaImage, x: u32, y: u32) -> bool {
    let bounds = neighbourhood(image, x, y);
    let (x0, y0, x2, y2) = bounds;
    let center = image.get_pixel(x, y);

    let mut zeroes = u32::from(on_edge(x, y, bounds));
    let mut min = 0.0;
    let mut max = 0.0;
    let mut min_at = None;
    let mut max_at = None;

    for nx in x0..=x2 {
        for ny in y0..=y2 {
            if nx == x && ny == y {
                continue;
            }

            let delta = color_delta(center, image.get_pixel(nx, ny), true);
            if delta == 0.0 {
                zeroes += 1;
                if zeroes > 2 {
                    return false;
                }
            } else if delta < min {
                min = delta;
                min_at = Some((nx, ny));
            } else if delta > max {
                max = delta;
                max_at = Some((nx, ny));
            }
        }
    }

    let (Some(min_at), Some(max_at)) = (min_at, max_at) else {
        return false;
    };

    let flat_in_both = |(px, py): (u32, u32)| {
        has_many_siblings(image, px, py) && has_many_siblings(other, px, py)
    };

    flat_in_both(min_at) || flat_in_both(max_at)
}

/// Whether at least three neighbours share the exact colour of `(x, y)`
fn has_many_siblings(image: &RgbaImage, x: u32, y: u32) -> bool {
    let bounds = neighbourhood(image, x, y);
    let (x0, y0, x2, y2) = bounds;
    let center = image.get_pixel(x, y);

    let mut zeroes = u32::from(on_edge(x, y, bounds));

    for nx in x0..=x2 {
        for ny in y0..=y2 {
            if nx == x && ny == y {
                continue;
            }
            if image.get_pixel(nx, ny) == center {
                zeroes += 1;
            }
            if zeroes > 2 {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn solid(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(width, height, color)
    }

    #[test]
    fn test_identical_images_have_no_mismatches() {
        let img = solid(16, 8, Rgba([40, 80, 120, 255]));
        let result = diff(&img, &img.clone(), &DiffOptions::default()).unwrap();

        assert_eq!(result.mismatched, 0);
        assert_eq!(dimensions(&result.image), Dimensions::new(16, 8));
        assert!(result.image.pixels().all(|p| p[0] == p[1] && p[1] == p[2]));
    }

    #[test]
    fn test_size_mismatch_is_rejected() {
        let err = diff(&solid(4, 4, WHITE), &solid(4, 5, WHITE), &DiffOptions::default())
            .unwrap_err();

        assert_eq!(err.left, Dimensions::new(4, 4));
        assert_eq!(err.right, Dimensions::new(4, 5));
    }

    #[test]
    fn test_block_change_counts_every_pixel() {
        let baseline = solid(40, 30, WHITE);
        let mut current = baseline.clone();
        for x in 10..20 {
            for y in 5..15 {
                current.put_pixel(x, y, BLACK);
            }
        }

        let result = diff(&baseline, &current, &DiffOptions::default()).unwrap();

        assert_eq!(result.mismatched, 100);
        assert_eq!(*result.image.get_pixel(15, 10), Rgba([255, 0, 0, 255]));
        assert_ne!(*result.image.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_threshold_controls_sensitivity() {
        let baseline = solid(4, 4, Rgba([100, 100, 100, 255]));
        let current = solid(4, 4, Rgba([104, 104, 104, 255]));

        let loose = diff(&baseline, &current, &DiffOptions::with_threshold(0.1)).unwrap();
        assert_eq!(loose.mismatched, 0);

        let strict = diff(&baseline, &current, &DiffOptions::with_threshold(0.0)).unwrap();
        assert_eq!(strict.mismatched, 16);
    }

    #[test]
    fn test_transparent_pixels_blend_onto_white() {
        let baseline = solid(3, 3, Rgba([0, 0, 0, 0]));
        let current = solid(3, 3, WHITE);

        let result = diff(&baseline, &current, &DiffOptions::default()).unwrap();
        assert_eq!(result.mismatched, 0);
    }

    #[test]
    fn test_color_delta_sign_follows_brightness() {
        assert!(color_delta(&WHITE, &BLACK, false) < 0.0);
        assert!(color_delta(&BLACK, &WHITE, false) > 0.0);
        assert_eq!(color_delta(&BLACK, &BLACK, false), 0.0);
    }

    #[test]
    fn test_anti_aliased_edge_is_not_counted() {
        // Black left half, white right half; the current image softens the
        // boundary column with a gray ramp pixel
        let mut baseline = solid(6, 6, WHITE);
        for x in 0..3 {
            for y in 0..6 {
                baseline.put_pixel(x, y, BLACK);
            }
        }
        let mut current = baseline.clone();
        current.put_pixel(3, 3, Rgba([128, 128, 128, 255]));

        let result = diff(&baseline, &current, &DiffOptions::default()).unwrap();
        assert_eq!(result.mismatched, 0);
        assert_eq!(*result.image.get_pixel(3, 3), Rgba([255, 255, 0, 255]));

        let counted = diff(
            &baseline,
            &current,
            &DiffOptions {
                include_anti_aliasing: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(counted.mismatched, 1);
    }
}
