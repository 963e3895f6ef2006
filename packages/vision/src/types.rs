//! Core types for visual regression runs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Viewport width used when a target doesn't set one
pub const DEFAULT_WIDTH: u32 = 1280;

/// Viewport height used when a target doesn't set one
pub const DEFAULT_HEIGHT: u32 = 720;

/// A named page to screenshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotTarget {
    /// Unique name, used as the identity of the target
    pub name: String,

    /// Page URL, must be reachable by the rendering service
    pub url: String,

    /// Viewport width in pixels (defaults to 1280)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Viewport height in pixels (defaults to 720)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// Capture the full scrollable page instead of the viewport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_page: Option<bool>,
}

impl ScreenshotTarget {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            width: None,
            height: None,
            full_page: None,
        }
    }

    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_full_page(mut self, full_page: bool) -> Self {
        self.full_page = Some(full_page);
        self
    }

    /// Width and height after defaults
    pub fn viewport(&self) -> Dimensions {
        Dimensions {
            width: self.width.unwrap_or(DEFAULT_WIDTH),
            height: self.height.unwrap_or(DEFAULT_HEIGHT),
        }
    }

    /// Store key shared by the baseline, current and diff images
    pub fn filename(&self) -> String {
        crate::config::derive_filename(self)
    }
}

/// Pixel dimensions of an image or viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Outcome of comparing one target against its baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub target_name: String,
    pub baseline_path: PathBuf,
    pub current_path: PathBuf,
    pub diff_path: PathBuf,
    pub total_pixels: u64,
    pub mismatched_pixels: u64,

    /// `100 * mismatched_pixels / total_pixels`
    pub diff_percentage: f64,

    /// `diff_percentage <= max_diff_percentage`
    pub passed: bool,
}

/// Results of one compare run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub results: Vec<ComparisonResult>,

    /// Timestamp of the run
    pub generated_at: String,
}

impl RunSummary {
    pub fn new(results: Vec<ComparisonResult>) -> Self {
        Self {
            results,
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// True when every target passed, including when there were none
    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ComparisonResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    /// One line per failing target, empty if everything passed
    pub fn failure_report(&self) -> String {
        self.failures()
            .map(|f| {
                format!(
                    "  {}: {:.3}% diff ({} pixels) - see {}",
                    f.target_name,
                    f.diff_percentage,
                    f.mismatched_pixels,
                    f.diff_path.display()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Baseline or current capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureKind {
    Baseline,
    Current,
}

impl fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureKind::Baseline => write!(f, "baseline"),
            CaptureKind::Current => write!(f, "current"),
        }
    }
}

/// Keys written and skipped by one capture pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureReport {
    pub captured: Vec<String>,
    pub skipped: Vec<String>,
}
