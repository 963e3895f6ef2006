//! # Vizreg Vision
//!
//! Visual regression testing for web pages.
//!
//! Screenshots are captured through the Scrnpix rendering service into a
//! `current/` store, compared pixel by pixel against the PNGs in `baselines/`,
//! and every comparison leaves a diff image in `diffs/`.
//!
//! ## Lifecycle
//!
//! - Baselines are written once and only replaced on an explicit update
//! - Current captures and diffs are overwritten on every run
//! - A target passes when its mismatched share is at most `maxDiffPercentage`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vizreg_vision::{load_config, EnvConfig, Pipeline, ScrnpixClient, Stores};
//! use std::path::Path;
//!
//! # fn main() -> vizreg_vision::Result<()> {
//! let config = load_config(Path::new("visual-regression.config.json"))?;
//! let client = ScrnpixClient::new(&EnvConfig::from_env()?)?;
//!
//! let pipeline = Pipeline::new(config, client, Stores::in_dir(""));
//! let summary = pipeline.compare()?;
//!
//! for result in &summary.results {
//!     println!("{}: {:.3}%", result.target_name, result.diff_percentage);
//! }
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod client;
pub mod compare;
pub mod config;
pub mod differ;
pub mod pipeline;
pub mod reporter;
mod types;

pub use client::{CaptureCause, CaptureError, Renderer, ScrnpixClient};
pub use compare::{compare_images, run_comparisons, CompareError};
pub use config::{
    derive_filename, load_config, resolve, ConfigError, EnvConfig, ResolvedConfig,
    VisualRegressionConfig,
};
pub use pipeline::Pipeline;
pub use reporter::{RecordingReporter, ReportEvent, Reporter, TracingReporter};
pub use types::{
    CaptureKind, CaptureReport, ComparisonResult, Dimensions, RunSummary, ScreenshotTarget,
};

use std::path::Path;
use thiserror::Error;
use vizreg_common::{DirStore, ImageStore, StoreError};

pub const BASELINES_DIR: &str = "baselines";
pub const CURRENT_DIR: &str = "current";
pub const DIFFS_DIR: &str = "diffs";

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Compare(#[from] CompareError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// The three image stores a run reads and writes
pub struct Stores {
    pub baselines: Box<dyn ImageStore>,
    pub current: Box<dyn ImageStore>,
    pub diffs: Box<dyn ImageStore>,
}

impl Stores {
    pub fn new(
        baselines: impl ImageStore + 'static,
        current: impl ImageStore + 'static,
        diffs: impl ImageStore + 'static,
    ) -> Self {
        Self {
            baselines: Box::new(baselines),
            current: Box::new(current),
            diffs: Box::new(diffs),
        }
    }

    /// `baselines/`, `current/` and `diffs/` under `root`
    ///
    /// An empty `root` keeps the reported paths relative to the working
    /// directory.
    pub fn in_dir(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::new(
            DirStore::new(root.join(BASELINES_DIR)),
            DirStore::new(root.join(CURRENT_DIR)),
            DirStore::new(root.join(DIFFS_DIR)),
        )
    }
}
