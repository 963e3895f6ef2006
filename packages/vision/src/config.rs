//! Target registry and configuration resolution

use crate::types::ScreenshotTarget;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_NAME: &str = "visual-regression.config.json";

pub const DEFAULT_THRESHOLD: f64 = 0.1;
pub const DEFAULT_MAX_DIFF_PERCENTAGE: f64 = 0.5;
pub const DEFAULT_API_URL: &str = "https://api.scrnpix.com";

pub const API_KEY_VAR: &str = "SCRNPIX_API_KEY";
pub const API_URL_VAR: &str = "SCRNPIX_API_URL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "SCRNPIX_API_KEY environment variable is not set.\n  \
         1. Copy .env.example to .env\n  \
         2. Add your API key from https://scrnpix.com\n  \
         3. Run the command again"
    )]
    MissingApiKey,

    #[error("Invalid API URL {url:?}: {reason}")]
    InvalidApiUrl { url: String, reason: String },

    #[error("threshold must be between 0 and 1, got {0}")]
    InvalidThreshold(f64),

    #[error("maxDiffPercentage must be between 0 and 100, got {0}")]
    InvalidMaxDiffPercentage(f64),

    #[error("Target name must not be empty (url: {0})")]
    EmptyTargetName(String),

    #[error("Duplicate target name: {0}")]
    DuplicateTarget(String),

    #[error("Viewport of {0} must be at least 1x1")]
    EmptyViewport(String),

    #[error("Cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// User-authored configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualRegressionConfig {
    /// Pages to capture
    #[serde(default)]
    pub targets: Vec<ScreenshotTarget>,

    /// Per-pixel color threshold (0-1). Lower = stricter. Default: 0.1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,

    /// Maximum allowed diff percentage (0-100). Default: 0.5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_diff_percentage: Option<f64>,
}

/// Configuration with defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub targets: Vec<ScreenshotTarget>,

    /// Per-pixel channel tolerance handed to the differ
    pub threshold: f64,

    /// Largest mismatch ratio, in percent, that still passes
    pub max_diff_percentage: f64,
}

/// Apply defaults and validate a raw config
pub fn resolve(config: VisualRegressionConfig) -> Result<ResolvedConfig, ConfigError> {
    let threshold = config.threshold.unwrap_or(DEFAULT_THRESHOLD);
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ConfigError::InvalidThreshold(threshold));
    }

    let max_diff_percentage = config
        .max_diff_percentage
        .unwrap_or(DEFAULT_MAX_DIFF_PERCENTAGE);
    if !(0.0..=100.0).contains(&max_diff_percentage) {
        return Err(ConfigError::InvalidMaxDiffPercentage(max_diff_percentage));
    }

    let mut seen = HashSet::new();
    for target in &config.targets {
        if target.name.trim().is_empty() {
            return Err(ConfigError::EmptyTargetName(target.url.clone()));
        }
        if !seen.insert(target.name.as_str()) {
            return Err(ConfigError::DuplicateTarget(target.name.clone()));
        }
        if target.width == Some(0) || target.height == Some(0) {
            return Err(ConfigError::EmptyViewport(target.name.clone()));
        }
    }

    Ok(ResolvedConfig {
        targets: config.targets,
        threshold,
        max_diff_percentage,
    })
}

/// Load and resolve a JSON config file
pub fn load_config(path: &Path) -> Result<ResolvedConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config: VisualRegressionConfig =
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(
        "Loaded {} targets from {}",
        config.targets.len(),
        path.display()
    );

    resolve(config)
}

/// File name for a target: `<name>-<width>x<height>.png`
///
/// Capture and compare both locate files through this, so it must stay the
/// only place names are built.
pub fn derive_filename(target: &ScreenshotTarget) -> String {
    format!("{}-{}.png", target.name, target.viewport())
}

/// Rendering service credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub api_key: String,
    pub api_url: String,
}

impl EnvConfig {
    pub fn new(api_key: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: api_url.into(),
        }
    }

    /// Read credentials from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Read credentials through `lookup`; empty values count as unset
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let api_key = non_empty(API_KEY_VAR).ok_or(ConfigError::MissingApiKey)?;
        let api_url = non_empty(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self { api_key, api_url })
    }
}
