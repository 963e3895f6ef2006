use anyhow::Result;
use std::path::PathBuf;
use vizreg_vision::{
    load_config, EnvConfig, Pipeline, Reporter, ResolvedConfig, ScrnpixClient, Stores,
};

/// Where a CLI invocation reads its config and keeps its images
#[derive(Debug, Clone)]
pub struct Settings {
    /// JSON config file
    pub config_path: PathBuf,

    /// Parent of `baselines/`, `current/` and `diffs/`; empty means the
    /// working directory
    pub root: PathBuf,
}

impl Settings {
    pub fn new(config_path: PathBuf, root: Option<PathBuf>) -> Self {
        Self {
            config_path,
            root: root.unwrap_or_default(),
        }
    }

    pub fn load_config(&self) -> Result<ResolvedConfig> {
        Ok(load_config(&self.config_path)?)
    }

    /// Build a pipeline against the Scrnpix API
    ///
    /// Fails before any request is made when the API key is missing.
    pub fn pipeline(&self, reporter: impl Reporter + 'static) -> Result<Pipeline<ScrnpixClient>> {
        let config = self.load_config()?;
        let env = EnvConfig::from_env()?;
        let client = ScrnpixClient::new(&env)?;

        tracing::debug!(
            "Using {} with {} targets",
            env.api_url,
            config.targets.len()
        );

        Ok(Pipeline::new(config, client, Stores::in_dir(&self.root)).with_reporter(reporter))
    }
}
