//! Capture-then-compare orchestration

use crate::capture::{capture_baselines, capture_current};
use crate::client::Renderer;
use crate::compare::run_comparisons;
use crate::config::ResolvedConfig;
use crate::reporter::{Reporter, TracingReporter};
use crate::types::{CaptureReport, RunSummary};
use crate::{Result, Stores};

/// Runs the baseline and compare workflows for one configuration
pub struct Pipeline<R> {
    config: ResolvedConfig,
    renderer: R,
    stores: Stores,
    reporter: Box<dyn Reporter>,
}

impl<R: Renderer> Pipeline<R> {
    pub fn new(config: ResolvedConfig, renderer: R, stores: Stores) -> Self {
        Self {
            config,
            renderer,
            stores,
            reporter: Box::new(TracingReporter),
        }
    }

    /// Replace the default `tracing` reporter
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Capture baselines; existing ones are kept unless `update` is set
    pub fn baseline(&self, update: bool) -> Result<CaptureReport> {
        tracing::debug!(
            "{} baselines for {} targets",
            if update { "Updating" } else { "Capturing" },
            self.config.targets.len()
        );

        capture_baselines(
            &self.config,
            &self.renderer,
            self.stores.baselines.as_ref(),
            self.reporter.as_ref(),
            update,
        )
    }

    /// Capture current screenshots and compare them against the baselines
    pub fn compare(&self) -> Result<RunSummary> {
        capture_current(
            &self.config,
            &self.renderer,
            self.stores.current.as_ref(),
            self.reporter.as_ref(),
        )?;

        let results = run_comparisons(&self.config, &self.stores, self.reporter.as_ref())?;
        Ok(RunSummary::new(results))
    }
}
