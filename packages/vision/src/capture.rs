//! Screenshot capture into baseline and current stores

use crate::client::Renderer;
use crate::config::ResolvedConfig;
use crate::reporter::{ReportEvent, Reporter};
use crate::types::{CaptureKind, CaptureReport};
use crate::Result;
use vizreg_common::ImageStore;

/// Capture baselines, keeping existing ones unless `update` is set
pub fn capture_baselines(
    config: &ResolvedConfig,
    renderer: &dyn Renderer,
    store: &dyn ImageStore,
    reporter: &dyn Reporter,
    update: bool,
) -> Result<CaptureReport> {
    capture_into(config, renderer, store, reporter, CaptureKind::Baseline, update)
}

/// Capture current screenshots, always overwriting
pub fn capture_current(
    config: &ResolvedConfig,
    renderer: &dyn Renderer,
    store: &dyn ImageStore,
    reporter: &dyn Reporter,
) -> Result<CaptureReport> {
    capture_into(config, renderer, store, reporter, CaptureKind::Current, true)
}

/// Capture every target in order; the first failure aborts the pass
fn capture_into(
    config: &ResolvedConfig,
    renderer: &dyn Renderer,
    store: &dyn ImageStore,
    reporter: &dyn Reporter,
    kind: CaptureKind,
    overwrite: bool,
) -> Result<CaptureReport> {
    store.prepare()?;

    let mut report = CaptureReport::default();

    for target in &config.targets {
        let key = target.filename();

        if !overwrite && store.exists(&key) {
            reporter.on_event(&ReportEvent::CaptureSkipped { key: key.clone() });
            report.skipped.push(key);
            continue;
        }

        reporter.on_event(&ReportEvent::CaptureStarted {
            kind,
            key: key.clone(),
        });

        let png = renderer.capture(target)?;
        store.write(&key, &png)?;

        reporter.on_event(&ReportEvent::CaptureSaved {
            kind,
            path: store.locate(&key),
        });
        report.captured.push(key);
    }

    Ok(report)
}
