//! Progress events emitted while capturing and comparing

use crate::types::{CaptureKind, ComparisonResult};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    /// A capture request is about to be sent
    CaptureStarted { kind: CaptureKind, key: String },

    /// An existing baseline was kept
    CaptureSkipped { key: String },

    /// A capture was written to its store
    CaptureSaved { kind: CaptureKind, path: PathBuf },

    /// A target finished comparing
    Compared { result: ComparisonResult },
}

/// Receives pipeline progress
pub trait Reporter {
    fn on_event(&self, event: &ReportEvent);
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn on_event(&self, event: &ReportEvent) {
        (**self).on_event(event)
    }
}

/// Logs every event through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn on_event(&self, event: &ReportEvent) {
        match event {
            ReportEvent::CaptureStarted { kind, key } => {
                tracing::info!("Capturing {} {}", kind, key)
            }
            ReportEvent::CaptureSkipped { key } => {
                tracing::info!("Skipping {} (baseline already exists)", key)
            }
            ReportEvent::CaptureSaved { kind, path } => {
                tracing::info!("Saved {} {}", kind, path.display())
            }
            ReportEvent::Compared { result } => {
                let status = if result.passed { "PASS" } else { "FAIL" };
                tracing::info!(
                    "[{}] {}: {:.3}% diff ({} pixels)",
                    status,
                    result.target_name,
                    result.diff_percentage,
                    result.mismatched_pixels
                )
            }
        }
    }
}

/// Keeps events in memory
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<ReportEvent>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Reporter for RecordingReporter {
    fn on_event(&self, event: &ReportEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
