use colored::Colorize;
use std::cell::Cell;
use vizreg_vision::{ComparisonResult, ReportEvent, Reporter};

/// Prints capture progress and comparison verdicts as they happen
pub struct ConsoleReporter {
    to_stderr: bool,
    comparing: Cell<bool>,
}

impl ConsoleReporter {
    pub fn stdout() -> Self {
        Self {
            to_stderr: false,
            comparing: Cell::new(false),
        }
    }

    /// Keep stdout free for machine-readable output
    pub fn stderr() -> Self {
        Self {
            to_stderr: true,
            ..Self::stdout()
        }
    }

    /// Lines to print for an event
    ///
    /// The first `Compared` event is preceded by the comparison header.
    fn lines(&self, event: &ReportEvent) -> Vec<String> {
        match event {
            ReportEvent::CaptureSkipped { key } => vec![format!(
                "  {} {} (already exists, use --update to overwrite)",
                "[skip]".yellow(),
                key
            )],
            ReportEvent::CaptureStarted { key, .. } => {
                vec![format!("  {} {} ...", "[capture]".cyan(), key)]
            }
            ReportEvent::CaptureSaved { path, .. } => {
                vec![format!("  {}   {}", "[saved]".green(), path.display())]
            }
            ReportEvent::Compared { result } => {
                let mut lines = Vec::new();
                if !self.comparing.replace(true) {
                    lines.push(String::new());
                    lines.push(
                        "Comparing against baselines..."
                            .bright_blue()
                            .bold()
                            .to_string(),
                    );
                }
                lines.extend(result_lines(result));
                lines
            }
        }
    }
}

impl Reporter for ConsoleReporter {
    fn on_event(&self, event: &ReportEvent) {
        for line in self.lines(event) {
            if self.to_stderr {
                eprintln!("{}", line);
            } else {
                println!("{}", line);
            }
        }
    }
}

/// `[PASS] name - 0.000% diff (0 pixels)`, without colour
pub fn result_line(result: &ComparisonResult) -> String {
    format!(
        "[{}] {} - {:.3}% diff ({} pixels)",
        if result.passed { "PASS" } else { "FAIL" },
        result.target_name,
        result.diff_percentage,
        result.mismatched_pixels
    )
}

fn result_lines(result: &ComparisonResult) -> Vec<String> {
    let line = result_line(result);
    if result.passed {
        vec![format!("  {}", line.green())]
    } else {
        vec![
            format!("  {}", line.red()),
            format!("         diff saved: {}", result.diff_path.display()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use vizreg_vision::CaptureKind;

    fn sample() -> ComparisonResult {
        ComparisonResult {
            target_name: "home".to_string(),
            baseline_path: PathBuf::from("baselines/home-1280x720.png"),
            current_path: PathBuf::from("current/home-1280x720.png"),
            diff_path: PathBuf::from("diffs/home-1280x720.png"),
            total_pixels: 921_600,
            mismatched_pixels: 0,
            diff_percentage: 0.0,
            passed: true,
        }
    }

    #[test]
    fn test_header_precedes_first_comparison_only() {
        colored::control::set_override(false);
        let reporter = ConsoleReporter::stdout();

        let capture = reporter.lines(&ReportEvent::CaptureStarted {
            kind: CaptureKind::Current,
            key: "home-1280x720.png".to_string(),
        });
        assert_eq!(capture, vec!["  [capture] home-1280x720.png ..."]);

        let first = reporter.lines(&ReportEvent::Compared { result: sample() });
        assert_eq!(
            first,
            vec![
                "",
                "Comparing against baselines...",
                "  [PASS] home - 0.000% diff (0 pixels)",
            ]
        );

        let failed = ComparisonResult {
            passed: false,
            mismatched_pixels: 100,
            diff_percentage: 50.0,
            ..sample()
        };
        let second = reporter.lines(&ReportEvent::Compared { result: failed });
        assert_eq!(
            second,
            vec![
                "  [FAIL] home - 50.000% diff (100 pixels)",
                "         diff saved: diffs/home-1280x720.png",
            ]
        );
    }

    #[test]
    fn test_result_line() {
        let result = ComparisonResult {
            target_name: "home".to_string(),
            baseline_path: PathBuf::from("baselines/home-1280x720.png"),
            current_path: PathBuf::from("current/home-1280x720.png"),
            diff_path: PathBuf::from("diffs/home-1280x720.png"),
            total_pixels: 921_600,
            mismatched_pixels: 100,
            diff_percentage: 100.0 / 921_600.0 * 100.0,
            passed: true,
        };

        assert_eq!(result_line(&result), "[PASS] home - 0.011% diff (100 pixels)");

        let failed = ComparisonResult {
            passed: false,
            diff_percentage: 12.3456,
            ..result
        };
        assert_eq!(result_line(&failed), "[FAIL] home - 12.346% diff (100 pixels)");
    }
}
