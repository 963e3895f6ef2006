use crate::config::Settings;
use crate::console::ConsoleReporter;
use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Output format (text, json)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Capture current screenshots and compare them; `Ok(false)` means a regression
pub fn compare(args: CompareArgs, settings: &Settings) -> Result<bool> {
    let json = args.format == OutputFormat::Json;

    let reporter = if json {
        ConsoleReporter::stderr()
    } else {
        println!("{}", "Capturing current screenshots...".bright_blue().bold());
        ConsoleReporter::stdout()
    };

    let pipeline = settings.pipeline(reporter)?;
    let summary = pipeline.compare()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(summary.passed());
    }

    println!();
    if summary.passed() {
        println!("{} All comparisons passed.", "✓".green());
    } else {
        eprintln!(
            "{} Visual regression detected. Check diff images above.",
            "✗".red()
        );
    }

    Ok(summary.passed())
}
