use crate::config::Settings;
use crate::console::ConsoleReporter;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

#[derive(Args, Debug)]
pub struct BaselineArgs {
    /// Overwrite baselines that already exist
    #[arg(long)]
    pub update: bool,
}

pub fn baseline(args: BaselineArgs, settings: &Settings) -> Result<bool> {
    if args.update {
        println!("{}", "Updating baselines...".bright_blue().bold());
    } else {
        println!("{}", "Capturing baselines...".bright_blue().bold());
    }

    let pipeline = settings.pipeline(ConsoleReporter::stdout())?;
    let report = pipeline.baseline(args.update)?;

    println!();
    println!(
        "{} {} captured, {} skipped",
        "Done.".green().bold(),
        report.captured.len(),
        report.skipped.len()
    );

    Ok(true)
}
