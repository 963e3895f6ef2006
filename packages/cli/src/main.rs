mod commands;
mod config;
mod console;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{baseline, compare, BaselineArgs, CompareArgs};
use config::Settings;
use std::path::PathBuf;
use std::process::ExitCode;
use vizreg_vision::config::DEFAULT_CONFIG_NAME;

/// Vizreg - visual regression testing for web pages
#[derive(Parser, Debug)]
#[command(name = "vizreg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file listing the targets
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_NAME)]
    config: PathBuf,

    /// Directory holding baselines/, current/ and diffs/ (default: working directory)
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Capture baseline screenshots
    Baseline(BaselineArgs),

    /// Capture current screenshots and compare them against the baselines
    Compare(CompareArgs),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // .env is optional; real environment variables take precedence
    dotenvy::dotenv().ok();

    let settings = Settings::new(cli.config, cli.dir);

    let result = match cli.command {
        Command::Baseline(args) => baseline(args, &settings),
        Command::Compare(args) => compare(args, &settings),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!();
            eprintln!("{} {}", "Error:".red().bold(), err);
            eprintln!();
            ExitCode::FAILURE
        }
    }
}
