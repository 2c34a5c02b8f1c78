use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use patchcov::cli::{self, CheckOptions, Style};
use patchcov::collector::DataCollector;
use patchcov::diff::{DiffSource, GitDiff, StdinDiff};
use patchcov::resolve::MatchStrategy;

/// patchcov — Coverage thresholds for the lines a change adds.
#[derive(Parser)]
#[command(name = "patchcov", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fail when the statements on added lines are not covered enough.
    Check {
        /// Path to an Istanbul `coverage-final.json` report.
        #[arg(long)]
        coverage: PathBuf,

        /// Minimum changed-lines coverage per file, in percent.
        #[arg(long)]
        threshold: f64,

        /// Git diff arguments, e.g. "HEAD~1" or "main..HEAD".
        /// If omitted, reads a unified diff from stdin.
        #[arg(long)]
        git_diff: Option<String>,

        /// Project root to strip from report paths before matching.
        #[arg(long)]
        project_root: Option<String>,

        /// How diff paths are matched to report paths.
        #[arg(long, value_enum, default_value_t = MatchStrategy::Strict)]
        match_strategy: MatchStrategy,

        /// Output style.
        #[arg(long, value_enum, default_value_t = Style::Text)]
        style: Style,

        /// Evaluate files in parallel.
        #[arg(long)]
        parallel: bool,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("PATCHCOV_LOG").unwrap_or_else(|_| EnvFilter::new("off"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_logging();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("patchcov: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            coverage,
            threshold,
            git_diff,
            project_root,
            match_strategy,
            style,
            parallel,
        } => {
            let source: Box<dyn DiffSource> = match git_diff {
                Some(args) => Box::new(GitDiff { args }),
                None => Box::new(StdinDiff),
            };
            let diff_text = source.fetch_diff()?;

            let options = CheckOptions {
                threshold,
                strategy: match_strategy,
                project_root,
                style,
                parallel,
            };
            let collector = DataCollector::new();
            let output = cli::cmd_check(&coverage, &diff_text, &options, &collector)?;
            print!("{output}");

            if collector.is_empty() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
