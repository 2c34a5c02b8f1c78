//! Command handler functions for the patchcov CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::collector::FailReasonCollector;
use crate::parsers::{istanbul::IstanbulParser, Parser};
use crate::report::{self, JsonFormatter, MarkdownFormatter, ReportFormatter, TextFormatter};
use crate::resolve::{MatchStrategy, Resolver};
use crate::threshold::{self, ChangedLinesCheck};

/// Output style for the `check` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Style {
    #[default]
    Text,
    Markdown,
    Json,
}

/// Settings for one run of the changed-lines check.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub threshold: f64,
    pub strategy: MatchStrategy,
    pub project_root: Option<String>,
    pub style: Style,
    pub parallel: bool,
}

impl CheckOptions {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            strategy: MatchStrategy::default(),
            project_root: None,
            style: Style::default(),
            parallel: false,
        }
    }
}

/// Load the coverage report at `coverage`, run the changed-lines check over
/// `diff_text`, and render the failures. Failures are also signalled to
/// `collector`.
pub fn cmd_check(
    coverage: &Path,
    diff_text: &str,
    options: &CheckOptions,
    collector: &dyn FailReasonCollector,
) -> Result<String> {
    let threshold = threshold::validate_threshold(options.threshold)?;

    let bytes = std::fs::read(coverage)
        .with_context(|| format!("Failed to read coverage report {}", coverage.display()))?;
    let coverage_report = IstanbulParser
        .parse(&bytes)
        .with_context(|| format!("Failed to parse coverage report {}", coverage.display()))?;
    tracing::debug!(files = coverage_report.len(), path = %coverage.display(), "loaded coverage report");

    let mut resolver = Resolver::new(options.strategy);
    if let Some(root) = &options.project_root {
        resolver = resolver.with_project_root(root.as_str());
    }
    let check = ChangedLinesCheck::new(threshold).with_resolver(resolver);

    let results = if options.parallel {
        check.run_parallel(&coverage_report, diff_text, collector)
    } else {
        check.run(&coverage_report, diff_text, collector)
    };

    let output = match options.style {
        Style::Text if results.is_empty() => format!(
            "All changed lines meet the {}% coverage threshold.\n",
            report::format_number(threshold)
        ),
        Style::Text => TextFormatter.format(&results),
        Style::Markdown if results.is_empty() => format!(
            "### Changed lines coverage\n\nAll changed lines meet the **{}%** threshold.\n",
            report::format_number(threshold)
        ),
        Style::Markdown => MarkdownFormatter.format(&results),
        Style::Json => JsonFormatter.format(&results),
    };

    Ok(output)
}
