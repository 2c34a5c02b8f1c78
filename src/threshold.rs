//! The changed-lines threshold check: index the diff, resolve every
//! touched file to its coverage entry, measure the statements on added
//! lines, and report the files that fall below the threshold.

use rayon::prelude::*;

use crate::changed_lines;
use crate::collector::{FailReason, FailReasonCollector};
use crate::diff::{self, AddedLineIndex};
use crate::error::{PatchcovError, Result};
use crate::model::{CoverageReport, ThresholdResult};
use crate::resolve::{Resolution, Resolver};

/// Check that `threshold` is a percentage in `0..=100`.
pub fn validate_threshold(threshold: f64) -> Result<f64> {
    if threshold.is_finite() && (0.0..=100.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(PatchcovError::InvalidThreshold(threshold))
    }
}

/// A configured changed-lines check.
#[derive(Debug, Clone)]
pub struct ChangedLinesCheck {
    threshold: f64,
    resolver: Resolver,
}

impl ChangedLinesCheck {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            resolver: Resolver::default(),
        }
    }

    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Run the check over `diff_text` and signal `collector` once if any
    /// file failed. Results follow the order files appear in the diff.
    pub fn run(
        &self,
        report: &CoverageReport,
        diff_text: &str,
        collector: &dyn FailReasonCollector,
    ) -> Vec<ThresholdResult> {
        let index = diff::index_added_lines(diff_text);
        let results = self.evaluate(report, &index);
        self.finish(results, collector)
    }

    /// Same as [`run`](Self::run), with files evaluated on the rayon pool.
    /// Result order is unchanged.
    pub fn run_parallel(
        &self,
        report: &CoverageReport,
        diff_text: &str,
        collector: &dyn FailReasonCollector,
    ) -> Vec<ThresholdResult> {
        let index = diff::index_added_lines(diff_text);
        let files: Vec<(&str, &[u32])> = index.iter().collect();
        let results = files
            .par_iter()
            .filter_map(|(path, lines)| self.check_file(report, path, lines))
            .collect();
        self.finish(results, collector)
    }

    /// Evaluate an already built index without touching any collector.
    pub fn evaluate(&self, report: &CoverageReport, index: &AddedLineIndex) -> Vec<ThresholdResult> {
        index
            .iter()
            .filter_map(|(path, lines)| self.check_file(report, path, lines))
            .collect()
    }

    fn finish(
        &self,
        results: Vec<ThresholdResult>,
        collector: &dyn FailReasonCollector,
    ) -> Vec<ThresholdResult> {
        tracing::debug!(failures = results.len(), threshold = self.threshold, "changed-lines check done");
        if !results.is_empty() {
            collector.add(FailReason::UnderThreshold);
        }
        results
    }

    fn check_file(&self, report: &CoverageReport, path: &str, lines: &[u32]) -> Option<ThresholdResult> {
        if lines.is_empty() {
            return None;
        }

        let entry = match self.resolver.resolve(report, path) {
            Resolution::Found { key, entry } => {
                tracing::debug!(path, key, "resolved coverage entry");
                entry
            }
            Resolution::NotFound => {
                tracing::debug!(path, "no coverage entry, skipping");
                return None;
            }
            Resolution::Ambiguous(candidates) => {
                tracing::warn!(path, ?candidates, "ambiguous coverage entry, skipping");
                return None;
            }
        };

        let coverage = changed_lines::calculate(entry, lines);
        if coverage.total == 0 {
            tracing::debug!(path, "no statements on changed lines");
            return None;
        }

        let percent = coverage.percents();
        tracing::debug!(
            path,
            covered = coverage.covered,
            total = coverage.total,
            percent,
            threshold = self.threshold,
            "changed-lines coverage"
        );

        (percent < self.threshold)
            .then(|| ThresholdResult::changed_lines(path, self.threshold, percent))
    }
}

/// Run a changed-lines check with the default resolver.
pub fn check_changed_files_threshold(
    report: &CoverageReport,
    threshold: f64,
    diff_text: &str,
    collector: &dyn FailReasonCollector,
) -> Vec<ThresholdResult> {
    ChangedLinesCheck::new(threshold).run(report, diff_text, collector)
}
