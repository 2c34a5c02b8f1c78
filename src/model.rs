//! In-memory representation of Istanbul statement coverage and of the
//! results produced by the changed-lines check. Parsers produce a
//! `CoverageReport`; the evaluator produces `ThresholdResult`s.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Compute a coverage percentage, returning 100.0 when the total is zero.
///
/// This is the one percentage function of the crate: every threshold
/// comparison and every rendered percentage goes through it.
#[must_use]
pub fn percents(covered: u64, total: u64) -> f64 {
    if total == 0 {
        100.0
    } else {
        covered as f64 / total as f64 * 100.0
    }
}

/// One statement of a file with its resolved line range and hit count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatementEntry {
    pub start_line: u32,
    pub end_line: u32,
    pub count: f64,
}

impl StatementEntry {
    #[must_use]
    pub fn is_covered(&self) -> bool {
        self.count > 0.0
    }
}

/// Flat per-file coverage record: `statementMap` plus the parallel `s` counts.
///
/// Both maps are kept as raw JSON values and read field by field, so one odd
/// statement never costs the rest of the file. Other Istanbul keys (`fnMap`,
/// `branchMap`, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileCoverageEntry {
    #[serde(rename = "statementMap")]
    pub statement_map: BTreeMap<String, Value>,
    #[serde(default)]
    pub s: BTreeMap<String, Value>,
}

impl FileCoverageEntry {
    /// Iterate over every statement, pairing each location with its count.
    ///
    /// A statement without a readable `start.line` is skipped. A missing end
    /// (or an end line of 0) collapses the range onto the start line. Any
    /// numeric count is accepted as is; a missing or non-numeric count reads
    /// as 0.
    pub fn statements(&self) -> impl Iterator<Item = StatementEntry> + '_ {
        self.statement_map.iter().filter_map(|(idx, loc)| {
            let start_line = line_of(&loc["start"])?;
            let end_line = match line_of(&loc["end"]) {
                Some(end) if end != 0 => end,
                _ => start_line,
            };
            let count = self.s.get(idx).and_then(Value::as_f64).unwrap_or(0.0);
            Some(StatementEntry {
                start_line,
                end_line,
                count,
            })
        })
    }
}

fn line_of(position: &Value) -> Option<u32> {
    position["line"].as_u64().and_then(|l| u32::try_from(l).ok())
}

/// The two shapes a coverage map value can take. Only the resolver looks
/// at this; everything downstream works on [`FileCoverageEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CoverageEntry {
    Flat(FileCoverageEntry),
    Wrapped { data: FileCoverageEntry },
}

impl CoverageEntry {
    #[must_use]
    pub fn normalized(&self) -> &FileCoverageEntry {
        match self {
            CoverageEntry::Flat(entry) => entry,
            CoverageEntry::Wrapped { data } => data,
        }
    }
}

/// A whole coverage map, in the order its keys appear in the report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageReport {
    files: Vec<(String, CoverageEntry)>,
}

impl CoverageReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. A repeated key replaces the earlier value in place.
    pub fn insert(&mut self, path: String, entry: CoverageEntry) {
        match self.files.iter_mut().find(|(p, _)| *p == path) {
            Some(slot) => slot.1 = entry,
            None => self.files.push((path, entry)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CoverageEntry)> {
        self.files.iter().map(|(p, e)| (p.as_str(), e))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|(p, _)| p.as_str())
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&CoverageEntry> {
        self.files.iter().find(|(p, _)| p == path).map(|(_, e)| e)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FromIterator<(String, CoverageEntry)> for CoverageReport {
    fn from_iter<I: IntoIterator<Item = (String, CoverageEntry)>>(iter: I) -> Self {
        let mut report = CoverageReport::new();
        for (path, entry) in iter {
            report.insert(path, entry);
        }
        report
    }
}

/// Statements overlapping the changed lines of one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangedLinesCoverage {
    pub covered: u64,
    pub total: u64,
}

impl ChangedLinesCoverage {
    #[must_use]
    pub fn percents(&self) -> f64 {
        percents(self.covered, self.total)
    }
}

/// Coverage metric a threshold applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdType {
    Statements,
    Functions,
    Branches,
    Lines,
}

impl ThresholdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdType::Statements => "statements",
            ThresholdType::Functions => "functions",
            ThresholdType::Branches => "branches",
            ThresholdType::Lines => "lines",
        }
    }
}

impl fmt::Display for ThresholdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single threshold failure.
///
/// `expected` is a percentage, or the negated maximum number of uncovered
/// items when a threshold is expressed as a count. Changed-lines results
/// always carry a percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdResult {
    pub path: String,
    pub expected: f64,
    pub received: f64,
    #[serde(rename = "type")]
    pub kind: ThresholdType,
    pub is_changed_lines_threshold: bool,
}

impl ThresholdResult {
    /// A failure produced by the changed-lines check.
    #[must_use]
    pub fn changed_lines(path: impl Into<String>, expected: f64, received: f64) -> Self {
        Self {
            path: path.into(),
            expected,
            received,
            kind: ThresholdType::Lines,
            is_changed_lines_threshold: true,
        }
    }
}
