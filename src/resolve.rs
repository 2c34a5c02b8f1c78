//! Resolution of diff paths (repo-relative) to coverage report keys
//! (often absolute).

use clap::ValueEnum;

use crate::model::{CoverageReport, FileCoverageEntry};

/// How a diff path is matched against coverage report keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MatchStrategy {
    /// Exact match after normalization, then a unique match on a
    /// path-component suffix. Several candidates make the path ambiguous.
    #[default]
    Strict,
    /// First key, in report order, that ends with or contains the diff path.
    FirstMatch,
}

/// Outcome of resolving one diff path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    Found {
        key: &'a str,
        entry: &'a FileCoverageEntry,
    },
    NotFound,
    Ambiguous(Vec<&'a str>),
}

/// Finds the coverage entry belonging to a changed file.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    strategy: MatchStrategy,
    project_root: Option<String>,
}

impl Resolver {
    pub fn new(strategy: MatchStrategy) -> Self {
        Self {
            strategy,
            project_root: None,
        }
    }

    /// Strip `root` from report keys before comparing them to diff paths.
    pub fn with_project_root(mut self, root: impl Into<String>) -> Self {
        let root = normalize(&root.into(), None);
        let root = root.trim_end_matches('/');
        self.project_root = (!root.is_empty()).then(|| root.to_string());
        self
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    pub fn resolve<'a>(&self, report: &'a CoverageReport, file_path: &str) -> Resolution<'a> {
        if file_path.is_empty() {
            return Resolution::NotFound;
        }
        match self.strategy {
            MatchStrategy::FirstMatch => first_match(report, file_path),
            MatchStrategy::Strict => self.strict(report, file_path),
        }
    }

    fn strict<'a>(&self, report: &'a CoverageReport, file_path: &str) -> Resolution<'a> {
        let wanted = normalize(file_path, None);
        let root = self.project_root.as_deref();
        let keys: Vec<(&str, String)> = report
            .paths()
            .map(|key| (key, normalize(key, root)))
            .collect();

        if let Some((key, _)) = keys.iter().find(|(_, norm)| *norm == wanted) {
            return found(report, key);
        }

        let component_suffix = format!("/{wanted}");
        let suffix: Vec<&str> = keys
            .iter()
            .filter(|(_, norm)| norm.ends_with(&component_suffix))
            .map(|(key, _)| *key)
            .collect();
        unique(report, suffix)
    }
}

fn first_match<'a>(report: &'a CoverageReport, file_path: &str) -> Resolution<'a> {
    report
        .iter()
        .find(|(key, _)| key.ends_with(file_path) || key.contains(file_path))
        .map_or(Resolution::NotFound, |(key, entry)| Resolution::Found {
            key,
            entry: entry.normalized(),
        })
}

fn found<'a>(report: &'a CoverageReport, key: &str) -> Resolution<'a> {
    report
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(Resolution::NotFound, |(key, entry)| Resolution::Found {
            key,
            entry: entry.normalized(),
        })
}

fn unique<'a>(report: &'a CoverageReport, candidates: Vec<&'a str>) -> Resolution<'a> {
    match candidates.as_slice() {
        [] => Resolution::NotFound,
        [key] => found(report, key),
        _ => Resolution::Ambiguous(candidates),
    }
}

/// Canonical comparison form: forward slashes, no leading `./`, and the
/// project root (if any) removed.
fn normalize(path: &str, root: Option<&str>) -> String {
    let path = path.replace('\\', "/");
    let mut path = path.as_str();
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    if let Some(rest) = root.and_then(|r| path.strip_prefix(r)) {
        if let Some(rest) = rest.strip_prefix('/') {
            return rest.to_string();
        }
    }
    path.to_string()
}
