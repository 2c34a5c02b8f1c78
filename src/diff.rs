//! Parse a unified diff to extract which lines were added in each file.
//! This is the input side of the changed-lines check: only statements that
//! overlap these lines count toward a file's changed-lines coverage.
//!
//! Also provides a [`DiffSource`] trait that abstracts over different
//! ways to obtain a diff (stdin, git).

use std::collections::{HashMap, HashSet};
use std::process::Command;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

/// Pre-compiled regex for hunk headers like "@@ -10,5 +20,8 @@".
static HUNK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").unwrap()
});

// ---------------------------------------------------------------------------
// Diff sources
// ---------------------------------------------------------------------------

/// A source for obtaining a unified diff.
pub trait DiffSource {
    /// Fetch the diff text.
    fn fetch_diff(&self) -> Result<String>;
}

/// Diff from stdin.
pub struct StdinDiff;

impl DiffSource for StdinDiff {
    fn fetch_diff(&self) -> Result<String> {
        std::io::read_to_string(std::io::stdin()).context("Failed to read diff from stdin")
    }
}

/// Diff from a git command (e.g., `git diff HEAD~1`).
pub struct GitDiff {
    /// Arguments to pass to `git diff`.
    pub args: String,
}

impl DiffSource for GitDiff {
    fn fetch_diff(&self) -> Result<String> {
        let diff_args: Vec<&str> = self.args.split_whitespace().collect();
        let output = Command::new("git")
            .arg("diff")
            .args(&diff_args)
            .output()
            .context("Failed to run git diff")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("git diff failed: {stderr}");
        }

        String::from_utf8(output.stdout).context("git diff output not valid UTF-8")
    }
}

// ---------------------------------------------------------------------------
// Added-line index
// ---------------------------------------------------------------------------

/// Added line numbers per file, in the order files appear in the diff.
///
/// A file that is in the diff but has no additions is present with an
/// empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddedLineIndex {
    files: Vec<(String, Vec<u32>)>,
    /// Path to position in `files`.
    positions: HashMap<String, usize>,
    /// Lines already recorded, parallel to `files`.
    seen: Vec<HashSet<u32>>,
}

impl AddedLineIndex {
    /// Record `path` as present in the diff, appending `lines` to whatever
    /// was already recorded for it. Line numbers stay unique per file.
    pub fn extend(&mut self, path: &str, lines: impl IntoIterator<Item = u32>) {
        let idx = match self.positions.get(path) {
            Some(&idx) => idx,
            None => {
                self.files.push((path.to_string(), Vec::new()));
                self.seen.push(HashSet::new());
                let idx = self.files.len() - 1;
                self.positions.insert(path.to_string(), idx);
                idx
            }
        };
        let existing = &mut self.files[idx].1;
        let seen = &mut self.seen[idx];
        for line in lines {
            if seen.insert(line) {
                existing.push(line);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u32])> {
        self.files.iter().map(|(p, l)| (p.as_str(), l.as_slice()))
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&[u32]> {
        self.positions
            .get(path)
            .map(|&idx| self.files[idx].1.as_slice())
    }

    /// Number of files in the diff, including those with no added lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total number of added lines across all files.
    #[must_use]
    pub fn added_line_count(&self) -> usize {
        self.files.iter().map(|(_, l)| l.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Diff parsing
// ---------------------------------------------------------------------------

/// One file section of a unified diff.
#[derive(Debug, Default)]
struct FileDiff {
    /// New-side path; `None` for deleted files.
    to: Option<String>,
    /// Set once a `+++` header has been seen for this section.
    saw_new_header: bool,
    saw_hunk: bool,
    added: Vec<u32>,
}

/// Remaining line budget of the hunk being read.
#[derive(Debug, Clone, Copy)]
struct Hunk {
    old_remaining: u32,
    new_remaining: u32,
    new_line: u32,
}

impl Hunk {
    fn is_open(&self) -> bool {
        self.old_remaining > 0 || self.new_remaining > 0
    }
}

/// Parse a unified diff (e.g., `git diff`) and index the added line numbers
/// (in the new file) of every file that still exists after the change.
///
/// Malformed input never fails: whatever structure can be recognised is
/// returned, which for garbage is an empty index.
pub fn index_added_lines(diff_text: &str) -> AddedLineIndex {
    let files = parse_files(diff_text);
    tracing::trace!(files = files.len(), "parsed diff");

    let mut index = AddedLineIndex::default();
    for file in files {
        // Deleted files cannot have added lines.
        let Some(to) = file.to else { continue };
        tracing::trace!(path = %to, added = file.added.len(), "indexed file");
        index.extend(&to, file.added);
    }
    index
}

fn parse_files(diff_text: &str) -> Vec<FileDiff> {
    let mut files: Vec<FileDiff> = Vec::new();
    let mut hunk: Option<Hunk> = None;

    for line in diff_text.lines() {
        if let Some(h) = hunk.as_mut().filter(|h| h.is_open()) {
            if let Some(file) = files.last_mut() {
                if consume_hunk_line(line, h, file) {
                    continue;
                }
            }
            // Not a hunk line: the hunk was truncated, treat this as a header.
            hunk = None;
        }

        if line.starts_with('\\') {
            // "\ No newline at end of file" — diff metadata, not a real line
        } else if let Some(rest) = line.strip_prefix("diff --git ") {
            files.push(FileDiff {
                to: git_header_new_path(rest),
                ..FileDiff::default()
            });
            hunk = None;
        } else if line.starts_with("deleted file mode") {
            if let Some(file) = files.last_mut() {
                file.to = None;
            }
        } else if line.starts_with("--- ") {
            // Plain unified diffs have no "diff --git" line; a "---" header
            // after a completed section starts the next file.
            let starts_new = files
                .last()
                .is_none_or(|f| f.saw_new_header || f.saw_hunk);
            if starts_new {
                files.push(FileDiff::default());
            }
            hunk = None;
        } else if let Some(rest) = line.strip_prefix("+++ ") {
            if files.last().is_none_or(|f| f.saw_new_header) {
                files.push(FileDiff::default());
            }
            if let Some(file) = files.last_mut() {
                file.to = header_path(rest);
                file.saw_new_header = true;
            }
            hunk = None;
        } else if line.starts_with("@@ ") {
            // Hunk header: @@ -old_start[,old_count] +new_start[,new_count] @@
            if let (Some(file), Some(h)) = (files.last_mut(), parse_hunk_header(line)) {
                file.saw_hunk = true;
                hunk = Some(h);
            }
        }
    }

    files
}

/// Classify one line inside an open hunk. Returns `false` when the line
/// cannot belong to a hunk.
fn consume_hunk_line(line: &str, hunk: &mut Hunk, file: &mut FileDiff) -> bool {
    match line.as_bytes().first() {
        Some(b'+') => {
            file.added.push(hunk.new_line);
            hunk.new_line = hunk.new_line.saturating_add(1);
            hunk.new_remaining = hunk.new_remaining.saturating_sub(1);
        }
        Some(b'-') => {
            hunk.old_remaining = hunk.old_remaining.saturating_sub(1);
        }
        // Some tools strip the leading space of blank context lines.
        Some(b' ') | None => {
            hunk.new_line = hunk.new_line.saturating_add(1);
            hunk.old_remaining = hunk.old_remaining.saturating_sub(1);
            hunk.new_remaining = hunk.new_remaining.saturating_sub(1);
        }
        Some(b'\\') => {}
        Some(_) => return false,
    }
    true
}

/// Parse a hunk header like "@@ -10,5 +20,8 @@". Omitted counts are 1.
fn parse_hunk_header(line: &str) -> Option<Hunk> {
    let caps = HUNK_RE.captures(line)?;
    let count = |i: usize| -> Option<u32> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(1),
        }
    };
    Some(Hunk {
        old_remaining: count(2)?,
        new_remaining: count(4)?,
        new_line: caps.get(3)?.as_str().parse().ok()?,
    })
}

/// New-side path from the remainder of a `diff --git a/X b/Y` line.
///
/// Only a guess until the `+++` header confirms it; files without hunks
/// (renames, mode changes, binaries) never get one.
fn git_header_new_path(rest: &str) -> Option<String> {
    let (_, new) = rest.rsplit_once(" b/")?;
    Some(new.to_string())
}

/// Path from a `---`/`+++` header, or `None` for `/dev/null`.
fn header_path(rest: &str) -> Option<String> {
    // Some tools append a tab and a timestamp after the path.
    let rest = rest.split('\t').next().unwrap_or(rest).trim_end();
    if rest == "/dev/null" {
        return None;
    }
    // Strip common VCS prefixes: "b/" (default git), "a/" (some tools).
    // Also handles --no-prefix diffs where no prefix is present.
    let path = rest
        .strip_prefix("b/")
        .or_else(|| rest.strip_prefix("a/"))
        .unwrap_or(rest);
    Some(path.to_string())
}
