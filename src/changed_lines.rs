//! Statement coverage restricted to the lines a change added.

use std::collections::HashSet;

use crate::model::{ChangedLinesCoverage, FileCoverageEntry};

/// Count the statements of `entry` whose line range touches any of
/// `changed_lines`, and how many of those ran at least once.
///
/// Each statement is counted at most once, however many of its lines
/// changed. Statement order does not matter.
#[must_use]
pub fn calculate(entry: &FileCoverageEntry, changed_lines: &[u32]) -> ChangedLinesCoverage {
    let changed: HashSet<u32> = changed_lines.iter().copied().collect();
    let mut result = ChangedLinesCoverage::default();

    for stmt in entry.statements() {
        let range = stmt.start_line..=stmt.end_line;
        // Walk whichever side is shorter.
        let touched = if stmt.end_line.saturating_sub(stmt.start_line) as usize >= changed.len() {
            changed.iter().any(|line| range.contains(line))
        } else {
            range.clone().any(|line| changed.contains(&line))
        };
        if touched {
            result.total += 1;
            if stmt.is_covered() {
                result.covered += 1;
            }
        }
    }

    result
}
