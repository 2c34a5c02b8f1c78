//! Output formatting for threshold results.

use std::fmt::Write;

use crate::model::{ThresholdResult, ThresholdType};

/// Trait for formatting threshold results.
pub trait ReportFormatter {
    /// Format the results to a string. No results formats to an empty string.
    fn format(&self, results: &[ThresholdResult]) -> String;
}

/// Plain text formatter, one line per result.
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn format(&self, results: &[ThresholdResult]) -> String {
        let mut out = String::new();
        for result in results {
            writeln!(out, "{}", format_result(result)).unwrap();
        }
        out
    }
}

/// Markdown formatter.
pub struct MarkdownFormatter;

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, results: &[ThresholdResult]) -> String {
        let mut md = String::new();
        if results.is_empty() {
            return md;
        }

        md.push_str("### Coverage threshold failures\n\n");
        md.push_str("| File | Check | Expected | Received |\n");
        md.push_str("|:-----|:------|---------:|---------:|\n");
        for r in results {
            let path = &r.path;
            let check = if r.is_changed_lines_threshold {
                "changed lines".to_string()
            } else {
                r.kind.to_string()
            };
            let (expected, received) = if r.expected < 0.0 {
                (format_number(r.expected.abs()), format_number(r.received))
            } else {
                (
                    format!("{}%", format_number(r.expected)),
                    format!("{}%", format_number(r.received)),
                )
            };
            writeln!(md, "| `{path}` | {check} | {expected} | {received} |").unwrap();
        }
        md
    }
}

/// JSON formatter: the result list as an array.
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, results: &[ThresholdResult]) -> String {
        let mut out = serde_json::to_string_pretty(results).unwrap_or_else(|_| "[]".to_string());
        out.push('\n');
        out
    }
}

/// Render one result as a sentence.
///
/// A negative `expected` on a whole-file result is a maximum count of
/// uncovered items rather than a percentage.
#[must_use]
pub fn format_result(result: &ThresholdResult) -> String {
    let path = &result.path;
    let expected = format_number(result.expected.abs());
    let received = format_number(result.received);

    if result.is_changed_lines_threshold {
        return format!(
            "Coverage for changed lines not met for {path}: expected >={expected}% but got {received}% (only considering new/modified lines)"
        );
    }

    let label = type_label(result.kind);
    if result.expected < 0.0 {
        let ltype = label.to_lowercase();
        format!("{label} coverage not met for {path}: expected <={expected} uncovered {ltype} but got {received}")
    } else {
        format!("{label} coverage not met for {path}: expected >={expected}% but got {received}%")
    }
}

fn type_label(kind: ThresholdType) -> &'static str {
    match kind {
        ThresholdType::Statements => "Statements",
        ThresholdType::Functions => "Functions",
        ThresholdType::Branches => "Branches",
        ThresholdType::Lines => "Lines",
    }
}

/// At most two decimals, without trailing zeros ("50", "33.33", "12.5").
#[must_use]
pub fn format_number(value: f64) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}
