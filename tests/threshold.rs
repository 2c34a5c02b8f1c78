mod common;

use patchcov::collector::{DataCollector, FailReason};
use patchcov::diff;
use patchcov::model::{ThresholdResult, ThresholdType};
use patchcov::resolve::{MatchStrategy, Resolver};
use patchcov::{check_changed_files_threshold, ChangedLinesCheck};

const EXAMPLE: &str = include_str!("fixtures/diffs/example_added.diff");

/// Lines 2 and 5 added, one of the two statements covered: exactly 50%.
#[test]
fn equal_to_threshold_passes() {
    let report = common::sample_report();
    let collector = DataCollector::new();

    let results = check_changed_files_threshold(&report, 50.0, EXAMPLE, &collector);

    assert!(results.is_empty());
    assert!(collector.is_empty());
}

#[test]
fn below_threshold_reports_file() {
    let report = common::sample_report();
    let collector = DataCollector::new();

    let results = check_changed_files_threshold(&report, 80.0, EXAMPLE, &collector);

    assert_eq!(
        results,
        vec![ThresholdResult {
            path: "src/example.ts".to_string(),
            expected: 80.0,
            received: 50.0,
            kind: ThresholdType::Lines,
            is_changed_lines_threshold: true,
        }]
    );
    assert_eq!(collector.reasons(), vec![FailReason::UnderThreshold]);
}

/// A diff that only removes lines indexes the file with nothing to check.
#[test]
fn context_only_diff_has_nothing_to_check() {
    let diff_text = include_str!("fixtures/diffs/context_only.diff");
    let index = diff::index_added_lines(diff_text);
    assert_eq!(index.get("src/example.ts"), Some(&[] as &[u32]));

    let collector = DataCollector::new();
    let results = check_changed_files_threshold(&common::sample_report(), 100.0, diff_text, &collector);
    assert!(results.is_empty());
    assert!(collector.is_empty());
}

#[test]
fn file_without_coverage_is_skipped() {
    let collector = DataCollector::new();
    let results = check_changed_files_threshold(
        &common::sample_report(),
        100.0,
        include_str!("fixtures/diffs/new_file.diff"),
        &collector,
    );
    assert!(results.is_empty());
    assert!(collector.is_empty());
}

#[test]
fn no_statements_on_changed_lines_is_skipped() {
    // Line 4 of src/example.ts has no statement.
    let diff_text = "\
--- a/src/example.ts
+++ b/src/example.ts
@@ -3,1 +3,2 @@
 export function run() {
+  // comment
";
    let collector = DataCollector::new();
    let results = check_changed_files_threshold(&common::sample_report(), 100.0, diff_text, &collector);
    assert!(results.is_empty());
    assert!(collector.is_empty());
}

/// Two failing files still produce a single collector signal, and results
/// follow diff order rather than report order.
#[test]
fn multiple_files_in_diff_order() {
    let report = common::sample_report();
    let collector = DataCollector::new();
    let diff_text = include_str!("fixtures/diffs/multiple_files.diff");

    let results = check_changed_files_threshold(&report, 75.0, diff_text, &collector);

    let paths: Vec<&str> = results.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["src/wrapped.ts", "src/example.ts"]);
    // The multi-line statement on lines 2-4 counts once: 1 of 2 covered.
    assert_eq!(results[0].received, 50.0);
    assert_eq!(collector.reasons(), vec![FailReason::UnderThreshold]);
}

#[test]
fn repeated_runs_are_identical() {
    let report = common::sample_report();
    let diff_text = include_str!("fixtures/diffs/multiple_files.diff");
    let check = ChangedLinesCheck::new(90.0);

    let first = check.run(&report, diff_text, &DataCollector::new());
    let second = check.run(&report, diff_text, &DataCollector::new());
    let parallel = check.run_parallel(&report, diff_text, &DataCollector::new());

    assert_eq!(first, second);
    assert_eq!(first, parallel);
}

#[test]
fn raising_threshold_never_turns_fail_into_pass() {
    let report = common::sample_report();
    let mut failed = false;
    for threshold in [0.0, 25.0, 49.99, 50.0, 50.01, 75.0, 100.0] {
        let results = check_changed_files_threshold(&report, threshold, EXAMPLE, &DataCollector::new());
        if failed {
            assert!(!results.is_empty(), "threshold {threshold} passed after a lower one failed");
        }
        failed = !results.is_empty();
    }
    assert!(failed);
}

#[test]
fn collector_is_shared_across_checks() {
    let report = common::sample_report();
    let collector = DataCollector::new();

    ChangedLinesCheck::new(80.0).run(&report, EXAMPLE, &collector);
    ChangedLinesCheck::new(90.0).run(&report, EXAMPLE, &collector);

    assert_eq!(
        collector.reasons(),
        vec![FailReason::UnderThreshold, FailReason::UnderThreshold]
    );
}

#[test]
fn ambiguous_paths_are_skipped_in_strict_mode() {
    let report = patchcov::parsers::istanbul::parse(
        br#"{
            "/repo/pkg-a/utils/index.ts": {
                "statementMap": { "0": { "start": { "line": 1 } } }, "s": { "0": 0 }
            },
            "/repo/pkg-b/utils/index.ts": {
                "statementMap": { "0": { "start": { "line": 1 } } }, "s": { "0": 1 }
            }
        }"#,
    )
    .unwrap();
    let diff_text = "\
--- a/utils/index.ts
+++ b/utils/index.ts
@@ -0,0 +1 @@
+export {};
";

    let strict = ChangedLinesCheck::new(100.0);
    assert!(strict.run(&report, diff_text, &DataCollector::new()).is_empty());

    // The first-match fallback picks pkg-a, whose statement never ran.
    let first_match =
        ChangedLinesCheck::new(100.0).with_resolver(Resolver::new(MatchStrategy::FirstMatch));
    let results = first_match.run(&report, diff_text, &DataCollector::new());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].received, 0.0);

    // A project root makes the path exact.
    let rooted = ChangedLinesCheck::new(100.0)
        .with_resolver(Resolver::default().with_project_root("/repo/pkg-b"));
    assert!(rooted.run(&report, diff_text, &DataCollector::new()).is_empty());
}

const UTIL_ADDED: &str = "\
diff --git a/src/util.ts b/src/util.ts
new file mode 100644
--- /dev/null
+++ b/src/util.ts
@@ -0,0 +1,2 @@
+export const a = 1;
+export const b = 2;
";

/// Counts that are not plain integers still count as covered when positive.
#[test]
fn unusual_counts_keep_the_file_in_the_check() {
    for count in ["1.0", "1e3", "18446744073709551616", "7.5"] {
        let json = format!(
            r#"{{
                "/repo/src/util.ts": {{
                    "statementMap": {{
                        "0": {{ "start": {{ "line": 1 }} }},
                        "1": {{ "start": {{ "line": 2 }} }}
                    }},
                    "s": {{ "0": 0, "1": {count} }}
                }}
            }}"#
        );
        let report = patchcov::parsers::istanbul::parse(json.as_bytes()).unwrap();
        assert_eq!(report.len(), 1, "count {count}");

        let collector = DataCollector::new();
        let results = check_changed_files_threshold(&report, 100.0, UTIL_ADDED, &collector);
        assert_eq!(
            results,
            vec![ThresholdResult::changed_lines("src/util.ts", 100.0, 50.0)],
            "count {count}"
        );
        assert_eq!(collector.reasons(), vec![FailReason::UnderThreshold]);
    }
}

/// A null count reads as 0; the file is still checked.
#[test]
fn null_count_is_uncovered() {
    let report = patchcov::parsers::istanbul::parse(
        br#"{
            "/repo/src/util.ts": {
                "statementMap": {
                    "0": { "start": { "line": 1 } },
                    "1": { "start": { "line": 2 } }
                },
                "s": { "0": 1, "1": null }
            }
        }"#,
    )
    .unwrap();

    let results = check_changed_files_threshold(&report, 100.0, UTIL_ADDED, &DataCollector::new());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].received, 50.0);
}

/// `src/util.ts` is a new file; `src/util.tsx` must not stand in for it.
#[test]
fn new_file_does_not_borrow_a_longer_file_name() {
    let report = patchcov::parsers::istanbul::parse(
        br#"{
            "/repo/src/util.tsx": {
                "statementMap": { "0": { "start": { "line": 1 } } }, "s": { "0": 0 }
            }
        }"#,
    )
    .unwrap();
    let collector = DataCollector::new();

    let results = check_changed_files_threshold(&report, 80.0, UTIL_ADDED, &collector);

    assert!(results.is_empty());
    assert!(collector.is_empty());
}
