#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Report parsing may fail, but never panic; parsed reports must
    // survive a full changed-lines check.
    if let Ok(report) = patchcov::parsers::istanbul::parse(data) {
        let collector = patchcov::DataCollector::new();
        let diff_text = "--- a/x\n+++ b/x\n@@ -0,0 +1,3 @@\n+a\n+b\n+c\n";
        let _ = patchcov::check_changed_files_threshold(&report, 50.0, diff_text, &collector);
    }
});
