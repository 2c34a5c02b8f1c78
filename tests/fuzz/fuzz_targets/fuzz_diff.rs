#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Diff indexing must not panic on any input, and line numbers stay
    // unique per file.
    if let Ok(s) = std::str::from_utf8(data) {
        let index = patchcov::diff::index_added_lines(s);
        for (_, lines) in index.iter() {
            let mut sorted = lines.to_vec();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), lines.len());
        }
    }
});
