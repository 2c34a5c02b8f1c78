use patchcov::model::CoverageReport;
use patchcov::parsers::istanbul;

/// The shared Istanbul fixture: `src/example.ts` (statements on lines
/// 1, 2, 3, 5 hit 1, 1, 0, 0 times) and a `data`-wrapped `src/wrapped.ts`.
pub fn sample_report() -> CoverageReport {
    istanbul::parse(include_bytes!("../fixtures/coverage/coverage-final.json")).unwrap()
}
