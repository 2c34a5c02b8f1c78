pub mod istanbul;

use crate::error::Result;
use crate::model::CoverageReport;

/// Every coverage report parser implements this trait.
pub trait Parser {
    /// Parse the input bytes into a coverage report.
    fn parse(&self, input: &[u8]) -> Result<CoverageReport>;
}
