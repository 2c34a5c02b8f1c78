//! Parser for Istanbul / NYC `coverage-final.json` format.
//!
//! Reference: https://github.com/istanbuljs/istanbuljs
//!
//! The format is a JSON object keyed by file path. Each value contains:
//!   - `statementMap`: `{ "0": { "start": { "line": 1, "column": 0 }, "end": { "line": 1, "column": 30 } }, ... }`
//!   - `s`:            `{ "0": 5, "1": 0, ... }` — hit counts per statement
//!
//! Some producers (e.g. a serialized `CoverageMap`) nest each value under a
//! `data` key instead; both shapes are accepted. Branch and function data
//! are not read.

use serde::de::{MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;

use super::Parser;
use crate::error::Result;
use crate::model::{CoverageEntry, CoverageReport};

/// Istanbul / NYC JSON parser.
pub struct IstanbulParser;

impl Parser for IstanbulParser {
    fn parse(&self, input: &[u8]) -> Result<CoverageReport> {
        parse(input)
    }
}

/// Parse Istanbul JSON from raw bytes.
///
/// Files keep the order their keys have in the document. Entries that are
/// not statement coverage are skipped.
pub fn parse(input: &[u8]) -> Result<CoverageReport> {
    if input.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(CoverageReport::new());
    }

    let mut deser = serde_json::Deserializer::from_slice(input);
    let report = serde::Deserializer::deserialize_map(&mut deser, ReportVisitor)?;
    deser.end()?;
    Ok(report)
}

/// Serde visitor that walks the top-level `{ path: entry }` map key by key,
/// so the report keeps document order rather than sorted order.
struct ReportVisitor;

impl<'de> Visitor<'de> for ReportVisitor {
    type Value = CoverageReport;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("an Istanbul JSON object")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<CoverageReport, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut report = CoverageReport::new();
        while let Some(file_path) = map.next_key::<String>()? {
            let value: Value = map.next_value()?;
            match CoverageEntry::deserialize(value) {
                Ok(entry) => report.insert(file_path, entry),
                Err(e) => {
                    tracing::warn!(path = %file_path, error = %e, "skipping unrecognised coverage entry");
                }
            }
        }
        Ok(report)
    }
}
