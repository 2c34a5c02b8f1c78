//! Coverage thresholds restricted to the lines a change adds.
//!
//! The pipeline indexes added lines from a unified diff ([`diff`]), finds
//! each file's Istanbul coverage entry ([`resolve`]), counts the statements
//! overlapping those lines ([`changed_lines`]) and reports files below the
//! threshold ([`threshold`]).

pub mod changed_lines;
pub mod cli;
pub mod collector;
pub mod diff;
pub mod error;
pub mod model;
pub mod parsers;
pub mod report;
pub mod resolve;
pub mod threshold;

pub use collector::{DataCollector, FailReason, FailReasonCollector};
pub use error::{PatchcovError, Result};
pub use threshold::{check_changed_files_threshold, ChangedLinesCheck};
