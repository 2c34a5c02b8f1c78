//! Shared sink for the reasons a run should fail.
//!
//! Several independent checks report into one collector; whoever owns it
//! turns the collected reasons into a pass/fail decision.

use std::fmt;
use std::sync::Mutex;

/// Why a check asks for the run to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FailReason {
    UnderThreshold,
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailReason::UnderThreshold => f.write_str("coverage is under threshold"),
        }
    }
}

/// Append-only capability handed to checks. Implementations must tolerate
/// concurrent callers.
pub trait FailReasonCollector: Sync {
    fn add(&self, reason: FailReason);
}

/// In-memory collector, safe to share between threads.
#[derive(Debug, Default)]
pub struct DataCollector {
    reasons: Mutex<Vec<FailReason>>,
}

impl DataCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every reason recorded so far, in recording order.
    pub fn reasons(&self) -> Vec<FailReason> {
        self.reasons
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn is_empty(&self) -> bool {
        self.reasons().is_empty()
    }
}

impl FailReasonCollector for DataCollector {
    fn add(&self, reason: FailReason) {
        match self.reasons.lock() {
            Ok(mut reasons) => reasons.push(reason),
            Err(poisoned) => poisoned.into_inner().push(reason),
        }
    }
}
