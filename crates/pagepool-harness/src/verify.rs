//! Check outcomes and aggregation.

use serde::{Deserialize, Serialize};

/// Result of one conformance check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Check identifier.
    pub name: String,
    /// Contract clause the check covers.
    pub clause: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Failure detail, absent on success.
    pub detail: Option<String>,
}

/// Aggregate summary of a harness run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSummary {
    /// Total checks run.
    pub total: usize,
    /// Checks passed.
    pub passed: usize,
    /// Checks failed.
    pub failed: usize,
    /// Individual results.
    pub results: Vec<CheckResult>,
}

impl CheckSummary {
    /// Build a summary from a list of results.
    #[must_use]
    pub fn from_results(results: Vec<CheckResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let failed = total - passed;
        Self {
            total,
            passed,
            failed,
            results,
        }
    }

    /// Returns true if every check passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}
