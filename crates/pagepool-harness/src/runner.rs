//! Check execution engine.

use crate::scenarios;
use crate::verify::{CheckResult, CheckSummary};

/// Runs the conformance checks and aggregates their results.
pub struct ScenarioRunner {
    /// Name of the test campaign, recorded in reports.
    pub campaign: String,
}

impl ScenarioRunner {
    /// Create a new runner.
    #[must_use]
    pub fn new(campaign: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
        }
    }

    /// Run every registered check and return results in execution order.
    #[must_use]
    pub fn run(&self) -> CheckSummary {
        let results: Vec<CheckResult> = scenarios::all_checks()
            .into_iter()
            .map(|check| {
                let detail = (check.run)();
                CheckResult {
                    name: check.name.to_string(),
                    clause: check.clause.to_string(),
                    passed: detail.is_none(),
                    detail,
                }
            })
            .collect();
        CheckSummary::from_results(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_executes_every_check() {
        let runner = ScenarioRunner::new("unit");
        let summary = runner.run();
        assert_eq!(summary.total, scenarios::all_checks().len());
        assert!(summary.all_passed(), "failures: {:?}", summary.results);
    }
}
