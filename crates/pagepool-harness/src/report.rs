//! Report generation for conformance runs.

use serde::{Deserialize, Serialize};

use crate::verify::CheckSummary;

/// A conformance report for one harness run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// Report title.
    pub title: String,
    /// Campaign the run belongs to.
    pub campaign: String,
    /// Check summary.
    pub summary: CheckSummary,
}

impl ConformanceReport {
    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("- Campaign: {}\n", self.campaign));
        out.push_str(&format!("- Total: {}\n", self.summary.total));
        out.push_str(&format!("- Passed: {}\n", self.summary.passed));
        out.push_str(&format!("- Failed: {}\n\n", self.summary.failed));

        out.push_str("| Check | Clause | Status |\n");
        out.push_str("|-------|--------|--------|\n");
        for r in &self.summary.results {
            let status = if r.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!("| {} | {} | {} |\n", r.name, r.clause, status));
        }

        let failures: Vec<_> = self.summary.results.iter().filter(|r| !r.passed).collect();
        if !failures.is_empty() {
            out.push_str("\n## Failures\n\n");
            for r in failures {
                let detail = r.detail.as_deref().unwrap_or("(no detail)");
                out.push_str(&format!("- {}: {}\n", r.name, detail));
            }
        }
        out
    }

    /// Render the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::CheckResult;

    fn sample_report() -> ConformanceReport {
        ConformanceReport {
            title: "pagepool conformance".into(),
            campaign: "unit".into(),
            summary: CheckSummary::from_results(vec![
                CheckResult {
                    name: "growth_trigger".into(),
                    clause: "page growth".into(),
                    passed: true,
                    detail: None,
                },
                CheckResult {
                    name: "fallback_boundary".into(),
                    clause: "general-heap fallback".into(),
                    passed: false,
                    detail: Some("boundary request left the pools".into()),
                },
            ]),
        }
    }

    #[test]
    fn test_markdown_contains_counts_and_rows() {
        let md = sample_report().to_markdown();
        assert!(md.contains("- Total: 2"));
        assert!(md.contains("- Failed: 1"));
        assert!(md.contains("| growth_trigger | page growth | PASS |"));
        assert!(md.contains("| fallback_boundary | general-heap fallback | FAIL |"));
        assert!(md.contains("boundary request left the pools"));
    }

    #[test]
    fn test_json_round_trip() {
        let report = sample_report();
        let json = report.to_json().unwrap();
        let parsed: ConformanceReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.summary.total, 2);
        assert_eq!(parsed.summary.failed, 1);
        assert_eq!(parsed.campaign, "unit");
    }
}
