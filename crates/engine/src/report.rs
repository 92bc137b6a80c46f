//! Report Aggregator — concatenates completed scanner outputs and asks the
//! AI Adapter for an executive summary.

use chrono::Utc;
use nodes::result::NodeResult;
use nodes::ResultStore;
use serde_json::{json, Value};

use ai::AiAdapter;

/// Build the aggregation text:
/// `"Node <id> (<scanner>) Output:\n<output>\n\n"` over completed scanner
/// results only.
pub fn aggregate(results: &ResultStore) -> String {
    let mut summary = String::new();
    for (id, result) in results {
        if let NodeResult::Scanner(s) = result {
            summary.push_str(&format!("Node {id} ({}) Output:\n{}\n\n", s.scanner, s.output));
        }
    }
    summary
}

/// Derived counters for the executive report: `total_issues` sums every
/// scanner's `vulnerabilitiesFound`/`leakedSecrets`, `critical_issues`
/// counts failed nodes, and `security_grade` buckets the total onto an
/// A-F scale.
struct ReportCounters {
    total_issues: f64,
    critical_issues: usize,
    security_grade: &'static str,
}

fn derive_counters(results: &ResultStore) -> ReportCounters {
    let total_issues: f64 = results
        .values()
        .filter_map(|r| match r {
            NodeResult::Scanner(s) => Some(
                s.data.get("vulnerabilitiesFound").and_then(|v| v.as_f64()).unwrap_or(0.0)
                    + s.data.get("leakedSecrets").and_then(|v| v.as_f64()).unwrap_or(0.0),
            ),
            _ => None,
        })
        .sum();

    let critical_issues = results.values().filter(|r| matches!(r, NodeResult::Failed(_))).count();

    let security_grade = match total_issues {
        t if t <= 0.0 => "A",
        t if t <= 3.0 => "B",
        t if t <= 7.0 => "C",
        t if t <= 15.0 => "D",
        _ => "F",
    };

    ReportCounters { total_issues, critical_issues, security_grade }
}

/// Run the aggregator and AI Adapter, producing the `ai_report` value to
/// store under its distinguished key, or an `ai_report_error` value on
/// failure — neither fails the execution.
pub async fn build_ai_report(ai: &AiAdapter, results: &ResultStore) -> (&'static str, Value) {
    let summary = aggregate(results);

    match ai.generate_security_recommendations(&summary).await {
        Ok(report) => {
            let counters = derive_counters(results);
            (
                "ai_report",
                json!({
                    "ai_report": report,
                    "report_date": Utc::now().to_rfc3339(),
                    "generated_by": "ai-adapter",
                    "security_grade": counters.security_grade,
                    "total_issues": counters.total_issues,
                    "critical_issues": counters.critical_issues,
                }),
            )
        }
        Err(e) => ("ai_report_error", json!({ "ai_report_error": e.to_string() })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use nodes::result::ScannerResult;

    #[test]
    fn aggregates_only_scanner_results() {
        let mut results: ResultStore = IndexMap::new();
        results.insert(
            "n".into(),
            NodeResult::Scanner(ScannerResult {
                scanner: "nmap".into(),
                target: "example.com".into(),
                output: "22/tcp open ssh".into(),
                data: json!({}),
            }),
        );
        results.insert("d".into(), NodeResult::Skipped(nodes::result::SkippedResult { reason: "x".into() }));

        let summary = aggregate(&results);
        assert!(summary.contains("Node n (nmap) Output:"));
        assert!(summary.contains("22/tcp open ssh"));
        assert!(!summary.contains("Node d"));
    }

    #[test]
    fn derives_counters_from_scanner_and_failed_results() {
        let mut results: ResultStore = IndexMap::new();
        results.insert(
            "n".into(),
            NodeResult::Scanner(ScannerResult {
                scanner: "nmap".into(),
                target: "example.com".into(),
                output: String::new(),
                data: json!({"vulnerabilitiesFound": 4.0, "leakedSecrets": 1.0}),
            }),
        );
        results.insert(
            "f".into(),
            NodeResult::Failed(nodes::result::FailedResult {
                node_type: "nikto".into(),
                error: "boom".into(),
                target: None,
            }),
        );

        let counters = derive_counters(&results);
        assert_eq!(counters.total_issues, 5.0);
        assert_eq!(counters.critical_issues, 1);
        assert_eq!(counters.security_grade, "C");
    }

    #[tokio::test]
    async fn no_provider_configured_produces_ai_report_error() {
        let ai = AiAdapter::new(vec![]);
        let results: ResultStore = IndexMap::new();
        let (key, value) = build_ai_report(&ai, &results).await;
        assert_eq!(key, "ai_report_error");
        assert!(value.get("ai_report_error").is_some());
    }
}
