//! Output of a run: the id mapping handed to whatever rewrites markup, and
//! text summaries for the person reviewing it.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::audit::AuditReport;
use crate::model::MatchOutcome;

/// `{ artifact id: node id }` with keys sorted
pub fn mapping_value(outcome: &MatchOutcome) -> Value {
    let sorted: BTreeMap<&str, &str> = outcome
        .mapping
        .iter()
        .map(|m| (m.artifact.id.as_str(), m.node.id.as_str()))
        .collect();
    let map: Map<String, Value> = sorted
        .into_iter()
        .map(|(artifact, node)| (artifact.to_string(), Value::String(node.to_string())))
        .collect();
    Value::Object(map)
}

/// [`mapping_value`] as pretty-printed JSON
pub fn mapping_json(outcome: &MatchOutcome) -> String {
    format!("{:#}", mapping_value(outcome))
}

/// One line per match, then the unmatched artifacts
pub fn summary(outcome: &MatchOutcome) -> String {
    let total = outcome.mapping.len() + outcome.unmatched.len();
    let mut out = String::new();
    out.push_str(&format!("matched {} of {} artifacts\n", outcome.mapping.len(), total));
    for m in &outcome.mapping {
        out.push_str(&format!(
            "  {} -> {} (distance {:.1})\n",
            m.artifact.id, m.node.id, m.distance
        ));
    }
    if !outcome.unmatched.is_empty() {
        out.push_str(&format!("unmatched {}:\n", outcome.unmatched.len()));
        for a in &outcome.unmatched {
            out.push_str(&format!("  {} at ({:.1}, {:.1})\n", a.id, a.point.x, a.point.y));
        }
    }
    out
}

/// Findings of an audit, grouped by kind
pub fn audit_summary(report: &AuditReport) -> String {
    if report.is_clean() {
        return "no findings\n".to_string();
    }

    let mut out = String::new();
    if !report.ambiguous.is_empty() {
        out.push_str(&format!("ambiguous node pairs: {}\n", report.ambiguous.len()));
        for pair in &report.ambiguous {
            out.push_str(&format!(
                "  [{}] {} ~ {} (distance {:.1})\n",
                pair.partition, pair.first, pair.second, pair.distance
            ));
        }
    }
    if !report.contested.is_empty() {
        out.push_str(&format!("contested nodes: {}\n", report.contested.len()));
        for node in &report.contested {
            out.push_str(&format!("  {} <- {}\n", node.node, node.artifacts.join(", ")));
        }
    }
    if !report.mismatches.is_empty() {
        out.push_str(&format!("label mismatches: {}\n", report.mismatches.len()));
        for m in &report.mismatches {
            out.push_str(&format!(
                "  {} labelled {} matched {} (distance {:.1})\n",
                m.artifact, m.expected, m.matched, m.distance
            ));
        }
    }
    out
}
