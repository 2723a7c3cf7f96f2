//! Deterministic aggregation
//!
//! Merges per-worker result lists into one stable report. Two scans of the
//! same tree with the same rules must produce byte-identical output
//! regardless of worker count or scheduling, so everything is sorted by
//! source position and findings with the same fingerprint collapse in a
//! fixed order.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::finding::{Diagnostic, Finding, PiiOccurrence};

/// Sort findings by sink position, then rule, then categories.
pub fn aggregate_findings(mut findings: Vec<Finding>) -> Vec<Finding> {
    findings.sort_by(|a, b| {
        (&a.sink, &a.rule_id, &a.categories).cmp(&(&b.sink, &b.rule_id, &b.categories))
    });

    // Cross-worker duplicates (same fingerprint, same source and sink)
    // collapse; counts accumulate.
    let mut merged: Vec<Finding> = Vec::with_capacity(findings.len());
    let mut index: HashMap<(String, String, String), usize> = HashMap::new();
    for finding in findings {
        let key = (
            finding.fingerprint.clone(),
            finding.source.to_string(),
            finding.sink.to_string(),
        );
        match index.get(&key) {
            Some(&at) => {
                merged[at].occurrences += finding.occurrences;
                if merged[at].sanitized && !finding.sanitized {
                    merged[at].sanitized = false;
                    merged[at].path = finding.path;
                }
            }
            None => {
                index.insert(key, merged.len());
                merged.push(finding);
            }
        }
    }
    debug!(count = merged.len(), "aggregated findings");
    merged
}

/// Sort occurrences by position, then rule; duplicates collapse.
pub fn aggregate_occurrences(mut occurrences: Vec<PiiOccurrence>) -> Vec<PiiOccurrence> {
    occurrences.sort_by(|a, b| (&a.location, &a.rule_id).cmp(&(&b.location, &b.rule_id)));
    occurrences.dedup_by(|a, b| a.fingerprint == b.fingerprint && a.location == b.location);
    occurrences
}

/// Diagnostics sort by their rendered identity so reruns agree.
pub fn aggregate_diagnostics(mut diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    diagnostics.sort_by_key(diagnostic_key);
    diagnostics.dedup();
    diagnostics
}

fn diagnostic_key(d: &Diagnostic) -> (u8, String, usize) {
    match d {
        Diagnostic::ReadSkipped { file, .. } => (0, file.clone(), 0),
        Diagnostic::ParseSkipped { file, .. } => (1, file.clone(), 0),
        Diagnostic::BudgetSkipped { file } => (2, file.clone(), 0),
        Diagnostic::CallDepthExceeded { function, depth } => (3, function.clone(), *depth),
    }
}
