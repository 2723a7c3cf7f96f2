//! Finding classification
//!
//! Turns raw sink hits into findings: picks the reporting path, collapses
//! duplicate flows, assigns the severity tier, and applies the suppression
//! list. A sink reached only by fully-neutralized taint never gets here;
//! the dataflow pass already dropped those entries.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::domain::finding::{Finding, PiiOccurrence};
use crate::domain::taint::{FlowEdgeKind, FlowStep, TaintEntry};
use crate::domain::value_objects::{Language, Sensitivity};

use super::dataflow::SinkHit;

/// Classify one file's sink hits into findings.
///
/// When a sink is reached by both sanitized and unsanitized entries, only
/// the unsanitized ones are reported and the finding is not flagged: the
/// dangerous path wins. A finding flagged `sanitized` means every reaching
/// path went through a partially-neutralizing sanitizer.
pub fn classify(language: Language, file: &str, hits: Vec<SinkHit>) -> Vec<Finding> {
    let mut merged: HashMap<String, Finding> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for hit in hits {
        let unsanitized: Vec<&TaintEntry> = hit.entries.iter().filter(|e| !e.sanitized).collect();
        let sanitized_only = unsanitized.is_empty();
        let reported: Vec<&TaintEntry> = if sanitized_only {
            hit.entries.iter().collect()
        } else {
            unsanitized
        };
        if reported.is_empty() {
            continue;
        }

        let mut categories: Vec<String> = reported
            .iter()
            .map(|e| e.label.category.clone())
            .collect();
        categories.sort();
        categories.dedup();

        // Max tier across carried categories decides the finding severity.
        let sensitivity = reported
            .iter()
            .map(|e| e.label.sensitivity)
            .max()
            .unwrap_or(Sensitivity::Medium);

        // Shortest path reads best and is always a real witness.
        let representative = reported
            .iter()
            .min_by_key(|e| e.steps.len())
            .expect("reported is non-empty");
        let mut path = representative.steps.clone();
        path.push(FlowStep {
            kind: FlowEdgeKind::CallArgument,
            expression: hit.callee.clone(),
            location: hit.location.clone(),
        });

        let fingerprint = Finding::fingerprint_of(&hit.rule_id, file, &categories, &hit.code_segment);
        // Identity of a flow: same source, same sink, same categories.
        let dedup_key = format!(
            "{}|{}|{}|{}",
            hit.rule_id,
            representative.label.origin,
            hit.location,
            categories.join(",")
        );

        match merged.get_mut(&dedup_key) {
            Some(existing) => {
                existing.occurrences += 1;
                // An unsanitized duplicate upgrades a sanitized finding.
                if existing.sanitized && !sanitized_only {
                    existing.sanitized = false;
                    existing.path = path;
                }
            }
            None => {
                order.push(dedup_key.clone());
                merged.insert(
                    dedup_key,
                    Finding {
                        rule_id: hit.rule_id.clone(),
                        categories,
                        sensitivity,
                        language,
                        source: representative.label.origin.clone(),
                        sink: hit.location.clone(),
                        source_expression: representative.label.origin_expression.clone(),
                        sink_expression: hit.callee.clone(),
                        path,
                        sanitized: sanitized_only,
                        code_segment: hit.code_segment.clone(),
                        occurrences: 1,
                        fingerprint,
                    },
                );
            }
        }
    }

    let findings: Vec<Finding> = order
        .into_iter()
        .filter_map(|key| merged.remove(&key))
        .collect();
    debug!(file, count = findings.len(), "classified sink hits");
    findings
}

/// Drop findings and occurrences whose fingerprint was accepted in a
/// previous review.
pub fn suppress(
    findings: &mut Vec<Finding>,
    occurrences: &mut Vec<PiiOccurrence>,
    skip_fingerprints: &[String],
) {
    if skip_fingerprints.is_empty() {
        return;
    }
    let skip: HashSet<&str> = skip_fingerprints.iter().map(String::as_str).collect();
    let before = findings.len() + occurrences.len();
    findings.retain(|f| !skip.contains(f.fingerprint.as_str()));
    occurrences.retain(|o| !skip.contains(o.fingerprint.as_str()));
    let dropped = before - findings.len() - occurrences.len();
    if dropped > 0 {
        debug!(dropped, "suppressed previously accepted results");
    }
}
