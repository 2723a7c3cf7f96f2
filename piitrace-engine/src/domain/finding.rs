//! Findings, occurrences, and scan diagnostics

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::taint::FlowStep;
use super::value_objects::{Language, Sensitivity};

/// A position in a scanned file, 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        let file = file.into();
        Self {
            file,
            line,
            column,
            end_line: line,
            end_column: column,
        }
    }

    pub fn with_end(mut self, end_line: usize, end_column: usize) -> Self {
        self.end_line = end_line;
        self.end_column = end_column;
        self
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A PII identifier occurrence, reported independently of whether the value
/// ever reaches a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiiOccurrence {
    pub rule_id: String,
    pub category: String,
    pub sensitivity: Sensitivity,
    pub language: Language,
    pub location: Location,
    /// Matched identifier as written.
    pub expression: String,
    /// Trimmed source line.
    pub code_segment: String,
    /// Stable identity for suppression lists.
    pub fingerprint: String,
}

impl PiiOccurrence {
    /// Fingerprint from fields stable across line-number churn.
    pub fn fingerprint_of(rule_id: &str, file: &str, expression: &str, code_segment: &str) -> String {
        hex_digest(&[rule_id, file, expression, code_segment])
    }
}

/// A detected flow from a PII source to an unsafe sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Sink rule that matched.
    pub rule_id: String,
    /// PII categories carried by the value at the sink.
    pub categories: Vec<String>,
    /// Maximum tier across carried categories.
    pub sensitivity: Sensitivity,
    pub language: Language,
    pub source: Location,
    pub sink: Location,
    /// Expression that originated the taint.
    pub source_expression: String,
    /// Sink call path as written.
    pub sink_expression: String,
    /// Representative propagation path, source to sink. When both sanitized
    /// and unsanitized paths reach the sink, this is the unsanitized one.
    pub path: Vec<FlowStep>,
    /// A sanitizer was observed on every reaching path but judged
    /// insufficient for the category; kept for review.
    pub sanitized: bool,
    /// Trimmed source line at the sink.
    pub code_segment: String,
    /// Number of merged duplicate flows.
    pub occurrences: usize,
    /// Stable identity for suppression lists and deduplication.
    pub fingerprint: String,
}

impl Finding {
    pub fn fingerprint_of(rule_id: &str, file: &str, categories: &[String], code_segment: &str) -> String {
        let joined = categories.join(",");
        hex_digest(&[rule_id, file, &joined, code_segment])
    }
}

fn hex_digest(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update(b"|");
        }
        hasher.update(part.as_bytes());
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Why a file or scan unit was skipped or truncated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum Diagnostic {
    /// File could not be parsed; analysis continued without it.
    ParseSkipped { file: String, detail: String },
    /// File could not be read.
    ReadSkipped { file: String, detail: String },
    /// Interprocedural propagation truncated at the configured depth.
    CallDepthExceeded { function: String, depth: usize },
    /// The file/time budget stopped the scan before this unit.
    BudgetSkipped { file: String },
}

/// Per-language file and line counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    pub file_count: usize,
    pub line_count: usize,
}

/// Aggregate statistics over the scanned tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    pub per_language: BTreeMap<Language, FileStats>,
    pub total: FileStats,
}

impl ScanStats {
    pub fn record(&mut self, language: Language, lines: usize) {
        let entry = self.per_language.entry(language).or_default();
        entry.file_count += 1;
        entry.line_count += lines;
        self.total.file_count += 1;
        self.total.line_count += lines;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprints_are_stable_and_distinct() {
        let a = Finding::fingerprint_of("sink.log", "a.py", &["ssn".to_string()], "log(ssn)");
        let b = Finding::fingerprint_of("sink.log", "a.py", &["ssn".to_string()], "log(ssn)");
        let c = Finding::fingerprint_of("sink.log", "b.py", &["ssn".to_string()], "log(ssn)");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn stats_accumulate_per_language() {
        let mut stats = ScanStats::default();
        stats.record(Language::Python, 10);
        stats.record(Language::Python, 5);
        stats.record(Language::Ruby, 7);
        assert_eq!(stats.per_language[&Language::Python].file_count, 2);
        assert_eq!(stats.per_language[&Language::Python].line_count, 15);
        assert_eq!(stats.total.file_count, 3);
        assert_eq!(stats.total.line_count, 22);
    }
}
