//! Taint dataflow
//!
//! Two cooperating passes over the normalized syntax graphs:
//!
//! 1. [`summarize`] computes per-function taint summaries bottom-up until
//!    they stabilize or the configured call depth is exhausted.
//! 2. [`FileAnalyzer`] replays each file against the converged summaries,
//!    seeding taint at source matches and recording raw sink hits for the
//!    classifier.
//!
//! Both passes share one abstract interpreter over [`NodeKind`] shapes, so
//! summary semantics and analysis semantics cannot drift apart.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::finding::Location;
use crate::domain::symbol::GlobalSymbolId;
use crate::domain::taint::{TaintEntry, TaintLabel};

mod intra;
mod summary;

pub use intra::{FileAnalysis, FileAnalyzer, SinkHit};
pub use summary::{summarize, FileUnit, SummaryOutcome};

/// A sink call inside a function body (or one of its callees) that argument
/// taint can reach. Reported at the sink's own location, not the call site,
/// so N callers of the same leaky function converge on one finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSink {
    /// Parameter positions whose taint reaches the sink.
    pub params: BTreeSet<usize>,
    pub rule_id: String,
    /// Sink call site inside the callee.
    pub location: Location,
    /// Callee path at the sink call site, as written.
    pub callee: String,
    pub code_segment: String,
}

/// What a call to a function does with taint, observable from outside.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSummary {
    /// Parameter positions whose taint reaches the return value.
    pub params_to_return: BTreeSet<usize>,
    /// Labels the function's return value carries regardless of arguments
    /// (internal sources flowing out).
    pub return_labels: Vec<TaintLabel>,
    /// Sinks inside the function reachable from its parameters.
    pub param_sinks: Vec<ParamSink>,
}

impl FunctionSummary {
    pub fn is_empty(&self) -> bool {
        self.params_to_return.is_empty()
            && self.return_labels.is_empty()
            && self.param_sinks.is_empty()
    }
}

/// Converged summaries for every resolved function in the scan.
pub type SummaryMap = HashMap<GlobalSymbolId, FunctionSummary>;

/// Synthetic category used while summarizing to trace a parameter through a
/// function body. Never escapes into findings.
pub(crate) fn param_marker(index: usize) -> String {
    format!("__param{index}")
}

pub(crate) fn parse_param_marker(category: &str) -> Option<usize> {
    category.strip_prefix("__param")?.parse().ok()
}

pub(crate) fn is_synthetic(entry: &TaintEntry) -> bool {
    entry.label.category.starts_with("__param")
}
