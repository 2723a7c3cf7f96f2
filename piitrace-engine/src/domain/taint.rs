//! Taint labels and flow edges

use serde::{Deserialize, Serialize};

use super::finding::Location;
use super::value_objects::Sensitivity;

/// Marker that a value derives from a PII source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaintLabel {
    /// PII category, e.g. `ssn`, `email`.
    pub category: String,
    pub sensitivity: Sensitivity,
    /// Rule that recognized the source.
    pub rule_id: String,
    /// Where the label was attached.
    pub origin: Location,
    /// Originating symbol or literal text.
    pub origin_expression: String,
}

/// Kind of a directed flow relation between two flow-graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlowEdgeKind {
    Assignment,
    ParameterPass,
    Return,
    FieldStore,
    FieldLoad,
    CallArgument,
}

/// One hop of a reconstructed propagation path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowStep {
    pub kind: FlowEdgeKind,
    /// Expression text at this step (assignment target, argument, ...).
    pub expression: String,
    pub location: Location,
}

/// A label travelling along one concrete path.
///
/// Entries are path-scoped: the same value can hold both a sanitized and an
/// unsanitized entry for one category when control flow splits around a
/// sanitizer. Labels only accumulate along [`FlowStep`]s; nothing propagates
/// backward.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaintEntry {
    pub label: TaintLabel,
    pub steps: Vec<FlowStep>,
    /// A sanitizer matched on this path but was not fully neutralizing for
    /// the category; kept for review instead of silently dropped.
    pub sanitized: bool,
}

impl TaintEntry {
    pub fn new(label: TaintLabel) -> Self {
        Self {
            label,
            steps: Vec::new(),
            sanitized: false,
        }
    }

    /// Append a step, bounding path length so pathological chains cannot
    /// balloon memory. The source and sink endpoints stay precise; only the
    /// middle of very long paths is elided.
    pub fn with_step(mut self, step: FlowStep) -> Self {
        const MAX_STEPS: usize = 32;
        if self.steps.len() < MAX_STEPS {
            self.steps.push(step);
        } else {
            *self.steps.last_mut().expect("steps is non-empty at cap") = step;
        }
        self
    }
}
