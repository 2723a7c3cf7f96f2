//! Intraprocedural abstract interpreter
//!
//! Walks one file's syntax graph with a flow state mapping symbols (and
//! symbol fields) to the taint entries they currently hold. Branches fork
//! the state and merge by union, so one value can simultaneously carry a
//! sanitized and an unsanitized entry for the same category. Loops get one
//! extra pass so taint introduced in an iteration reaches uses earlier in
//! the body.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{instrument, trace};

use crate::domain::finding::{Location, PiiOccurrence};
use crate::domain::rule::Rule;
use crate::domain::symbol::{GlobalSymbolId, SymbolId, SymbolKind};
use crate::domain::syntax::{NodeId, NodeKind, SourceFile, Span, SyntaxGraph};
use crate::domain::taint::{FlowEdgeKind, FlowStep, TaintEntry, TaintLabel};

use crate::infrastructure::catalog::RuleCatalog;
use crate::infrastructure::resolver::{ProjectIndex, ResolvedFile};

use super::{is_synthetic, param_marker, FunctionSummary, ParamSink, SummaryMap};

/// Where taint is stored: a whole symbol, or one named field of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum FlowKey {
    Symbol(SymbolId),
    Field(SymbolId, String),
}

pub(crate) type State = HashMap<FlowKey, Vec<TaintEntry>>;

/// A sink call reached by tainted data; raw input to the classifier.
#[derive(Debug, Clone)]
pub struct SinkHit {
    pub rule_id: String,
    pub entries: Vec<TaintEntry>,
    pub location: Location,
    /// Callee path as written at the call site.
    pub callee: String,
    pub code_segment: String,
}

/// Per-file analysis output, before classification.
#[derive(Debug, Default)]
pub struct FileAnalysis {
    pub hits: Vec<SinkHit>,
    pub occurrences: Vec<PiiOccurrence>,
    /// Return-value taint collected while summarizing; empty in analysis
    /// mode.
    pub(crate) returns: Vec<TaintEntry>,
    /// Sinks reached by parameter markers while summarizing; empty in
    /// analysis mode.
    pub(crate) param_sinks: Vec<ParamSink>,
}

pub struct FileAnalyzer<'a> {
    file: &'a SourceFile,
    graph: &'a SyntaxGraph,
    resolved: &'a ResolvedFile,
    catalog: &'a RuleCatalog,
    index: Option<&'a ProjectIndex>,
    summaries: &'a SummaryMap,
    /// Sink hits are only recorded in the final pass; the summary rounds
    /// only care about what reaches `return`.
    record_sinks: bool,

    out: FileAnalysis,
    /// One occurrence per (rule, symbol); dotted expressions fall back to
    /// (rule, expression, line).
    seen_symbol_occurrences: HashSet<(String, SymbolId)>,
    seen_expr_occurrences: HashSet<(String, String, usize)>,
}

impl<'a> FileAnalyzer<'a> {
    pub fn new(
        file: &'a SourceFile,
        graph: &'a SyntaxGraph,
        resolved: &'a ResolvedFile,
        catalog: &'a RuleCatalog,
        index: Option<&'a ProjectIndex>,
        summaries: &'a SummaryMap,
    ) -> Self {
        Self {
            file,
            graph,
            resolved,
            catalog,
            index,
            summaries,
            record_sinks: true,
            out: FileAnalysis::default(),
            seen_symbol_occurrences: HashSet::new(),
            seen_expr_occurrences: HashSet::new(),
        }
    }

    pub(crate) fn for_summaries(
        file: &'a SourceFile,
        graph: &'a SyntaxGraph,
        resolved: &'a ResolvedFile,
        catalog: &'a RuleCatalog,
        index: Option<&'a ProjectIndex>,
        summaries: &'a SummaryMap,
    ) -> Self {
        let mut analyzer = Self::new(file, graph, resolved, catalog, index, summaries);
        analyzer.record_sinks = false;
        analyzer
    }

    /// Analyze the whole file: module-level statements first, then every
    /// function body against a snapshot of the module state.
    #[instrument(skip_all, fields(path = %self.file.display_path))]
    pub fn run(mut self) -> FileAnalysis {
        let mut module_state = State::new();
        if let Some(root) = self.graph.root() {
            for child in root.children.clone() {
                self.eval(child, &mut module_state);
            }
        }

        let functions: Vec<NodeId> = self.resolved.functions.iter().map(|f| f.node).collect();
        for fn_node in functions {
            let mut state = module_state.clone();
            self.seed_parameters(fn_node, &mut state);
            self.out.returns.clear();
            self.eval_body(fn_node, &mut state);
        }
        self.out
    }

    /// Summarize a single function body. Parameters are seeded both with
    /// synthetic position markers and with any real source labels their
    /// names or annotations match.
    pub(crate) fn run_function(mut self, fn_node: NodeId) -> (FunctionSummary, FileAnalysis) {
        let mut state = State::new();
        self.seed_parameters(fn_node, &mut state);
        let last_value = self.eval_body(fn_node, &mut state);

        // Implicit return value: Ruby methods and arrow lambdas yield the
        // last expression without a `return` keyword.
        let mut returns = std::mem::take(&mut self.out.returns);
        if returns.is_empty() {
            returns = last_value;
        }

        let mut summary = FunctionSummary::default();
        for entry in returns {
            match super::parse_param_marker(&entry.label.category) {
                Some(index) => {
                    summary.params_to_return.insert(index);
                }
                None => {
                    if !summary.return_labels.contains(&entry.label) {
                        summary.return_labels.push(entry.label);
                    }
                }
            }
        }
        summary.return_labels.sort_by(|a, b| {
            (&a.rule_id, &a.origin_expression).cmp(&(&b.rule_id, &b.origin_expression))
        });
        summary.param_sinks = std::mem::take(&mut self.out.param_sinks);
        summary
            .param_sinks
            .sort_by(|a, b| (&a.location, &a.rule_id).cmp(&(&b.location, &b.rule_id)));
        (summary, self.out)
    }

    fn eval_body(&mut self, fn_node: NodeId, state: &mut State) -> Vec<TaintEntry> {
        let children = self.graph.node(fn_node).children.clone();
        let mut last = Vec::new();
        for child in children {
            last = self.eval(child, state);
        }
        last
    }

    fn seed_parameters(&mut self, fn_node: NodeId, state: &mut State) {
        let Some(info) = self
            .resolved
            .functions
            .iter()
            .find(|f| f.node == fn_node)
        else {
            return;
        };
        for (index, &param) in info.params.clone().iter().enumerate() {
            let symbol = self.resolved.symbols.symbol(param);
            let name = symbol.name.clone();
            let annotation = symbol.type_annotation.clone();
            let span = symbol.declared_at;

            if !self.record_sinks {
                // Synthetic marker for position tracking during summaries.
                let label = TaintLabel {
                    category: param_marker(index),
                    sensitivity: Default::default(),
                    rule_id: String::new(),
                    origin: self.location(span),
                    origin_expression: name.clone(),
                };
                state
                    .entry(FlowKey::Symbol(param))
                    .or_default()
                    .push(TaintEntry::new(label));
            }

            self.seed_name_match(param, &name, annotation.as_deref(), span, state);
        }
    }

    /// Seed taint for every source rule the name (or type annotation)
    /// matches, and record the occurrence.
    fn seed_name_match(
        &mut self,
        symbol: SymbolId,
        name: &str,
        annotation: Option<&str>,
        span: Span,
        state: &mut State,
    ) {
        let language = self.file.language;
        let matching: Vec<Rule> = self
            .catalog
            .sources_for(language)
            .filter(|rule| {
                rule.matches_identifier(name)
                    || annotation.is_some_and(|a| rule.matches_type(a))
            })
            .cloned()
            .collect();
        for rule in matching {
            let entries = state.entry(FlowKey::Symbol(symbol)).or_default();
            if entries.iter().any(|e| e.label.rule_id == rule.id) {
                continue;
            }
            let label = TaintLabel {
                category: rule.category.clone(),
                sensitivity: rule.sensitivity,
                rule_id: rule.id.clone(),
                origin: self.location(span),
                origin_expression: name.to_string(),
            };
            entries.push(TaintEntry::new(label));
            self.record_symbol_occurrence(&rule, symbol, name, span);
        }
    }

    fn record_symbol_occurrence(&mut self, rule: &Rule, symbol: SymbolId, name: &str, span: Span) {
        if !self.record_sinks {
            return;
        }
        if !self
            .seen_symbol_occurrences
            .insert((rule.id.clone(), symbol))
        {
            return;
        }
        self.push_occurrence(rule, name, span);
    }

    fn record_expr_occurrence(&mut self, rule: &Rule, expression: &str, span: Span) {
        if !self.record_sinks {
            return;
        }
        let (line, _) = self.file.line_index.position(span.start);
        if !self
            .seen_expr_occurrences
            .insert((rule.id.clone(), expression.to_string(), line))
        {
            return;
        }
        self.push_occurrence(rule, expression, span);
    }

    fn push_occurrence(&mut self, rule: &Rule, expression: &str, span: Span) {
        let location = self.location(span);
        let code_segment = self.file.code_line(span);
        let fingerprint = PiiOccurrence::fingerprint_of(
            &rule.id,
            &self.file.display_path,
            expression,
            &code_segment,
        );
        self.out.occurrences.push(PiiOccurrence {
            rule_id: rule.id.clone(),
            category: rule.category.clone(),
            sensitivity: rule.sensitivity,
            language: self.file.language,
            location,
            expression: expression.to_string(),
            code_segment,
            fingerprint,
        });
    }

    /// Evaluate one node, mutating `state` and returning the taint carried
    /// by the node's value.
    fn eval(&mut self, id: NodeId, state: &mut State) -> Vec<TaintEntry> {
        let node = self.graph.node(id);
        match node.kind {
            // Nested bodies are analyzed separately with their own seeds.
            NodeKind::Function | NodeKind::Lambda => Vec::new(),
            NodeKind::Identifier => self.eval_identifier(id, state),
            NodeKind::MemberAccess => self.eval_member_access(id, state),
            NodeKind::Call => self.eval_call(id, state),
            NodeKind::Assignment | NodeKind::Declaration => self.eval_store(id, state),
            NodeKind::Conditional => self.eval_conditional(id, state),
            NodeKind::Loop => self.eval_loop(id, state),
            NodeKind::Return => {
                let entries = self.eval_children(id, state);
                self.out.returns.extend(entries.iter().cloned());
                entries
            }
            _ => self.eval_children(id, state),
        }
    }

    fn eval_children(&mut self, id: NodeId, state: &mut State) -> Vec<TaintEntry> {
        let mut union = Vec::new();
        for child in self.graph.node(id).children.clone() {
            merge_entries(&mut union, self.eval(child, state));
        }
        union
    }

    fn eval_identifier(&mut self, id: NodeId, state: &mut State) -> Vec<TaintEntry> {
        let node = self.graph.node(id);
        let span = node.span;
        let Some(name) = node.name.clone() else {
            return Vec::new();
        };
        let Some(&symbol) = self.resolved.bindings.get(&id) else {
            return Vec::new();
        };
        self.seed_name_match(symbol, &name, None, span, state);
        state
            .get(&FlowKey::Symbol(symbol))
            .cloned()
            .unwrap_or_default()
    }

    fn eval_member_access(&mut self, id: NodeId, state: &mut State) -> Vec<TaintEntry> {
        let node = self.graph.node(id);
        let span = node.span;
        let name = node.name.clone().unwrap_or_default();
        let children = self.eval_children(id, state);

        let mut entries = children;
        if let Some(&base) = self.resolved.bindings.get(&id) {
            if let Some((_, field)) = name.split_once('.') {
                if let Some(field_entries) = state.get(&FlowKey::Field(base, field.to_string())) {
                    merge_entries(&mut entries, field_entries.clone());
                }
            }
            // A wholly tainted object taints every field read from it.
            if let Some(base_entries) = state.get(&FlowKey::Symbol(base)) {
                let loaded: Vec<TaintEntry> = base_entries
                    .iter()
                    .cloned()
                    .map(|e| {
                        e.with_step(FlowStep {
                            kind: FlowEdgeKind::FieldLoad,
                            expression: name.clone(),
                            location: self.location(span),
                        })
                    })
                    .collect();
                merge_entries(&mut entries, loaded);
            }
        }

        // Dotted path itself can be a source: `user.ssn`.
        let matching: Vec<Rule> = self
            .catalog
            .sources_for(self.file.language)
            .filter(|rule| rule.matches_identifier(&name))
            .cloned()
            .collect();
        for rule in matching {
            if entries.iter().any(|e| e.label.rule_id == rule.id) {
                continue;
            }
            let label = TaintLabel {
                category: rule.category.clone(),
                sensitivity: rule.sensitivity,
                rule_id: rule.id.clone(),
                origin: self.location(span),
                origin_expression: name.clone(),
            };
            entries.push(TaintEntry::new(label));
            self.record_expr_occurrence(&rule, &name, span);
        }
        entries
    }

    fn eval_call(&mut self, id: NodeId, state: &mut State) -> Vec<TaintEntry> {
        let node = self.graph.node(id);
        let span = node.span;
        let callee_raw = node.callee.clone().unwrap_or_default();
        let canonical = self.graph.canonical_path(&callee_raw).into_owned();
        let language = self.file.language;

        let mut incoming = self.eval_children(id, state);

        // Call-shaped sources: `request.get_header("X-SSN")` style APIs.
        let call_sources: Vec<Rule> = self
            .catalog
            .sources_for(language)
            .filter(|rule| !rule.call_patterns.is_empty() && rule.matches_call(&canonical))
            .cloned()
            .collect();
        for rule in call_sources {
            if incoming.iter().any(|e| e.label.rule_id == rule.id) {
                continue;
            }
            let label = TaintLabel {
                category: rule.category.clone(),
                sensitivity: rule.sensitivity,
                rule_id: rule.id.clone(),
                origin: self.location(span),
                origin_expression: callee_raw.clone(),
            };
            incoming.push(TaintEntry::new(label));
            self.record_expr_occurrence(&rule, &callee_raw, span);
        }

        // Sink check runs on argument taint before any sanitizer transform:
        // `log(encrypt(ssn))` sanitizes inside the log call's argument list,
        // which is handled by the inner call's own evaluation.
        let sink_rules: Vec<String> = self
            .catalog
            .sinks_for(language)
            .filter(|rule| rule.matches_call(&canonical))
            .map(|rule| rule.id.clone())
            .collect();
        if !sink_rules.is_empty() {
            if self.record_sinks {
                let real: Vec<TaintEntry> = incoming
                    .iter()
                    .filter(|e| !is_synthetic(e))
                    .cloned()
                    .collect();
                if !real.is_empty() {
                    for rule_id in sink_rules {
                        trace!(callee = %canonical, rule = %rule_id, "sink hit");
                        self.out.hits.push(SinkHit {
                            rule_id,
                            entries: real.clone(),
                            location: self.location(span),
                            callee: callee_raw.clone(),
                            code_segment: self.file.code_line(span),
                        });
                    }
                }
            } else {
                // Summary rounds: note which parameter markers reach this
                // sink so callers can report flows into the body.
                let params: BTreeSet<usize> = incoming
                    .iter()
                    .filter_map(|e| super::parse_param_marker(&e.label.category))
                    .collect();
                if !params.is_empty() {
                    for rule_id in sink_rules {
                        self.push_param_sink(ParamSink {
                            params: params.clone(),
                            rule_id,
                            location: self.location(span),
                            callee: callee_raw.clone(),
                            code_segment: self.file.code_line(span),
                        });
                    }
                }
            }
        }

        // Sanitizer transform applies to the call's value.
        let sanitizers: Vec<Rule> = self
            .catalog
            .sanitizers_for(language)
            .filter(|rule| rule.matches_call(&canonical))
            .cloned()
            .collect();
        if !sanitizers.is_empty() {
            let mut result = Vec::new();
            'entry: for entry in incoming {
                let mut entry = entry;
                for rule in &sanitizers {
                    if rule.neutralizes_category(&entry.label.category) {
                        if rule.fully_neutralizing {
                            continue 'entry;
                        }
                        entry.sanitized = true;
                    }
                }
                result.push(entry);
            }
            return result;
        }

        // Summary-based propagation for calls into scanned code.
        if let Some(result) = self.apply_summaries(id, &canonical, &incoming, span) {
            return result;
        }

        // Unknown callee: conservative pass-through so taint survives
        // library transforms like `str(ssn)` or `value.trim()`.
        incoming
    }

    /// Propagation through a resolved callee. Returns `None` when the
    /// callee does not resolve to scanned code, leaving the conservative
    /// default in place.
    fn apply_summaries(
        &mut self,
        call_node: NodeId,
        canonical: &str,
        incoming: &[TaintEntry],
        span: Span,
    ) -> Option<Vec<TaintEntry>> {
        let candidates = self.resolve_callee(call_node, canonical);
        if candidates.is_empty() {
            return None;
        }

        let mut result = Vec::new();
        for candidate in candidates {
            let Some(summary) = self.summaries.get(&candidate) else {
                continue;
            };
            if !summary.param_sinks.is_empty() {
                self.apply_param_sinks(summary, canonical, incoming, span);
            }
            if !summary.params_to_return.is_empty() {
                let returned: Vec<TaintEntry> = incoming
                    .iter()
                    .cloned()
                    .map(|e| {
                        e.with_step(FlowStep {
                            kind: FlowEdgeKind::Return,
                            expression: canonical.to_string(),
                            location: self.location(span),
                        })
                    })
                    .collect();
                merge_entries(&mut result, returned);
            }
            for label in &summary.return_labels {
                let entry = TaintEntry::new(label.clone()).with_step(FlowStep {
                    kind: FlowEdgeKind::Return,
                    expression: canonical.to_string(),
                    location: self.location(span),
                });
                merge_entries(&mut result, vec![entry]);
            }
        }
        Some(result)
    }

    /// Argument taint flowing into a callee whose body (or deeper callees)
    /// reaches a sink. The hit is recorded at the sink's own location; the
    /// classifier's dedup then collapses every caller onto that one line.
    fn apply_param_sinks(
        &mut self,
        summary: &FunctionSummary,
        canonical: &str,
        incoming: &[TaintEntry],
        span: Span,
    ) {
        if self.record_sinks {
            let passed: Vec<TaintEntry> = incoming
                .iter()
                .filter(|e| !is_synthetic(e))
                .cloned()
                .map(|e| {
                    e.with_step(FlowStep {
                        kind: FlowEdgeKind::ParameterPass,
                        expression: canonical.to_string(),
                        location: self.location(span),
                    })
                })
                .collect();
            if passed.is_empty() {
                return;
            }
            for sink in &summary.param_sinks {
                trace!(callee = %canonical, rule = %sink.rule_id, "sink hit through callee");
                self.out.hits.push(SinkHit {
                    rule_id: sink.rule_id.clone(),
                    entries: passed.clone(),
                    location: sink.location.clone(),
                    callee: sink.callee.clone(),
                    code_segment: sink.code_segment.clone(),
                });
            }
        } else {
            // Summary rounds: a marker reaching this call makes the callee's
            // sinks reachable from the current function's parameters too.
            let params: BTreeSet<usize> = incoming
                .iter()
                .filter_map(|e| super::parse_param_marker(&e.label.category))
                .collect();
            if params.is_empty() {
                return;
            }
            for sink in summary.param_sinks.clone() {
                self.push_param_sink(ParamSink {
                    params: params.clone(),
                    ..sink
                });
            }
        }
    }

    fn push_param_sink(&mut self, sink: ParamSink) {
        if !self.out.param_sinks.contains(&sink) {
            self.out.param_sinks.push(sink);
        }
    }

    /// Candidate declarations for a call: same-file scope chain first, then
    /// the cross-file module table.
    fn resolve_callee(&self, call_node: NodeId, canonical: &str) -> Vec<GlobalSymbolId> {
        if !canonical.contains('.') {
            let scope = self.resolved.scope_of(call_node);
            if let Some(symbol) = self.resolved.symbols.resolve(scope, canonical) {
                let info = self.resolved.symbols.symbol(symbol);
                if info.kind == SymbolKind::Function {
                    return vec![GlobalSymbolId {
                        file: self.file.id,
                        symbol,
                    }];
                }
            }
        }
        match self.index {
            Some(index) => index.resolve_call(canonical),
            None => Vec::new(),
        }
    }

    fn eval_store(&mut self, id: NodeId, state: &mut State) -> Vec<TaintEntry> {
        let node = self.graph.node(id);
        let span = node.span;
        let name = node.name.clone();
        let annotation = node.annotation.clone();
        let children = node.children.clone();

        // For assignments children are [lhs, rhs]; evaluating the lhs first
        // surfaces member-access loads on the target's base object.
        let mut value = Vec::new();
        for child in children {
            value = self.eval(child, state);
        }

        let Some(name) = name else {
            return value;
        };

        let stepped: Vec<TaintEntry> = value
            .iter()
            .cloned()
            .map(|e| {
                e.with_step(FlowStep {
                    kind: if name.contains('.') {
                        FlowEdgeKind::FieldStore
                    } else {
                        FlowEdgeKind::Assignment
                    },
                    expression: name.clone(),
                    location: self.location(span),
                })
            })
            .collect();

        let mut target_key = None;
        if let Some((base, field)) = name.split_once('.') {
            // Field store: `user.ssn = value`, field-sensitive on the base.
            let scope = self.resolved.scope_of(id);
            let base_symbol = self
                .resolved
                .bindings
                .get(&id)
                .copied()
                .or_else(|| self.resolved.symbols.resolve(scope, base));
            if let Some(base_symbol) = base_symbol {
                let key = FlowKey::Field(base_symbol, field.to_string());
                state.insert(key.clone(), stepped);
                target_key = Some(key.clone());
                // Dotted target matching a source taints the field itself.
                let matching: Vec<Rule> = self
                    .catalog
                    .sources_for(self.file.language)
                    .filter(|rule| rule.matches_identifier(&name))
                    .cloned()
                    .collect();
                for rule in matching {
                    let entries = state.entry(key.clone()).or_default();
                    if entries.iter().any(|e| e.label.rule_id == rule.id) {
                        continue;
                    }
                    let label = TaintLabel {
                        category: rule.category.clone(),
                        sensitivity: rule.sensitivity,
                        rule_id: rule.id.clone(),
                        origin: self.location(span),
                        origin_expression: name.clone(),
                    };
                    entries.push(TaintEntry::new(label));
                    self.record_expr_occurrence(&rule, &name, span);
                }
            }
        } else if let Some(&symbol) = self.resolved.bindings.get(&id) {
            // Strong update: reassignment replaces the previous taint.
            state.insert(FlowKey::Symbol(symbol), stepped);
            self.seed_name_match(symbol, &name, annotation.as_deref(), span, state);
            target_key = Some(FlowKey::Symbol(symbol));
        }

        match target_key {
            Some(key) => state.get(&key).cloned().unwrap_or_default(),
            None => value,
        }
    }

    /// Branches fork the state and merge by union, preserving per-path
    /// sanitization: an entry sanitized on one branch does not clear the
    /// unsanitized entry from the other.
    fn eval_conditional(&mut self, id: NodeId, state: &mut State) -> Vec<TaintEntry> {
        let children = self.graph.node(id).children.clone();
        let snapshot = state.clone();
        let mut merged = snapshot.clone();
        let mut value = Vec::new();
        for child in children {
            let mut branch = snapshot.clone();
            merge_entries(&mut value, self.eval(child, &mut branch));
            merge_states(&mut merged, branch);
        }
        *state = merged;
        value
    }

    /// One extra pass over the body lets taint assigned late in an
    /// iteration reach uses at the top of the next one. Sink and occurrence
    /// recording is muted on the priming pass so nothing reports twice.
    fn eval_loop(&mut self, id: NodeId, state: &mut State) -> Vec<TaintEntry> {
        let children = self.graph.node(id).children.clone();
        let original = self.record_sinks;
        self.record_sinks = false;
        for child in &children {
            self.eval(*child, state);
        }
        self.record_sinks = original;
        let mut value = Vec::new();
        for child in &children {
            merge_entries(&mut value, self.eval(*child, state));
        }
        value
    }

    fn location(&self, span: Span) -> Location {
        let (line, column) = self.file.line_index.position(span.start);
        let (end_line, end_column) = self.file.line_index.position(span.end);
        Location::new(self.file.display_path.clone(), line, column).with_end(end_line, end_column)
    }
}

pub(crate) fn merge_entries(into: &mut Vec<TaintEntry>, from: Vec<TaintEntry>) {
    for entry in from {
        if !into.contains(&entry) {
            into.push(entry);
        }
    }
}

pub(crate) fn merge_states(into: &mut State, from: State) {
    for (key, entries) in from {
        let slot = into.entry(key).or_default();
        for entry in entries {
            if !slot.contains(&entry) {
                slot.push(entry);
            }
        }
    }
}
