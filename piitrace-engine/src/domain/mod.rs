//! Domain model for the analysis engine
//!
//! Pure data types with no I/O: source files and the normalized syntax
//! graph, symbols and scopes, catalog rules, taint labels, and findings.

pub mod finding;
pub mod rule;
pub mod symbol;
pub mod syntax;
pub mod taint;
pub mod value_objects;

pub use finding::{Diagnostic, FileStats, Finding, Location, PiiOccurrence, ScanStats};
pub use rule::{Rule, RuleRole};
pub use symbol::{
    ExportKey, GlobalSymbolId, ModuleTable, Scope, ScopeId, ScopeKind, Symbol, SymbolId,
    SymbolKind, SymbolTable,
};
pub use syntax::{
    ControlFlowEdge, FileId, LineIndex, NodeId, NodeKind, SourceFile, Span, SyntaxGraph, SyntaxNode,
};
pub use taint::{FlowEdgeKind, FlowStep, TaintEntry, TaintLabel};
pub use value_objects::{Language, Sensitivity};
