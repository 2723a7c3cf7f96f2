//! Symbols and scopes
//!
//! Scope-aware symbol tables built per file, then linked across files through
//! an import-resolution table keyed by `(module path, exported name)`. All
//! relations use stable integer ids so mutually recursive imports never form
//! reference cycles.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::syntax::{FileId, NodeId, Span};

/// Id of a symbol within one file's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

/// Globally unique symbol reference: file plus local id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalSymbolId {
    pub file: FileId,
    pub symbol: SymbolId,
}

/// Kind of symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Field,
    Function,
    Class,
    Import,
    /// Referenced but never declared in the scanned tree (library symbol).
    External,
}

/// A named entity with its declaration site and reference sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    pub scope: ScopeId,
    pub declared_at: Span,
    /// Declaring syntax node, when the symbol comes from one.
    pub declared_node: Option<NodeId>,
    /// Spans where the symbol is read or written.
    pub references: Vec<Span>,
    /// Declared or inferred type annotation text, if any.
    pub type_annotation: Option<String>,
    /// For parameters: zero-based position in the declaring function.
    pub param_index: Option<usize>,
}

/// Id of a scope within one file's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    Module,
    Function,
    Class,
    Anonymous,
}

/// A lexical scope; symbols resolve by walking the parent chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scope {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    pub name: String,
    symbols: HashMap<String, SymbolId>,
}

/// Per-file symbol table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolTable {
    pub file: FileId,
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new(file: FileId) -> Self {
        let module_scope = Scope {
            id: ScopeId(0),
            parent: None,
            kind: ScopeKind::Module,
            name: "module".to_string(),
            symbols: HashMap::new(),
        };
        Self {
            file,
            scopes: vec![module_scope],
            symbols: Vec::new(),
        }
    }

    pub fn module_scope(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn push_scope(&mut self, parent: ScopeId, kind: ScopeKind, name: impl Into<String>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            id,
            parent: Some(parent),
            kind,
            name: name.into(),
            symbols: HashMap::new(),
        });
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    /// Declare a symbol in `scope`. Redeclaration shadows the previous
    /// binding, matching the dynamic-language semantics of most frontends.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: impl Into<String>,
        kind: SymbolKind,
        declared_at: Span,
        declared_node: Option<NodeId>,
    ) -> SymbolId {
        let name = name.into();
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            id,
            name: name.clone(),
            kind,
            scope,
            declared_at,
            declared_node,
            references: Vec::new(),
            type_annotation: None,
            param_index: None,
        });
        self.scopes[scope.0 as usize].symbols.insert(name, id);
        id
    }

    /// Resolve a name by walking up the scope chain.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(scope_id) = current {
            let scope = &self.scopes[scope_id.0 as usize];
            if let Some(&id) = scope.symbols.get(name) {
                return Some(id);
            }
            current = scope.parent;
        }
        None
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.0 as usize]
    }

    pub fn record_reference(&mut self, id: SymbolId, span: Span) {
        self.symbols[id.0 as usize].references.push(span);
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols declared directly in `scope`.
    pub fn symbols_in_scope(&self, scope: ScopeId) -> impl Iterator<Item = &Symbol> {
        self.scopes[scope.0 as usize]
            .symbols
            .values()
            .map(|id| self.symbol(*id))
    }
}

/// Key into the cross-file export table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExportKey {
    /// Normalized module path (`pkg.module` or path stem for file modules).
    pub module: String,
    pub name: String,
}

/// Cross-file linking table produced at the resolution barrier.
///
/// Read-only after linking; shared across workers without locking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleTable {
    exports: HashMap<ExportKey, Vec<GlobalSymbolId>>,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an exported symbol. Multiple files exporting the same key
    /// accumulate; lookups return the union (conservative resolution).
    pub fn insert(&mut self, key: ExportKey, symbol: GlobalSymbolId) {
        self.exports.entry(key).or_default().push(symbol);
    }

    /// All plausible declarations for `(module, name)`.
    pub fn lookup(&self, module: &str, name: &str) -> &[GlobalSymbolId] {
        self.exports
            .get(&ExportKey {
                module: module.to_string(),
                name: name.to_string(),
            })
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Declarations whose module path is a dotted suffix of `module` (or the
    /// reverse). Import specifiers rarely spell the full on-disk path, so
    /// `models.user` must find `src.models.user`.
    pub fn lookup_suffix(&self, module: &str, name: &str) -> Vec<GlobalSymbolId> {
        let mut out: Vec<GlobalSymbolId> = self
            .exports
            .iter()
            .filter(|(key, _)| {
                key.name == name
                    && (key.module == module
                        || key.module.ends_with(&format!(".{module}"))
                        || module.ends_with(&format!(".{}", key.module)))
            })
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Union of declarations for a bare name across all modules.
    pub fn lookup_by_name(&self, name: &str) -> Vec<GlobalSymbolId> {
        let mut out: Vec<GlobalSymbolId> = self
            .exports
            .iter()
            .filter(|(key, _)| key.name == name)
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        out.sort();
        out.dedup();
        out
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}
