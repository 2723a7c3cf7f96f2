//! Symbol resolution
//!
//! Builds a scope-aware symbol table for each file's syntax graph, then
//! links the per-file tables through a [`ModuleTable`] at the phase barrier.
//! Names that never resolve locally become `External` symbols instead of
//! errors: library code outside the scanned tree is the common case, and
//! taint tracking must keep working across it.

use std::collections::HashMap;

use tracing::{debug, instrument};

use piitrace_core::config::ResolutionMode;

use crate::domain::symbol::{
    ExportKey, GlobalSymbolId, ModuleTable, ScopeId, ScopeKind, SymbolId, SymbolKind, SymbolTable,
};
use crate::domain::syntax::{NodeId, NodeKind, SourceFile, SyntaxGraph};

/// A function discovered during resolution, with its parameter symbols in
/// declaration order. Drives summary computation and call linking.
#[derive(Debug, Clone)]
pub struct FunctionInfo {
    pub node: NodeId,
    pub name: Option<String>,
    pub scope: ScopeId,
    pub symbol: Option<SymbolId>,
    pub params: Vec<SymbolId>,
}

/// Resolution output for one file.
#[derive(Debug, Clone)]
pub struct ResolvedFile {
    pub symbols: SymbolTable,
    /// Identifier/declaration/parameter nodes bound to their symbol.
    pub bindings: HashMap<NodeId, SymbolId>,
    /// Enclosing scope of every node, for scope-chain lookups in dataflow.
    pub node_scopes: HashMap<NodeId, ScopeId>,
    pub functions: Vec<FunctionInfo>,
    /// Dotted module path derived from the file's relative path.
    pub module_path: String,
}

impl ResolvedFile {
    pub fn scope_of(&self, node: NodeId) -> ScopeId {
        self.node_scopes
            .get(&node)
            .copied()
            .unwrap_or(ScopeId(0))
    }
}

/// Dotted module path of a file: `src/models/user.py` -> `src.models.user`.
pub fn module_path_of(display_path: &str) -> String {
    let no_ext = match display_path.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => display_path,
    };
    no_ext.replace(['/', '\\'], ".")
}

#[instrument(skip_all, fields(path = %file.display_path))]
pub fn resolve_file(file: &SourceFile, graph: &SyntaxGraph) -> ResolvedFile {
    let mut resolver = Resolver {
        graph,
        table: SymbolTable::new(file.id),
        bindings: HashMap::new(),
        node_scopes: HashMap::new(),
        functions: Vec::new(),
        externals: HashMap::new(),
    };

    let module_scope = resolver.table.module_scope();
    // Import aliases bind names at module level before any statement runs.
    for (alias, _canonical) in &graph.aliases {
        resolver.table.declare(
            module_scope,
            alias.clone(),
            SymbolKind::Import,
            Default::default(),
            None,
        );
    }

    if let Some(root) = graph.root() {
        let root_id = root.id;
        resolver.node_scopes.insert(root_id, module_scope);
        for child in graph.node(root_id).children.clone() {
            resolver.visit(child, module_scope);
        }
    }

    debug!(
        symbols = resolver.table.len(),
        functions = resolver.functions.len(),
        "resolved file"
    );

    ResolvedFile {
        symbols: resolver.table,
        bindings: resolver.bindings,
        node_scopes: resolver.node_scopes,
        functions: resolver.functions,
        module_path: module_path_of(&file.display_path),
    }
}

struct Resolver<'a> {
    graph: &'a SyntaxGraph,
    table: SymbolTable,
    bindings: HashMap<NodeId, SymbolId>,
    node_scopes: HashMap<NodeId, ScopeId>,
    functions: Vec<FunctionInfo>,
    /// One `External` symbol per unresolved name, declared at module level.
    externals: HashMap<String, SymbolId>,
}

impl Resolver<'_> {
    fn visit(&mut self, id: NodeId, scope: ScopeId) {
        self.node_scopes.insert(id, scope);
        let node = self.graph.node(id);
        match node.kind {
            NodeKind::Function | NodeKind::Lambda => self.visit_function(id, scope),
            NodeKind::Class => {
                let name = node.name.clone().unwrap_or_else(|| "<class>".to_string());
                let symbol = self.table.declare(
                    scope,
                    name.clone(),
                    SymbolKind::Class,
                    node.span,
                    Some(id),
                );
                self.bindings.insert(id, symbol);
                let class_scope = self.table.push_scope(scope, ScopeKind::Class, name);
                for child in node.children.clone() {
                    self.visit(child, class_scope);
                }
            }
            NodeKind::Declaration => {
                // Initializer first: `let x = x` reads the outer binding.
                for child in node.children.clone() {
                    self.visit(child, scope);
                }
                if let Some(name) = node.name.clone() {
                    let symbol = self.table.declare(
                        scope,
                        name,
                        SymbolKind::Variable,
                        node.span,
                        Some(id),
                    );
                    if let Some(annotation) = node.annotation.clone() {
                        self.table.symbol_mut(symbol).type_annotation = Some(annotation);
                    }
                    self.bindings.insert(id, symbol);
                }
            }
            NodeKind::Assignment => {
                for child in node.children.clone() {
                    self.visit(child, scope);
                }
                // Simple-name targets bind in dynamic languages; dotted
                // targets are field stores and stay with their base symbol.
                if let Some(name) = node.name.clone() {
                    if !name.contains('.') {
                        let symbol = match self.table.resolve(scope, &name) {
                            Some(existing) => {
                                self.table.record_reference(existing, node.span);
                                existing
                            }
                            None => self.table.declare(
                                scope,
                                name,
                                SymbolKind::Variable,
                                node.span,
                                Some(id),
                            ),
                        };
                        if let Some(annotation) = self.graph.node(id).annotation.clone() {
                            self.table.symbol_mut(symbol).type_annotation = Some(annotation);
                        }
                        self.bindings.insert(id, symbol);
                    }
                }
            }
            NodeKind::Identifier => {
                let Some(name) = node.name.clone() else {
                    return;
                };
                let symbol = match self.table.resolve(scope, &name) {
                    Some(existing) => existing,
                    None => self.external(&name),
                };
                self.table.record_reference(symbol, node.span);
                self.bindings.insert(id, symbol);
            }
            NodeKind::MemberAccess => {
                // Bind the base identifier so field loads can find its state.
                if let Some(name) = node.name.clone() {
                    let base = name.split('.').next().unwrap_or(&name).to_string();
                    let symbol = match self.table.resolve(scope, &base) {
                        Some(existing) => existing,
                        None => self.external(&base),
                    };
                    self.table.record_reference(symbol, node.span);
                    self.bindings.insert(id, symbol);
                }
                for child in node.children.clone() {
                    self.visit(child, scope);
                }
            }
            NodeKind::Parameter => {
                // Parameters outside a function header (destructured or
                // container-less grammars) still need a binding.
                if !self.bindings.contains_key(&id) {
                    if let Some(name) = node.name.clone() {
                        let symbol = self.table.declare(
                            scope,
                            name,
                            SymbolKind::Parameter,
                            node.span,
                            Some(id),
                        );
                        if let Some(annotation) = node.annotation.clone() {
                            self.table.symbol_mut(symbol).type_annotation = Some(annotation);
                        }
                        self.bindings.insert(id, symbol);
                    }
                }
            }
            _ => {
                for child in node.children.clone() {
                    self.visit(child, scope);
                }
            }
        }
    }

    fn visit_function(&mut self, id: NodeId, enclosing: ScopeId) {
        let node = self.graph.node(id);
        let name = node.name.clone();
        let span = node.span;

        let symbol = name.as_ref().map(|n| {
            self.table
                .declare(enclosing, n.clone(), SymbolKind::Function, span, Some(id))
        });
        if let Some(s) = symbol {
            self.bindings.insert(id, s);
        }

        let scope_kind = if name.is_some() {
            ScopeKind::Function
        } else {
            ScopeKind::Anonymous
        };
        let fn_scope = self.table.push_scope(
            enclosing,
            scope_kind,
            name.clone().unwrap_or_else(|| "<lambda>".to_string()),
        );

        let mut params = Vec::new();
        self.declare_params(id, fn_scope, &mut params);

        self.functions.push(FunctionInfo {
            node: id,
            name,
            scope: fn_scope,
            symbol,
            params,
        });

        for child in self.graph.node(id).children.clone() {
            self.visit(child, fn_scope);
        }
    }

    /// Declare every parameter of `fn_node` in order, skipping nested
    /// function bodies so their parameters stay in their own scope.
    fn declare_params(&mut self, fn_node: NodeId, fn_scope: ScopeId, params: &mut Vec<SymbolId>) {
        let children = self.graph.node(fn_node).children.clone();
        for child in children {
            self.collect_params(child, fn_scope, params);
        }
    }

    fn collect_params(&mut self, id: NodeId, fn_scope: ScopeId, params: &mut Vec<SymbolId>) {
        let node = self.graph.node(id);
        match node.kind {
            NodeKind::Function | NodeKind::Lambda | NodeKind::Class => {}
            NodeKind::Parameter => {
                if let Some(name) = node.name.clone() {
                    let symbol = self.table.declare(
                        fn_scope,
                        name,
                        SymbolKind::Parameter,
                        node.span,
                        Some(id),
                    );
                    self.table.symbol_mut(symbol).param_index = Some(params.len());
                    if let Some(annotation) = node.annotation.clone() {
                        self.table.symbol_mut(symbol).type_annotation = Some(annotation);
                    }
                    self.bindings.insert(id, symbol);
                    self.node_scopes.insert(id, fn_scope);
                    params.push(symbol);
                }
            }
            _ => {
                for child in node.children.clone() {
                    self.collect_params(child, fn_scope, params);
                }
            }
        }
    }

    fn external(&mut self, name: &str) -> SymbolId {
        if let Some(&existing) = self.externals.get(name) {
            return existing;
        }
        let module_scope = self.table.module_scope();
        let symbol = self.table.declare(
            module_scope,
            name.to_string(),
            SymbolKind::External,
            Default::default(),
            None,
        );
        self.externals.insert(name.to_string(), symbol);
        symbol
    }
}

/// Cross-file index built at the barrier between the parse/resolve phase and
/// the dataflow phase. Immutable afterwards, shared by reference.
#[derive(Debug)]
pub struct ProjectIndex {
    pub modules: ModuleTable,
    mode: ResolutionMode,
}

impl ProjectIndex {
    /// Register every module-level function and class of every file.
    #[instrument(skip_all, fields(files = resolved.len()))]
    pub fn link(resolved: &[(crate::domain::syntax::FileId, &ResolvedFile)], mode: ResolutionMode) -> Self {
        let mut modules = ModuleTable::new();
        for (file, info) in resolved {
            let module_scope = info.symbols.module_scope();
            for symbol in info.symbols.symbols_in_scope(module_scope) {
                if matches!(symbol.kind, SymbolKind::Function | SymbolKind::Class) {
                    modules.insert(
                        ExportKey {
                            module: info.module_path.clone(),
                            name: symbol.name.clone(),
                        },
                        GlobalSymbolId {
                            file: *file,
                            symbol: symbol.id,
                        },
                    );
                }
            }
        }
        debug!(exports = modules.len(), "linked module table");
        Self { modules, mode }
    }

    /// Candidate declarations for a canonical (alias-resolved) callee path.
    ///
    /// Strict mode requires the module segment to match; permissive mode
    /// falls back to every export with the same bare name.
    pub fn resolve_call(&self, canonical_path: &str) -> Vec<GlobalSymbolId> {
        match canonical_path.rsplit_once('.') {
            Some((module, name)) => {
                let exact = self.modules.lookup(module, name);
                if !exact.is_empty() {
                    return exact.to_vec();
                }
                let suffixed = self.modules.lookup_suffix(module, name);
                if !suffixed.is_empty() {
                    return suffixed;
                }
                match self.mode {
                    ResolutionMode::Permissive => self.modules.lookup_by_name(name),
                    ResolutionMode::Strict => Vec::new(),
                }
            }
            None => match self.mode {
                ResolutionMode::Permissive => self.modules.lookup_by_name(canonical_path),
                ResolutionMode::Strict => Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::domain::syntax::{FileId, SourceFile};
    use crate::domain::value_objects::Language;
    use crate::infrastructure::frontend::Frontend;

    fn resolve(language: Language, ext: &str, text: &str) -> (SourceFile, SyntaxGraph, ResolvedFile) {
        let file = SourceFile::new(
            FileId(0),
            PathBuf::from(format!("src/app.{ext}")),
            format!("src/app.{ext}"),
            language,
            text.to_string(),
        );
        let graph = Frontend::for_file(&file)
            .expect("frontend")
            .parse(&file)
            .expect("parse");
        let resolved = resolve_file(&file, &graph);
        (file, graph, resolved)
    }

    #[test]
    fn parameters_get_indices() {
        let (_, _, resolved) = resolve(
            Language::Python,
            "py",
            "def handler(request, ssn):\n    return ssn\n",
        );
        let func = &resolved.functions[0];
        assert_eq!(func.name.as_deref(), Some("handler"));
        assert_eq!(func.params.len(), 2);
        let ssn = resolved.symbols.symbol(func.params[1]);
        assert_eq!(ssn.name, "ssn");
        assert_eq!(ssn.param_index, Some(1));
    }

    #[test]
    fn body_reference_resolves_to_parameter() {
        let (_, graph, resolved) = resolve(
            Language::Python,
            "py",
            "def f(email):\n    log(email)\n",
        );
        let param = resolved.functions[0].params[0];
        // The identifier inside the call body binds to the parameter symbol.
        let bound = graph
            .iter()
            .filter(|n| n.kind == NodeKind::Identifier && n.name.as_deref() == Some("email"))
            .any(|n| resolved.bindings.get(&n.id) == Some(&param));
        assert!(bound);
    }

    #[test]
    fn unresolved_names_become_external() {
        let (_, graph, resolved) = resolve(Language::Python, "py", "log(mystery)\n");
        let id = graph
            .iter()
            .find(|n| n.name.as_deref() == Some("mystery"))
            .map(|n| n.id)
            .expect("identifier");
        let symbol = resolved.bindings[&id];
        assert_eq!(resolved.symbols.symbol(symbol).kind, SymbolKind::External);
    }

    #[test]
    fn module_path_strips_extension() {
        assert_eq!(module_path_of("src/models/user.py"), "src.models.user");
        assert_eq!(module_path_of("lib/crypto.ts"), "lib.crypto");
    }

    #[test]
    fn project_index_links_and_resolves() {
        let (file, _, resolved) = resolve(
            Language::Python,
            "py",
            "def scrub(value):\n    return ''\n",
        );
        let index = ProjectIndex::link(&[(file.id, &resolved)], ResolutionMode::Permissive);
        assert_eq!(index.resolve_call("src.app.scrub").len(), 1);
        // Import spelled without the src prefix still matches by suffix.
        assert_eq!(index.resolve_call("app.scrub").len(), 1);
        // Bare name unions across modules in permissive mode.
        assert_eq!(index.resolve_call("scrub").len(), 1);

        let strict = ProjectIndex::link(&[(file.id, &resolved)], ResolutionMode::Strict);
        assert_eq!(strict.resolve_call("src.app.scrub").len(), 1);
        assert!(strict.resolve_call("scrub").is_empty());
    }
}
