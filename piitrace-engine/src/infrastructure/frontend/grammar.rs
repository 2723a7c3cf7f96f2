//! Grammar specs and the shared normalizer
//!
//! Each language frontend is a [`GrammarSpec`]: a table mapping that
//! grammar's concrete node kinds and field names onto the shared
//! [`NodeKind`] vocabulary, plus an import collector for its module system.
//! One normalizer walks every tree-sitter parse tree through its spec, so
//! the dataflow engine sees assignment, call, and member-access patterns
//! uniformly across languages.

use tree_sitter::Node as TsNode;

use crate::domain::syntax::{NodeId, NodeKind, Span, SyntaxGraph};
use crate::domain::value_objects::Language;

/// How to extract the callee path from a call-shaped node.
#[derive(Debug, Clone, Copy)]
pub struct CallSpec {
    pub kind: &'static str,
    /// Single field holding the whole callee expression.
    pub callee_field: Option<&'static str>,
    /// Receiver/method field pair, joined with `.` (Java, Ruby).
    pub object_field: Option<&'static str>,
    pub method_field: Option<&'static str>,
}

/// Assignment-shaped node: `left = right`.
#[derive(Debug, Clone, Copy)]
pub struct AssignSpec {
    pub kind: &'static str,
    pub left_field: &'static str,
    pub right_field: &'static str,
}

/// Declarator-shaped node: a fresh binding with an optional initializer.
#[derive(Debug, Clone, Copy)]
pub struct DeclSpec {
    pub kind: &'static str,
    pub name_field: &'static str,
    pub value_field: Option<&'static str>,
    pub type_field: Option<&'static str>,
}

/// Member-access-shaped node: `object.member`.
#[derive(Debug, Clone, Copy)]
pub struct MemberSpec {
    pub kind: &'static str,
    pub object_field: &'static str,
    pub member_field: &'static str,
}

/// Formal parameter node.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub kind: &'static str,
    /// Field holding the parameter name; when absent, the first identifier
    /// descendant is used.
    pub name_field: Option<&'static str>,
    pub type_field: Option<&'static str>,
}

/// Per-language mapping table.
pub struct GrammarSpec {
    pub language: Language,
    pub function_kinds: &'static [&'static str],
    pub lambda_kinds: &'static [&'static str],
    pub class_kinds: &'static [&'static str],
    pub calls: &'static [CallSpec],
    pub assignments: &'static [AssignSpec],
    pub declarations: &'static [DeclSpec],
    pub member_accesses: &'static [MemberSpec],
    pub identifier_kinds: &'static [&'static str],
    pub literal_kinds: &'static [&'static str],
    pub conditional_kinds: &'static [&'static str],
    pub loop_kinds: &'static [&'static str],
    pub return_kinds: &'static [&'static str],
    pub import_kinds: &'static [&'static str],
    pub parameters: &'static [ParamSpec],
    /// Container kinds under which a bare identifier is a parameter
    /// (`parameters` in Python, `formal_parameters` in Java, ...).
    pub parameter_containers: &'static [&'static str],
    /// Collect `alias -> canonical dotted path` bindings from one import
    /// node. Language-specific because module systems differ structurally.
    pub collect_imports: fn(TsNode<'_>, &str) -> Vec<(String, String)>,
}

impl GrammarSpec {
    fn call_spec(&self, kind: &str) -> Option<&CallSpec> {
        self.calls.iter().find(|c| c.kind == kind)
    }

    fn assign_spec(&self, kind: &str) -> Option<&AssignSpec> {
        self.assignments.iter().find(|a| a.kind == kind)
    }

    fn decl_spec(&self, kind: &str) -> Option<&DeclSpec> {
        self.declarations.iter().find(|d| d.kind == kind)
    }

    fn member_spec(&self, kind: &str) -> Option<&MemberSpec> {
        self.member_accesses.iter().find(|m| m.kind == kind)
    }

    fn param_spec(&self, kind: &str) -> Option<&ParamSpec> {
        self.parameters.iter().find(|p| p.kind == kind)
    }
}

/// Text of a node, with whitespace stripped and `::` normalized to `.` so
/// dotted paths compare uniformly across languages.
pub fn path_text(node: TsNode<'_>, src: &str) -> String {
    let raw = &src[node.start_byte()..node.end_byte().min(src.len())];
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .replace("::", ".")
}

fn raw_text<'a>(node: TsNode<'a>, src: &'a str) -> &'a str {
    &src[node.start_byte()..node.end_byte().min(src.len())]
}

fn span_of(node: TsNode<'_>) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

/// First identifier-kind descendant, for grammars without a name field.
fn first_identifier<'a>(node: TsNode<'a>, identifier_kinds: &[&str]) -> Option<TsNode<'a>> {
    if identifier_kinds.contains(&node.kind()) {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if let Some(found) = first_identifier(child, identifier_kinds) {
            return Some(found);
        }
    }
    None
}

/// Walks a tree-sitter parse tree and emits the normalized syntax graph.
pub struct Normalizer<'a> {
    spec: &'a GrammarSpec,
    src: &'a str,
    graph: SyntaxGraph,
}

impl<'a> Normalizer<'a> {
    pub fn new(spec: &'a GrammarSpec, src: &'a str) -> Self {
        Self {
            spec,
            src,
            graph: SyntaxGraph::new(),
        }
    }

    pub fn run(mut self, root: TsNode<'a>) -> SyntaxGraph {
        let module = self.graph.push(NodeKind::Module, span_of(root));
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            let id = self.normalize(child, false);
            self.graph.node_mut(module).children.push(id);
        }
        self.graph
    }

    fn normalize(&mut self, node: TsNode<'a>, in_parameter_container: bool) -> NodeId {
        let kind = node.kind();
        let spec = self.spec;

        if spec.function_kinds.contains(&kind) {
            return self.normalize_function(node);
        }
        if spec.lambda_kinds.contains(&kind) {
            return self.normalize_container(node, NodeKind::Lambda);
        }
        if spec.class_kinds.contains(&kind) {
            return self.normalize_container(node, NodeKind::Class);
        }
        if let Some(call) = spec.call_spec(kind) {
            return self.normalize_call(node, call);
        }
        if let Some(assign) = spec.assign_spec(kind) {
            return self.normalize_assignment(node, assign);
        }
        if let Some(decl) = spec.decl_spec(kind) {
            return self.normalize_declaration(node, decl);
        }
        if let Some(member) = spec.member_spec(kind) {
            return self.normalize_member_access(node, member);
        }
        if let Some(param) = spec.param_spec(kind) {
            return self.normalize_parameter(node, param);
        }
        if spec.identifier_kinds.contains(&kind) {
            let normalized_kind = if in_parameter_container {
                NodeKind::Parameter
            } else {
                NodeKind::Identifier
            };
            let id = self.graph.push(normalized_kind, span_of(node));
            self.graph.node_mut(id).name = Some(raw_text(node, self.src).to_string());
            return id;
        }
        if spec.literal_kinds.contains(&kind) {
            // Children still walked: f-strings and template strings embed
            // interpolated identifiers that must keep flowing.
            let id = self.normalize_children(node, NodeKind::Literal);
            self.graph.node_mut(id).value = Some(raw_text(node, self.src).to_string());
            return id;
        }
        if spec.conditional_kinds.contains(&kind) {
            return self.normalize_children(node, NodeKind::Conditional);
        }
        if spec.loop_kinds.contains(&kind) {
            let id = self.normalize_children(node, NodeKind::Loop);
            // Loop back-reference, recorded as an edge rather than a child
            // link so the tree stays acyclic.
            self.graph
                .control_flow
                .push(crate::domain::syntax::ControlFlowEdge { from: id, to: id });
            return id;
        }
        if spec.return_kinds.contains(&kind) {
            return self.normalize_children(node, NodeKind::Return);
        }
        if spec.import_kinds.contains(&kind) {
            let aliases = (spec.collect_imports)(node, self.src);
            self.graph.aliases.extend(aliases);
            return self.normalize_children(node, NodeKind::Import);
        }

        let container = in_parameter_container || spec.parameter_containers.contains(&kind);
        self.normalize_children_with(node, NodeKind::Other, container)
    }

    fn normalize_children(&mut self, node: TsNode<'a>, kind: NodeKind) -> NodeId {
        self.normalize_children_with(node, kind, false)
    }

    fn normalize_children_with(
        &mut self,
        node: TsNode<'a>,
        kind: NodeKind,
        in_parameter_container: bool,
    ) -> NodeId {
        let id = self.graph.push(kind, span_of(node));
        let mut cursor = node.walk();
        let children: Vec<TsNode<'a>> = node.named_children(&mut cursor).collect();
        for child in children {
            let child_id = self.normalize(child, in_parameter_container);
            self.graph.node_mut(id).children.push(child_id);
        }
        id
    }

    fn normalize_function(&mut self, node: TsNode<'a>) -> NodeId {
        let id = self.normalize_children_with(node, NodeKind::Function, false);
        let name = node
            .child_by_field_name("name")
            .map(|n| path_text(n, self.src))
            .or_else(|| {
                first_identifier(node, self.spec.identifier_kinds)
                    .map(|n| raw_text(n, self.src).to_string())
            });
        self.graph.node_mut(id).name = name;
        id
    }

    fn normalize_container(&mut self, node: TsNode<'a>, kind: NodeKind) -> NodeId {
        let id = self.normalize_children_with(node, kind, false);
        if let Some(name) = node.child_by_field_name("name") {
            self.graph.node_mut(id).name = Some(path_text(name, self.src));
        }
        id
    }

    fn normalize_call(&mut self, node: TsNode<'a>, call: &CallSpec) -> NodeId {
        let callee = if let Some(field) = call.callee_field {
            node.child_by_field_name(field)
                .map(|n| path_text(n, self.src))
        } else {
            let method = call
                .method_field
                .and_then(|f| node.child_by_field_name(f))
                .map(|n| path_text(n, self.src));
            let object = call
                .object_field
                .and_then(|f| node.child_by_field_name(f))
                .map(|n| path_text(n, self.src));
            match (object, method) {
                (Some(obj), Some(m)) => Some(format!("{obj}.{m}")),
                (None, Some(m)) => Some(m),
                _ => None,
            }
        };

        let id = self.normalize_children_with(node, NodeKind::Call, false);
        self.graph.node_mut(id).callee = callee;
        id
    }

    fn normalize_assignment(&mut self, node: TsNode<'a>, assign: &AssignSpec) -> NodeId {
        let id = self.graph.push(NodeKind::Assignment, span_of(node));
        let name = node
            .child_by_field_name(assign.left_field)
            .map(|n| path_text(n, self.src));
        if let Some(annotation) = node.child_by_field_name("type") {
            self.graph.node_mut(id).annotation = Some(path_text(annotation, self.src));
        }
        self.graph.node_mut(id).name = name;

        // Child order is load-bearing: dataflow reads [lhs, rhs].
        if let Some(left) = node.child_by_field_name(assign.left_field) {
            let left_id = self.normalize(left, false);
            self.graph.node_mut(id).children.push(left_id);
        }
        if let Some(right) = node.child_by_field_name(assign.right_field) {
            let right_id = self.normalize(right, false);
            self.graph.node_mut(id).children.push(right_id);
        }
        id
    }

    fn normalize_declaration(&mut self, node: TsNode<'a>, decl: &DeclSpec) -> NodeId {
        let id = self.graph.push(NodeKind::Declaration, span_of(node));
        let name = node
            .child_by_field_name(decl.name_field)
            .map(|n| path_text(n, self.src))
            .or_else(|| {
                first_identifier(node, self.spec.identifier_kinds)
                    .map(|n| raw_text(n, self.src).to_string())
            });
        self.graph.node_mut(id).name = name;
        if let Some(type_field) = decl.type_field {
            if let Some(annotation) = node.child_by_field_name(type_field) {
                self.graph.node_mut(id).annotation = Some(path_text(annotation, self.src));
            }
        }

        let value = decl
            .value_field
            .and_then(|f| node.child_by_field_name(f))
            .or_else(|| {
                // Declarators without a value field keep the initializer as
                // their last named child (C# equals_value_clause).
                let mut cursor = node.walk();
                let last = node.named_children(&mut cursor).last();
                last.filter(|n| {
                    decl.name_field != n.kind() && !self.spec.identifier_kinds.contains(&n.kind())
                })
            });
        if let Some(value) = value {
            let value_id = self.normalize(value, false);
            self.graph.node_mut(id).children.push(value_id);
        }
        id
    }

    fn normalize_member_access(&mut self, node: TsNode<'a>, member: &MemberSpec) -> NodeId {
        let id = self.graph.push(NodeKind::MemberAccess, span_of(node));
        self.graph.node_mut(id).name = Some(path_text(node, self.src));

        // Keep the object side walked so chained calls inside it are seen;
        // the member name itself is already captured above.
        if let Some(object) = node.child_by_field_name(member.object_field) {
            if object.kind() != "identifier" {
                let object_id = self.normalize(object, false);
                self.graph.node_mut(id).children.push(object_id);
            }
        }
        let _ = member.member_field;
        id
    }

    fn normalize_parameter(&mut self, node: TsNode<'a>, param: &ParamSpec) -> NodeId {
        let id = self.graph.push(NodeKind::Parameter, span_of(node));
        let name = param
            .name_field
            .and_then(|f| node.child_by_field_name(f))
            .and_then(|n| first_identifier(n, self.spec.identifier_kinds))
            .or_else(|| first_identifier(node, self.spec.identifier_kinds))
            .map(|n| raw_text(n, self.src).to_string());
        self.graph.node_mut(id).name = name;
        if let Some(type_field) = param.type_field {
            if let Some(annotation) = node.child_by_field_name(type_field) {
                self.graph.node_mut(id).annotation = Some(path_text(annotation, self.src));
            }
        }
        id
    }
}

/// Fallback import collector for languages without alias-style imports.
pub fn no_imports(_node: TsNode<'_>, _src: &str) -> Vec<(String, String)> {
    Vec::new()
}
