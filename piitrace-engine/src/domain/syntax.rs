//! Normalized syntax graph
//!
//! Language frontends map every supported grammar onto this shared node
//! vocabulary so the resolver and dataflow engine can treat declarations,
//! assignments, calls, and member accesses uniformly.
//!
//! The graph is an index-keyed arena: nodes reference children by [`NodeId`],
//! never by pointer, so cross-references cannot form ownership cycles.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::value_objects::Language;

/// Stable id of a loaded source file within one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub u32);

/// Id of a node in a file's [`SyntaxGraph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Byte span within a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Shared node vocabulary across all language frontends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// File root.
    Module,
    /// Named function or method definition.
    Function,
    /// Anonymous function (lambda, closure, arrow function).
    Lambda,
    /// Class/type definition.
    Class,
    /// Variable declaration with an initializer (`let x = ...`, declarator).
    Declaration,
    /// Assignment to an existing binding or field.
    Assignment,
    /// Call expression.
    Call,
    /// Member access (`obj.field`, `recv.method`).
    MemberAccess,
    /// Plain identifier reference.
    Identifier,
    /// Literal value (string, number, boolean, template text).
    Literal,
    /// Branching construct (if/elif/else, switch, ternary, match).
    Conditional,
    /// Loop construct (for, while, do, comprehension).
    Loop,
    /// Return statement.
    Return,
    /// Import/using/require statement.
    Import,
    /// Formal parameter of a function.
    Parameter,
    /// Anything the vocabulary does not distinguish; children still walked.
    Other,
}

/// A node in the normalized syntax graph.
///
/// Metadata fields are populated depending on kind: `name` for identifiers,
/// declarations, functions, classes, parameters, and member accesses (full
/// dotted path); `callee` for calls; `value` for literals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub span: Span,
    pub children: Vec<NodeId>,
    /// Identifier or dotted path associated with the node.
    pub name: Option<String>,
    /// Dotted callee path for `Call` nodes, as written (pre-alias).
    pub callee: Option<String>,
    /// Literal text for `Literal` nodes.
    pub value: Option<String>,
    /// Static type annotation text for declarations and parameters.
    pub annotation: Option<String>,
}

/// Direction-tagged control-flow edge, kept out of the parent/child tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlFlowEdge {
    pub from: NodeId,
    pub to: NodeId,
}

/// Normalized syntax graph for one source file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyntaxGraph {
    nodes: Vec<SyntaxNode>,
    /// Back-references for control flow (loop back-edges and the like).
    pub control_flow: Vec<ControlFlowEdge>,
    /// Import aliases established in this file: alias -> canonical dotted path.
    pub aliases: Vec<(String, String)>,
}

impl SyntaxGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node; children may be filled in afterwards via `node_mut`.
    pub fn push(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SyntaxNode {
            id,
            kind,
            span,
            children: Vec::new(),
            name: None,
            callee: None,
            value: None,
            annotation: None,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.0 as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut SyntaxNode {
        &mut self.nodes[id.0 as usize]
    }

    pub fn root(&self) -> Option<&SyntaxNode> {
        self.nodes.first()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.nodes.iter()
    }

    /// Resolve an alias chain (`alias -> canonical`) established by imports.
    ///
    /// Also canonicalizes dotted paths whose first segment is aliased:
    /// `req.get` becomes `urllib.request.get` when `req` aliases
    /// `urllib.request`.
    pub fn canonical_path<'a>(&self, name: &'a str) -> std::borrow::Cow<'a, str> {
        if let Some((_, canonical)) = self.aliases.iter().find(|(alias, _)| alias == name) {
            return std::borrow::Cow::Owned(canonical.clone());
        }
        if let Some((head, rest)) = name.split_once('.') {
            if let Some((_, canonical)) = self.aliases.iter().find(|(alias, _)| alias == head) {
                return std::borrow::Cow::Owned(format!("{canonical}.{rest}"));
            }
        }
        std::borrow::Cow::Borrowed(name)
    }
}

/// Byte-offset to 1-based line/column mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineIndex {
    /// Byte offset of the start of each line.
    line_starts: Vec<usize>,
    /// Lines with content; a trailing newline does not open a new line.
    line_count: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        let line_count = if text.is_empty() {
            0
        } else if text.ends_with('\n') {
            line_starts.len() - 1
        } else {
            line_starts.len()
        };
        Self {
            line_starts,
            line_count,
        }
    }

    /// 1-based (line, column) of a byte offset.
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (line + 1, offset - self.line_starts[line] + 1)
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Byte range of the full line containing `offset`, newline excluded.
    pub fn line_range(&self, offset: usize, text_len: usize) -> (usize, usize) {
        let (line, _) = self.position(offset);
        let start = self.line_starts[line - 1];
        let end = self
            .line_starts
            .get(line)
            .map(|next| next.saturating_sub(1))
            .unwrap_or(text_len);
        (start, end)
    }
}

/// A loaded source file. Immutable once constructed; downstream stages refer
/// to it by [`FileId`].
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: FileId,
    pub path: PathBuf,
    /// Path relative to the scan root, used in reported locations.
    pub display_path: String,
    pub language: Language,
    pub text: String,
    pub line_index: LineIndex,
}

impl SourceFile {
    pub fn new(id: FileId, path: PathBuf, display_path: String, language: Language, text: String) -> Self {
        let line_index = LineIndex::new(&text);
        Self {
            id,
            path,
            display_path,
            language,
            text,
            line_index,
        }
    }

    pub fn snippet(&self, span: Span) -> &str {
        &self.text[span.start.min(self.text.len())..span.end.min(self.text.len())]
    }

    /// The trimmed source line containing the start of `span`, with trailing
    /// separators stripped. Used for reported code segments.
    pub fn code_line(&self, span: Span) -> String {
        let (start, end) = self.line_index.line_range(span.start, self.text.len());
        self.text[start..end]
            .trim_matches(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_index_positions() {
        let idx = LineIndex::new("ab\ncd\n\nxyz");
        assert_eq!(idx.position(0), (1, 1));
        assert_eq!(idx.position(1), (1, 2));
        assert_eq!(idx.position(3), (2, 1));
        assert_eq!(idx.position(6), (3, 1));
        assert_eq!(idx.position(7), (4, 1));
        assert_eq!(idx.line_count(), 4);
    }

    #[test]
    fn trailing_newline_does_not_add_a_line() {
        assert_eq!(LineIndex::new("x = 1\n").line_count(), 1);
        assert_eq!(LineIndex::new("x = 1").line_count(), 1);
        assert_eq!(LineIndex::new("a\nb\n").line_count(), 2);
        assert_eq!(LineIndex::new("").line_count(), 0);
    }

    #[test]
    fn code_line_trims_separators() {
        let file = SourceFile::new(
            FileId(0),
            PathBuf::from("a.py"),
            "a.py".to_string(),
            Language::Python,
            "x = 1\n  log(ssn),\n".to_string(),
        );
        // Span inside the second line.
        let line = file.code_line(Span::new(8, 11));
        assert_eq!(line, "log(ssn)");
    }

    #[test]
    fn alias_canonicalization() {
        let mut graph = SyntaxGraph::new();
        graph
            .aliases
            .push(("req".to_string(), "urllib.request".to_string()));
        assert_eq!(graph.canonical_path("req"), "urllib.request");
        assert_eq!(graph.canonical_path("req.get"), "urllib.request.get");
        assert_eq!(graph.canonical_path("other.get"), "other.get");
    }
}
