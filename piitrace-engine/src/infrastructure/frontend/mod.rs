//! Language frontends
//!
//! One [`Frontend`] per source file: a tree-sitter parser wired to the
//! grammar spec for that file's language. Parsing never aborts a scan; a
//! file the grammar cannot handle surfaces as a diagnostic upstream.

use thiserror::Error;
use tracing::trace;

use crate::domain::syntax::{SourceFile, SyntaxGraph};
use crate::domain::value_objects::Language;

pub mod grammar;

mod csharp;
mod java;
mod javascript;
mod python;
mod ruby;
mod typescript;

pub use grammar::{GrammarSpec, Normalizer};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("grammar for {0} rejected by tree-sitter")]
    Grammar(Language),
    #[error("parser produced no tree for {path}")]
    NoTree { path: String },
}

/// Parser plus normalization table for one language.
pub struct Frontend {
    parser: tree_sitter::Parser,
    spec: &'static GrammarSpec,
}

impl Frontend {
    /// Build a frontend for `file`, picking the TSX grammar for `.tsx`
    /// files since JSX syntax is not valid under the plain TS grammar.
    pub fn for_file(file: &SourceFile) -> Result<Self, ParseError> {
        let tsx = file
            .path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tsx"));
        Self::new(file.language, tsx)
    }

    pub fn new(language: Language, tsx: bool) -> Result<Self, ParseError> {
        let ts_language: tree_sitter::Language = match language {
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::TypeScript => {
                if tsx {
                    tree_sitter_typescript::LANGUAGE_TSX.into()
                } else {
                    tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
                }
            }
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::Java => tree_sitter_java::LANGUAGE.into(),
            Language::Ruby => tree_sitter_ruby::LANGUAGE.into(),
            Language::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
        };
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&ts_language)
            .map_err(|_| ParseError::Grammar(language))?;
        Ok(Self {
            parser,
            spec: spec_for(language),
        })
    }

    /// Parse and normalize one file. tree-sitter recovers from local
    /// syntax errors, so a tree with ERROR nodes is still analyzed.
    pub fn parse(&mut self, file: &SourceFile) -> Result<SyntaxGraph, ParseError> {
        let tree = self
            .parser
            .parse(&file.text, None)
            .ok_or_else(|| ParseError::NoTree {
                path: file.display_path.clone(),
            })?;
        let root = tree.root_node();
        if root.has_error() {
            trace!(path = %file.display_path, "parse tree contains error nodes");
        }
        Ok(Normalizer::new(self.spec, &file.text).run(root))
    }
}

fn spec_for(language: Language) -> &'static GrammarSpec {
    match language {
        Language::Python => python::spec(),
        Language::TypeScript => typescript::spec(),
        Language::JavaScript => javascript::spec(),
        Language::Java => java::spec(),
        Language::Ruby => ruby::spec(),
        Language::CSharp => csharp::spec(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::domain::syntax::{FileId, NodeKind, SourceFile};

    fn parse(language: Language, ext: &str, text: &str) -> SyntaxGraph {
        let file = SourceFile::new(
            FileId(0),
            PathBuf::from(format!("test.{ext}")),
            format!("test.{ext}"),
            language,
            text.to_string(),
        );
        let mut frontend = Frontend::for_file(&file).expect("frontend");
        frontend.parse(&file).expect("parse")
    }

    fn kinds(graph: &SyntaxGraph) -> Vec<NodeKind> {
        graph.iter().map(|n| n.kind).collect()
    }

    #[test]
    fn python_call_and_assignment_normalize() {
        let graph = parse(Language::Python, "py", "ssn = fetch()\nlogger.info(ssn)\n");
        let ks = kinds(&graph);
        assert!(ks.contains(&NodeKind::Assignment));
        let call = graph
            .iter()
            .find(|n| n.kind == NodeKind::Call && n.callee.as_deref() == Some("logger.info"))
            .expect("logger.info call");
        assert!(call.callee.is_some());
    }

    #[test]
    fn python_import_aliases_recorded() {
        let graph = parse(
            Language::Python,
            "py",
            "from sentry_sdk import capture_exception as capture\n",
        );
        assert!(graph
            .aliases
            .iter()
            .any(|(a, t)| a == "capture" && t == "sentry_sdk.capture_exception"));
    }

    #[test]
    fn typescript_parameter_annotation_survives() {
        let graph = parse(
            Language::TypeScript,
            "ts",
            "function save(email: string) { return email; }\n",
        );
        let param = graph
            .iter()
            .find(|n| n.kind == NodeKind::Parameter)
            .expect("parameter node");
        assert_eq!(param.name.as_deref(), Some("email"));
        assert!(param.annotation.as_deref().is_some_and(|t| t.contains("string")));
    }

    #[test]
    fn tsx_grammar_selected_for_tsx_files() {
        let graph = parse(
            Language::TypeScript,
            "tsx",
            "export function Row({ ssn }: Props) { return <td>{ssn}</td>; }\n",
        );
        assert!(!graph.is_empty());
    }

    #[test]
    fn javascript_named_import_alias() {
        let graph = parse(
            Language::JavaScript,
            "js",
            "import { writeFile as wf } from 'fs';\nwf(p, data);\n",
        );
        assert!(graph
            .aliases
            .iter()
            .any(|(a, t)| a == "wf" && t == "fs.writeFile"));
        assert_eq!(graph.canonical_path("wf"), "fs.writeFile");
    }

    #[test]
    fn javascript_namespace_import_alias() {
        let graph = parse(
            Language::JavaScript,
            "js",
            "import * as fs from 'fs';\nfs.writeFile(p, data);\n",
        );
        assert!(graph.aliases.iter().any(|(a, t)| a == "fs" && t == "fs"));
        assert_eq!(graph.canonical_path("fs.writeFile"), "fs.writeFile");
    }

    #[test]
    fn java_method_invocation_joins_receiver() {
        let graph = parse(
            Language::Java,
            "java",
            "class A { void f() { logger.info(ssn); } }\n",
        );
        assert!(graph
            .iter()
            .any(|n| n.kind == NodeKind::Call && n.callee.as_deref() == Some("logger.info")));
    }

    #[test]
    fn ruby_receiver_call_and_instance_variable() {
        let graph = parse(
            Language::Ruby,
            "rb",
            "def save\n  Rails.logger.info(@ssn)\nend\n",
        );
        assert!(graph
            .iter()
            .any(|n| n.kind == NodeKind::Identifier && n.name.as_deref() == Some("@ssn")));
    }

    #[test]
    fn csharp_declarator_initializer_fallback() {
        let graph = parse(
            Language::CSharp,
            "cs",
            "class A { void F() { var ssn = Fetch(); Console.WriteLine(ssn); } }\n",
        );
        let decl = graph
            .iter()
            .find(|n| n.kind == NodeKind::Declaration)
            .expect("declaration");
        assert_eq!(decl.name.as_deref(), Some("ssn"));
        assert!(!decl.children.is_empty(), "initializer normalized");
    }

    #[test]
    fn loops_get_back_edge() {
        let graph = parse(
            Language::Python,
            "py",
            "while True:\n    x = y\n",
        );
        assert_eq!(graph.control_flow.len(), 1);
        assert_eq!(graph.control_flow[0].from, graph.control_flow[0].to);
    }
}
