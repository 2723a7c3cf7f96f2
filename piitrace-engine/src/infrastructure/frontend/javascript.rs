//! JavaScript/JSX frontend

use tree_sitter::Node as TsNode;

use crate::domain::value_objects::Language;

use super::grammar::{AssignSpec, CallSpec, DeclSpec, GrammarSpec, MemberSpec};

pub fn spec() -> &'static GrammarSpec {
    static SPEC: GrammarSpec = GrammarSpec {
        language: Language::JavaScript,
        function_kinds: &[
            "function_declaration",
            "method_definition",
            "function_expression",
            "generator_function_declaration",
        ],
        lambda_kinds: &["arrow_function"],
        class_kinds: &["class_declaration", "class"],
        calls: &[
            CallSpec {
                kind: "call_expression",
                callee_field: Some("function"),
                object_field: None,
                method_field: None,
            },
            CallSpec {
                kind: "new_expression",
                callee_field: Some("constructor"),
                object_field: None,
                method_field: None,
            },
        ],
        assignments: &[
            AssignSpec {
                kind: "assignment_expression",
                left_field: "left",
                right_field: "right",
            },
            AssignSpec {
                kind: "augmented_assignment_expression",
                left_field: "left",
                right_field: "right",
            },
        ],
        declarations: &[DeclSpec {
            kind: "variable_declarator",
            name_field: "name",
            value_field: Some("value"),
            type_field: None,
        }],
        member_accesses: &[MemberSpec {
            kind: "member_expression",
            object_field: "object",
            member_field: "property",
        }],
        identifier_kinds: &[
            "identifier",
            "property_identifier",
            "shorthand_property_identifier",
            "shorthand_property_identifier_pattern",
        ],
        literal_kinds: &[
            "string",
            "template_string",
            "number",
            "true",
            "false",
            "null",
            "undefined",
        ],
        conditional_kinds: &["if_statement", "ternary_expression", "switch_statement"],
        loop_kinds: &[
            "for_statement",
            "for_in_statement",
            "while_statement",
            "do_statement",
        ],
        return_kinds: &["return_statement"],
        import_kinds: &["import_statement"],
        parameters: &[],
        parameter_containers: &["formal_parameters"],
        collect_imports,
    };
    &SPEC
}

fn text(node: TsNode<'_>, src: &str) -> String {
    src[node.start_byte()..node.end_byte().min(src.len())].to_string()
}

/// Normalize a string-literal module specifier into a dotted path:
/// `'./lib/crypto'` becomes `lib.crypto`.
fn module_path(raw: &str) -> String {
    raw.trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim_start_matches("./")
        .trim_start_matches('/')
        .replace('/', ".")
}

/// Collect ES module aliases: default, namespace, and named imports.
pub(super) fn collect_imports(node: TsNode<'_>, src: &str) -> Vec<(String, String)> {
    let mut aliases = Vec::new();
    if node.kind() != "import_statement" {
        return aliases;
    }
    let Some(source) = node.child_by_field_name("source") else {
        return aliases;
    };
    let module = module_path(&text(source, src));

    let mut cursor = node.walk();
    for clause in node.named_children(&mut cursor) {
        match clause.kind() {
            "import_clause" => {
                let mut inner = clause.walk();
                for item in clause.named_children(&mut inner) {
                    match item.kind() {
                        // `import axios from 'axios'`
                        "identifier" => aliases.push((text(item, src), module.clone())),
                        // `import * as fs from 'fs'`
                        "namespace_import" => {
                            let mut ns = item.walk();
                            let name = item
                                .named_children(&mut ns)
                                .find(|n| n.kind() == "identifier");
                            if let Some(name) = name {
                                aliases.push((text(name, src), module.clone()));
                            }
                        }
                        // `import { writeFile as wf } from 'fs'`
                        "named_imports" => {
                            let mut named = item.walk();
                            for specifier in item.named_children(&mut named) {
                                if specifier.kind() != "import_specifier" {
                                    continue;
                                }
                                let Some(name) = specifier.child_by_field_name("name") else {
                                    continue;
                                };
                                let imported = text(name, src);
                                let local = specifier
                                    .child_by_field_name("alias")
                                    .map(|a| text(a, src))
                                    .unwrap_or_else(|| imported.clone());
                                aliases.push((local, format!("{module}.{imported}")));
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
    aliases
}
