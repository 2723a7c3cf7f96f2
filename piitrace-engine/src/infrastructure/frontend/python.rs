//! Python frontend
//!
//! Maps the tree-sitter-python grammar onto the shared vocabulary and
//! records `import` / `from ... import` aliases so sink matching sees
//! canonical dotted paths (`capture` resolves to
//! `sentry_sdk.capture_exception`).

use tree_sitter::Node as TsNode;

use crate::domain::value_objects::Language;

use super::grammar::{AssignSpec, CallSpec, GrammarSpec, MemberSpec, ParamSpec};

pub fn spec() -> &'static GrammarSpec {
    static SPEC: GrammarSpec = GrammarSpec {
        language: Language::Python,
        function_kinds: &["function_definition"],
        lambda_kinds: &[
            "lambda",
            "list_comprehension",
            "set_comprehension",
            "dictionary_comprehension",
            "generator_expression",
        ],
        class_kinds: &["class_definition"],
        calls: &[CallSpec {
            kind: "call",
            callee_field: Some("function"),
            object_field: None,
            method_field: None,
        }],
        assignments: &[
            AssignSpec {
                kind: "assignment",
                left_field: "left",
                right_field: "right",
            },
            AssignSpec {
                kind: "augmented_assignment",
                left_field: "left",
                right_field: "right",
            },
        ],
        declarations: &[],
        member_accesses: &[MemberSpec {
            kind: "attribute",
            object_field: "object",
            member_field: "attribute",
        }],
        identifier_kinds: &["identifier"],
        literal_kinds: &["string", "integer", "float", "true", "false", "none"],
        conditional_kinds: &["if_statement", "conditional_expression", "match_statement"],
        loop_kinds: &["for_statement", "while_statement"],
        return_kinds: &["return_statement"],
        import_kinds: &["import_statement", "import_from_statement"],
        parameters: &[
            ParamSpec {
                kind: "typed_parameter",
                name_field: None,
                type_field: Some("type"),
            },
            ParamSpec {
                kind: "default_parameter",
                name_field: Some("name"),
                type_field: None,
            },
            ParamSpec {
                kind: "typed_default_parameter",
                name_field: Some("name"),
                type_field: Some("type"),
            },
        ],
        parameter_containers: &["parameters", "lambda_parameters"],
        collect_imports,
    };
    &SPEC
}

fn text(node: TsNode<'_>, src: &str) -> String {
    src[node.start_byte()..node.end_byte().min(src.len())].to_string()
}

fn collect_imports(node: TsNode<'_>, src: &str) -> Vec<(String, String)> {
    let mut aliases = Vec::new();
    match node.kind() {
        // `import urllib.request as request` aliases request -> urllib.request
        "import_statement" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                if child.kind() == "aliased_import" {
                    if let (Some(name), Some(alias)) = (
                        child.child_by_field_name("name"),
                        child.child_by_field_name("alias"),
                    ) {
                        aliases.push((text(alias, src), text(name, src)));
                    }
                }
            }
        }
        // `from sentry_sdk import capture_exception [as capture]`
        "import_from_statement" => {
            let Some(module) = node.child_by_field_name("module_name") else {
                return aliases;
            };
            let module_name = text(module, src);
            let mut cursor = node.walk();
            for child in node.children_by_field_name("name", &mut cursor) {
                match child.kind() {
                    "dotted_name" | "identifier" => {
                        let imported = text(child, src);
                        aliases.push((imported.clone(), format!("{module_name}.{imported}")));
                    }
                    "aliased_import" => {
                        if let (Some(name), Some(alias)) = (
                            child.child_by_field_name("name"),
                            child.child_by_field_name("alias"),
                        ) {
                            aliases.push((
                                text(alias, src),
                                format!("{module_name}.{}", text(name, src)),
                            ));
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
    aliases
}
