//! Java frontend
//!
//! `method_invocation` splits receiver and method into separate fields, so
//! the call spec joins them into the dotted path the catalog matches on.

use tree_sitter::Node as TsNode;

use crate::domain::value_objects::Language;

use super::grammar::{AssignSpec, CallSpec, DeclSpec, GrammarSpec, MemberSpec, ParamSpec};

pub fn spec() -> &'static GrammarSpec {
    static SPEC: GrammarSpec = GrammarSpec {
        language: Language::Java,
        function_kinds: &["method_declaration", "constructor_declaration"],
        lambda_kinds: &["lambda_expression"],
        class_kinds: &[
            "class_declaration",
            "interface_declaration",
            "enum_declaration",
            "record_declaration",
        ],
        calls: &[
            CallSpec {
                kind: "method_invocation",
                callee_field: None,
                object_field: Some("object"),
                method_field: Some("name"),
            },
            CallSpec {
                kind: "object_creation_expression",
                callee_field: Some("type"),
                object_field: None,
                method_field: None,
            },
        ],
        assignments: &[AssignSpec {
            kind: "assignment_expression",
            left_field: "left",
            right_field: "right",
        }],
        declarations: &[DeclSpec {
            kind: "variable_declarator",
            name_field: "name",
            value_field: Some("value"),
            type_field: None,
        }],
        member_accesses: &[MemberSpec {
            kind: "field_access",
            object_field: "object",
            member_field: "field",
        }],
        identifier_kinds: &["identifier"],
        literal_kinds: &[
            "string_literal",
            "decimal_integer_literal",
            "decimal_floating_point_literal",
            "character_literal",
            "true",
            "false",
            "null_literal",
        ],
        conditional_kinds: &["if_statement", "switch_expression", "ternary_expression"],
        loop_kinds: &[
            "for_statement",
            "enhanced_for_statement",
            "while_statement",
            "do_statement",
        ],
        return_kinds: &["return_statement"],
        import_kinds: &["import_declaration"],
        parameters: &[ParamSpec {
            kind: "formal_parameter",
            name_field: Some("name"),
            type_field: Some("type"),
        }],
        parameter_containers: &["formal_parameters", "inferred_parameters", "lambda_parameters"],
        collect_imports,
    };
    &SPEC
}

/// `import a.b.C;` aliases `C -> a.b.C`; static imports alias the member.
fn collect_imports(node: TsNode<'_>, src: &str) -> Vec<(String, String)> {
    let raw = &src[node.start_byte()..node.end_byte().min(src.len())];
    let body = raw
        .trim_start_matches("import")
        .trim_start()
        .trim_start_matches("static")
        .trim()
        .trim_end_matches(';')
        .trim();
    if body.is_empty() || body.ends_with(".*") {
        return Vec::new();
    }
    match body.rsplit_once('.') {
        Some((_, last)) => vec![(last.to_string(), body.to_string())],
        None => Vec::new(),
    }
}
