//! C# frontend
//!
//! `variable_declarator` carries its initializer in an `equals_value_clause`
//! rather than a direct field, which the shared normalizer handles through
//! its last-named-child fallback.

use tree_sitter::Node as TsNode;

use crate::domain::value_objects::Language;

use super::grammar::{AssignSpec, CallSpec, DeclSpec, GrammarSpec, MemberSpec, ParamSpec};

pub fn spec() -> &'static GrammarSpec {
    static SPEC: GrammarSpec = GrammarSpec {
        language: Language::CSharp,
        function_kinds: &[
            "method_declaration",
            "constructor_declaration",
            "local_function_statement",
            "accessor_declaration",
        ],
        lambda_kinds: &["lambda_expression", "anonymous_method_expression"],
        class_kinds: &[
            "class_declaration",
            "struct_declaration",
            "interface_declaration",
            "record_declaration",
        ],
        calls: &[
            CallSpec {
                kind: "invocation_expression",
                callee_field: Some("function"),
                object_field: None,
                method_field: None,
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
            value_field: None,
            type_field: None,
        }],
        member_accesses: &[MemberSpec {
            kind: "member_access_expression",
            object_field: "expression",
            member_field: "name",
        }],
        identifier_kinds: &["identifier"],
        literal_kinds: &[
            "string_literal",
            "verbatim_string_literal",
            "interpolated_string_expression",
            "integer_literal",
            "real_literal",
            "character_literal",
            "boolean_literal",
            "null_literal",
        ],
        conditional_kinds: &[
            "if_statement",
            "switch_statement",
            "switch_expression",
            "conditional_expression",
        ],
        loop_kinds: &[
            "for_statement",
            "foreach_statement",
            "while_statement",
            "do_statement",
        ],
        return_kinds: &["return_statement"],
        import_kinds: &["using_directive"],
        parameters: &[ParamSpec {
            kind: "parameter",
            name_field: Some("name"),
            type_field: Some("type"),
        }],
        parameter_containers: &["parameter_list", "bracketed_parameter_list"],
        collect_imports,
    };
    &SPEC
}

/// Only `using Alias = Some.Type;` binds a local name; plain namespace
/// usings open a namespace without aliasing anything.
fn collect_imports(node: TsNode<'_>, src: &str) -> Vec<(String, String)> {
    let raw = &src[node.start_byte()..node.end_byte().min(src.len())];
    let body = raw
        .trim_start_matches("global")
        .trim_start()
        .trim_start_matches("using")
        .trim_start()
        .trim_start_matches("static")
        .trim()
        .trim_end_matches(';')
        .trim();
    match body.split_once('=') {
        Some((alias, target)) => {
            let alias = alias.trim();
            let target = target.trim();
            if alias.is_empty() || target.is_empty() {
                Vec::new()
            } else {
                vec![(alias.to_string(), target.to_string())]
            }
        }
        None => Vec::new(),
    }
}
