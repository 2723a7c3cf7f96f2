//! TypeScript/TSX frontend
//!
//! Shares the ECMAScript surface with the JavaScript frontend (same call,
//! assignment, and member-access shapes) and additionally maps type
//! annotations on declarators and parameters.

use crate::domain::value_objects::Language;

use super::grammar::{AssignSpec, CallSpec, DeclSpec, GrammarSpec, MemberSpec, ParamSpec};
use super::javascript::collect_imports;

pub fn spec() -> &'static GrammarSpec {
    static SPEC: GrammarSpec = GrammarSpec {
        language: Language::TypeScript,
        function_kinds: &[
            "function_declaration",
            "method_definition",
            "function_expression",
            "generator_function_declaration",
        ],
        lambda_kinds: &["arrow_function"],
        class_kinds: &["class_declaration", "class", "interface_declaration"],
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
            type_field: Some("type"),
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
        parameters: &[
            ParamSpec {
                kind: "required_parameter",
                name_field: Some("pattern"),
                type_field: Some("type"),
            },
            ParamSpec {
                kind: "optional_parameter",
                name_field: Some("pattern"),
                type_field: Some("type"),
            },
        ],
        parameter_containers: &["formal_parameters"],
        collect_imports,
    };
    &SPEC
}
