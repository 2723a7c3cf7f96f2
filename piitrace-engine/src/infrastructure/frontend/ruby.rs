//! Ruby frontend
//!
//! Ruby has no import aliasing (`require` binds nothing), and attribute
//! reads are receiver/method calls, so the member-access table is empty and
//! instance/class variables count as identifiers.

use crate::domain::value_objects::Language;

use super::grammar::{no_imports, AssignSpec, CallSpec, GrammarSpec, ParamSpec};

pub fn spec() -> &'static GrammarSpec {
    static SPEC: GrammarSpec = GrammarSpec {
        language: Language::Ruby,
        function_kinds: &["method", "singleton_method"],
        lambda_kinds: &["lambda", "block", "do_block"],
        class_kinds: &["class", "module"],
        calls: &[CallSpec {
            kind: "call",
            callee_field: None,
            object_field: Some("receiver"),
            method_field: Some("method"),
        }],
        assignments: &[
            AssignSpec {
                kind: "assignment",
                left_field: "left",
                right_field: "right",
            },
            AssignSpec {
                kind: "operator_assignment",
                left_field: "left",
                right_field: "right",
            },
        ],
        declarations: &[],
        member_accesses: &[],
        identifier_kinds: &[
            "identifier",
            "constant",
            "instance_variable",
            "class_variable",
            "global_variable",
        ],
        literal_kinds: &[
            "string",
            "integer",
            "float",
            "true",
            "false",
            "nil",
            "simple_symbol",
        ],
        conditional_kinds: &["if", "unless", "case", "conditional", "if_modifier"],
        loop_kinds: &["while", "until", "for", "while_modifier", "until_modifier"],
        return_kinds: &["return"],
        import_kinds: &[],
        parameters: &[
            ParamSpec {
                kind: "optional_parameter",
                name_field: Some("name"),
                type_field: None,
            },
            ParamSpec {
                kind: "keyword_parameter",
                name_field: Some("name"),
                type_field: None,
            },
        ],
        parameter_containers: &["method_parameters", "block_parameters", "lambda_parameters"],
        collect_imports: no_imports,
    };
    &SPEC
}
