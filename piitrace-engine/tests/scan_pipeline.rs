//! End-to-end scans over small source trees.

mod common;

use std::sync::atomic::AtomicBool;

use common::{scan, scan_with, write_tree};
use piitrace_core::config::ScanConfig;
use piitrace_engine::application::ScanRepositoryUseCase;
use piitrace_engine::domain::{Diagnostic, Sensitivity};

#[test]
fn tainted_variable_reaching_logger_is_reported() {
    let outcome = scan(&[(
        "app.py",
        "ssn = load_record()\nlogger.info(ssn)\n",
    )]);

    assert_eq!(outcome.findings.len(), 1);
    let finding = &outcome.findings[0];
    assert_eq!(finding.rule_id, "sink.python.logging");
    assert_eq!(finding.categories, vec!["ssn"]);
    assert_eq!(finding.sensitivity, Sensitivity::Critical);
    assert!(!finding.sanitized);
    assert_eq!(finding.sink.file, "app.py");
    assert_eq!(finding.sink.line, 2);
    assert_eq!(finding.source.line, 1);
    assert_eq!(finding.code_segment, "logger.info(ssn)");
    assert_eq!(finding.fingerprint.len(), 64);
}

#[test]
fn fully_neutralizing_sanitizer_clears_the_flow() {
    let outcome = scan(&[(
        "app.py",
        "ssn = load_record()\nsafe = encrypt(ssn)\nlogger.info(safe)\n",
    )]);
    assert!(outcome.findings.is_empty());
    // The identifier occurrence is still inventoried.
    assert!(outcome.occurrences.iter().any(|o| o.category == "ssn"));
}

#[test]
fn partial_sanitizer_keeps_a_flagged_finding() {
    let outcome = scan(&[(
        "app.py",
        "ssn = load_record()\nshown = mask(ssn)\nlogger.info(shown)\n",
    )]);
    assert_eq!(outcome.findings.len(), 1);
    assert!(outcome.findings[0].sanitized);
}

#[test]
fn unsanitized_branch_wins_over_sanitized_branch() {
    let source = "\
ssn = load_record()
if flag:
    value = encrypt(ssn)
else:
    value = ssn
logger.info(value)
";
    let outcome = scan(&[("app.py", source)]);
    assert_eq!(outcome.findings.len(), 1);
    assert!(!outcome.findings[0].sanitized);
    assert_eq!(outcome.findings[0].categories, vec!["ssn"]);
}

#[test]
fn function_called_twice_reports_one_finding() {
    let source = "\
def notify(email):
    logger.info(email)

notify(first)
notify(second)
";
    let outcome = scan(&[("app.py", source)]);
    let email_findings: Vec<_> = outcome
        .findings
        .iter()
        .filter(|f| f.categories.contains(&"email".to_string()))
        .collect();
    assert_eq!(email_findings.len(), 1);
    assert_eq!(email_findings[0].sink.line, 2);
}

#[test]
fn taint_crosses_function_returns() {
    let source = "\
def get_ssn():
    ssn = fetch()
    return ssn

def main():
    record = get_ssn()
    logger.info(record)
";
    let outcome = scan(&[("app.py", source)]);
    assert_eq!(outcome.findings.len(), 1);
    let finding = &outcome.findings[0];
    assert_eq!(finding.categories, vec!["ssn"]);
    assert_eq!(finding.sink.line, 7);
}

#[test]
fn tainted_argument_reaches_a_sink_inside_the_callee() {
    let source = "\
def emit(value):
    logger.info(value)

ssn = load_record()
emit(ssn)
";
    let outcome = scan(&[("app.py", source)]);
    assert_eq!(outcome.findings.len(), 1);
    let finding = &outcome.findings[0];
    assert_eq!(finding.rule_id, "sink.python.logging");
    assert_eq!(finding.categories, vec!["ssn"]);
    // Reported at the sink inside the callee, traced to the caller's source.
    assert_eq!(finding.sink.line, 2);
    assert_eq!(finding.source.line, 4);
}

#[test]
fn same_argument_passed_twice_collapses_on_the_callee_sink() {
    let source = "\
def emit(value):
    logger.info(value)

ssn = load_record()
emit(ssn)
emit(ssn)
";
    let outcome = scan(&[("app.py", source)]);
    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(outcome.findings[0].sink.line, 2);
}

#[test]
fn argument_taint_flows_through_intermediate_callees() {
    let source = "\
def inner(value):
    logger.info(value)

def outer(value):
    inner(value)

ssn = load_record()
outer(ssn)
";
    let outcome = scan(&[("app.py", source)]);
    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(outcome.findings[0].categories, vec!["ssn"]);
    assert_eq!(outcome.findings[0].sink.line, 2);
}

#[test]
fn calls_into_unknown_libraries_do_not_crash_or_report() {
    let outcome = scan(&[(
        "app.py",
        "import requests\ndata = requests.helpers.normalize(value)\nresult = data.unwrap()\n",
    )]);
    assert!(outcome.findings.is_empty());
}

#[test]
fn import_alias_resolves_to_canonical_sink_path() {
    let outcome = scan(&[(
        "app.py",
        "import logging as log_mod\nssn = load_record()\nlog_mod.info(ssn)\n",
    )]);
    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(outcome.findings[0].rule_id, "sink.python.logging");
}

#[test]
fn typescript_console_sink() {
    let outcome = scan(&[(
        "web/user.ts",
        "const ssn = fetchSsn();\nconsole.log(ssn);\n",
    )]);
    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(outcome.findings[0].rule_id, "sink.js.console");
    assert_eq!(outcome.findings[0].sink.file, "web/user.ts");
}

#[test]
fn java_method_parameter_to_logger() {
    let source = "\
class Handler {
    void process(String ssn) {
        logger.info(ssn);
    }
}
";
    let outcome = scan(&[("Handler.java", source)]);
    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(outcome.findings[0].rule_id, "sink.java.logging");
}

#[test]
fn ruby_rails_logger_sink() {
    let source = "\
def save(ssn)
  Rails.logger.info(ssn)
end
";
    let outcome = scan(&[("app/models/person.rb", source)]);
    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(outcome.findings[0].rule_id, "sink.ruby.logging");
}

#[test]
fn csharp_console_sink() {
    let source = "\
class Exporter {
    void Run() {
        var ssn = Fetch();
        Console.WriteLine(ssn);
    }
}
";
    let outcome = scan(&[("Exporter.cs", source)]);
    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(outcome.findings[0].rule_id, "sink.csharp.logging");
}

#[test]
fn field_store_taints_only_that_field() {
    let source = "\
user.ssn = load_record()
logger.info(user.ssn)
logger.warning(user.country)
";
    let outcome = scan(&[("app.py", source)]);
    // `user.ssn` flows to line 2. `user.country` is clean; the bare `user`
    // object never carried whole-object taint.
    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(outcome.findings[0].sink.line, 2);
}

#[test]
fn occurrences_are_inventoried_without_any_sink() {
    let outcome = scan(&[(
        "model.py",
        "email = row[0]\nphone_number = row[1]\n",
    )]);
    assert!(outcome.findings.is_empty());
    let categories: Vec<&str> = outcome
        .occurrences
        .iter()
        .map(|o| o.category.as_str())
        .collect();
    assert!(categories.contains(&"email"));
    assert!(categories.contains(&"phone"));
}

#[test]
fn suppressed_fingerprints_are_dropped() {
    let files = [(
        "app.py",
        "ssn = load_record()\nlogger.info(ssn)\n",
    )];
    let first = scan(&files);
    assert_eq!(first.findings.len(), 1);

    let config = ScanConfig {
        skip_fingerprints: vec![first.findings[0].fingerprint.clone()],
        ..Default::default()
    };
    let second = scan_with(config, &files);
    assert!(second.findings.is_empty());
}

#[test]
fn skip_rules_disable_matching_sources() {
    let config = ScanConfig {
        skip_rules: vec!["pii.ssn".to_string()],
        ..Default::default()
    };
    let outcome = scan_with(
        config,
        &[("app.py", "ssn = load_record()\nlogger.info(ssn)\n")],
    );
    assert!(outcome.findings.is_empty());
}

#[test]
fn file_budget_skips_the_tail_with_diagnostics() {
    let config = ScanConfig {
        max_files: 1,
        ..Default::default()
    };
    let outcome = scan_with(
        config,
        &[
            ("a.py", "x = 1\n"),
            ("b.py", "ssn = load_record()\nlogger.info(ssn)\n"),
        ],
    );
    assert!(outcome
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::BudgetSkipped { file } if file == "b.py")));
    assert!(outcome.findings.is_empty());
}

#[test]
fn cancelled_scan_flushes_diagnostics_instead_of_failing() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(
        dir.path(),
        &[
            ("a.py", "ssn = load_record()\nlogger.info(ssn)\n"),
            ("b.py", "email = row[0]\n"),
        ],
    );

    let cancel = AtomicBool::new(true);
    let outcome = ScanRepositoryUseCase::new(ScanConfig::default())
        .unwrap()
        .execute_with_cancel(dir.path(), &cancel)
        .unwrap();

    // Nothing was analyzed, but the scan still returns what it had: loader
    // stats plus a skip diagnostic per unprocessed file.
    assert!(outcome.findings.is_empty());
    assert!(outcome.occurrences.is_empty());
    let skipped = outcome
        .diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::BudgetSkipped { .. }))
        .count();
    assert_eq!(skipped, 2);
    assert_eq!(outcome.stats.total.file_count, 2);
}

#[test]
fn language_exclusion_filters_files() {
    let config = ScanConfig {
        exclude_languages: vec!["python".to_string()],
        ..Default::default()
    };
    let outcome = scan_with(
        config,
        &[
            ("app.py", "ssn = load_record()\nlogger.info(ssn)\n"),
            ("web.js", "const ssn = fetchSsn();\nconsole.log(ssn);\n"),
        ],
    );
    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(outcome.findings[0].sink.file, "web.js");
}

#[test]
fn stats_count_files_and_lines_per_language() {
    let outcome = scan(&[
        ("a.py", "x = 1\ny = 2\n"),
        ("b.rb", "z = 3\n"),
    ]);
    assert_eq!(outcome.stats.total.file_count, 2);
    let python = &outcome.stats.per_language[&piitrace_engine::Language::Python];
    assert_eq!(python.file_count, 1);
    assert!(outcome.rule_version.starts_with("2026"));
}

#[test]
fn taint_assigned_late_in_a_loop_reaches_earlier_uses() {
    let source = "\
ssn = load_record()
while more:
    logger.info(buffer)
    buffer = ssn
";
    let outcome = scan(&[("app.py", source)]);
    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(outcome.findings[0].sink.line, 3);
}

#[test]
fn deep_call_chains_flow_within_the_depth_limit() {
    let source = "\
def f1(value):
    return value

def f2(value):
    return f1(value)

def f3(value):
    return f2(value)

ssn = load_record()
out = f3(ssn)
logger.info(out)
";
    let outcome = scan(&[("app.py", source)]);
    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(outcome.findings[0].categories, vec!["ssn"]);
}

#[test]
fn exhausted_call_depth_is_diagnosed_not_fatal() {
    let source = "\
def f1(value):
    return value

def f2(value):
    return f1(value)

def f3(value):
    return f2(value)

def f4(value):
    return f3(value)
";
    let config = ScanConfig {
        call_depth_limit: 2,
        ..Default::default()
    };
    let outcome = scan_with(config, &[("chain.py", source)]);
    assert!(outcome
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::CallDepthExceeded { depth: 2, .. })));
}

#[test]
fn recursive_functions_terminate() {
    let source = "\
def ping(value):
    return pong(value)

def pong(value):
    return ping(value)

ssn = load_record()
logger.info(ping(ssn))
";
    let outcome = scan(&[("app.py", source)]);
    // Mutual recursion converges instead of looping; the call never
    // produces a value, so nothing reaches the logger.
    assert!(outcome.findings.is_empty());
    assert!(outcome.occurrences.iter().any(|o| o.category == "ssn"));
    assert!(!outcome
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::CallDepthExceeded { .. })));
}

#[test]
fn findings_sorted_by_sink_position() {
    let source = "\
ssn = load_record()
logger.info(ssn)
email = row[0]
logger.warning(email)
";
    let outcome = scan(&[("app.py", source)]);
    assert_eq!(outcome.findings.len(), 2);
    assert!(outcome.findings[0].sink.line < outcome.findings[1].sink.line);
}
