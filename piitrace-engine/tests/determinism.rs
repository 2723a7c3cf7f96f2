//! Repeatability: identical inputs must produce identical reports.

mod common;

use common::{scan_with, write_tree};
use piitrace_core::config::ScanConfig;
use piitrace_engine::application::ScanRepositoryUseCase;
use proptest::prelude::*;

const TREE: &[(&str, &str)] = &[
    (
        "src/accounts.py",
        "def register(email, password):\n    logger.info(email)\n    store(password)\n",
    ),
    (
        "src/billing.py",
        "card_number = charge_input()\nsafe = encrypt(card_number)\nlogger.info(safe)\nlogger.info(card_number)\n",
    ),
    (
        "web/profile.ts",
        "const ssn = form.value;\nconsole.log(ssn);\n",
    ),
    (
        "app/jobs/export.rb",
        "def run(phone_number)\n  File.write(path, phone_number)\nend\n",
    ),
];

#[test]
fn repeated_scans_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path(), TREE);
    let scan = ScanRepositoryUseCase::new(ScanConfig::default()).unwrap();

    let first = scan.execute(dir.path()).unwrap();
    let second = scan.execute(dir.path()).unwrap();

    assert_eq!(first.findings, second.findings);
    assert_eq!(first.occurrences, second.occurrences);
    assert_eq!(first.diagnostics, second.diagnostics);
    assert!(!first.findings.is_empty());
}

#[test]
fn worker_count_does_not_change_the_report() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path(), TREE);

    let single = ScanRepositoryUseCase::new(ScanConfig {
        parallelism: 1,
        ..Default::default()
    })
    .unwrap()
    .execute(dir.path())
    .unwrap();

    let many = ScanRepositoryUseCase::new(ScanConfig {
        parallelism: 4,
        ..Default::default()
    })
    .unwrap()
    .execute(dir.path())
    .unwrap();

    assert_eq!(single.findings, many.findings);
    assert_eq!(single.occurrences, many.occurrences);
}

#[test]
fn fingerprints_survive_line_shifts() {
    let original = scan_with(
        ScanConfig::default(),
        &[("app.py", "ssn = load_record()\nlogger.info(ssn)\n")],
    );
    // Same statements, pushed down by a comment block.
    let shifted = scan_with(
        ScanConfig::default(),
        &[(
            "app.py",
            "# migration notes\n# see ticket 4821\nssn = load_record()\nlogger.info(ssn)\n",
        )],
    );
    assert_eq!(original.findings.len(), 1);
    assert_eq!(shifted.findings.len(), 1);
    assert_eq!(
        original.findings[0].fingerprint,
        shifted.findings[0].fingerprint
    );
    assert_ne!(original.findings[0].sink.line, shifted.findings[0].sink.line);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Any generated python module scans to the same report twice in a row.
    #[test]
    fn arbitrary_modules_scan_deterministically(
        names in prop::collection::vec("[a-z]{4,10}", 1..6),
    ) {
        let mut body = String::new();
        for (i, name) in names.iter().enumerate() {
            body.push_str(&format!("{name}_{i} = input_{i}\n"));
        }
        body.push_str("logger.info(payload)\n");

        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path(), &[("gen.py", body.as_str())]);
        let scan = ScanRepositoryUseCase::new(ScanConfig::default()).unwrap();
        let first = scan.execute(dir.path()).unwrap();
        let second = scan.execute(dir.path()).unwrap();
        prop_assert_eq!(first.findings, second.findings);
        prop_assert_eq!(first.occurrences, second.occurrences);
    }
}
