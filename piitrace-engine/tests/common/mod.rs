//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::path::Path;

use piitrace_core::config::ScanConfig;
use piitrace_engine::application::{ScanOutcome, ScanRepositoryUseCase};

/// Write `files` into a fresh temp tree and scan it with `config`.
pub fn scan_with(config: ScanConfig, files: &[(&str, &str)]) -> ScanOutcome {
    let dir = tempfile::tempdir().expect("tempdir");
    write_tree(dir.path(), files);
    ScanRepositoryUseCase::new(config)
        .expect("valid config")
        .execute(dir.path())
        .expect("scan succeeds")
}

pub fn scan(files: &[(&str, &str)]) -> ScanOutcome {
    scan_with(ScanConfig::default(), files)
}

pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("mkdir");
        }
        std::fs::write(path, content).expect("write");
    }
}
