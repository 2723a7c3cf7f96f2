//! Scan orchestration
//!
//! The pipeline has two parallel phases separated by a barrier:
//!
//! - Phase 1: per file, parse and resolve symbols. Workers never share
//!   mutable state; each produces an immutable unit.
//! - Barrier: link per-file tables into the cross-file module index and
//!   iterate function summaries to a fixpoint.
//! - Phase 2: per file, run the taint analysis against the shared read-only
//!   index and classify sink hits into findings.
//!
//! Budgets and cancellation are checked per unit. A stopped scan flushes
//! whatever completed and marks the rest with diagnostics instead of
//! failing the run.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use thiserror::Error;
use tracing::{info, instrument, warn};

use piitrace_core::config::{ConfigError, ScanConfig};

use crate::domain::finding::{Diagnostic, Finding, PiiOccurrence, ScanStats};
use crate::domain::syntax::{SourceFile, SyntaxGraph};
use crate::infrastructure::aggregate::{
    aggregate_diagnostics, aggregate_findings, aggregate_occurrences,
};
use crate::infrastructure::catalog::{CatalogError, RuleCatalog};
use crate::infrastructure::classify::{classify, suppress};
use crate::infrastructure::dataflow::{summarize, FileAnalyzer, FileUnit};
use crate::infrastructure::frontend::Frontend;
use crate::infrastructure::loader::{LoadError, SourceLoader};
use crate::infrastructure::resolver::{resolve_file, ProjectIndex, ResolvedFile};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Complete result of one scan.
#[derive(Debug)]
pub struct ScanOutcome {
    pub findings: Vec<Finding>,
    pub occurrences: Vec<PiiOccurrence>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: ScanStats,
    /// Version of the rule catalog the scan ran with.
    pub rule_version: String,
}

/// One file after phase 1.
struct Unit {
    file: SourceFile,
    graph: SyntaxGraph,
    resolved: ResolvedFile,
}

pub struct ScanRepositoryUseCase {
    config: ScanConfig,
}

impl ScanRepositoryUseCase {
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn execute(&self, root: &Path) -> Result<ScanOutcome, ScanError> {
        let never_cancelled = AtomicBool::new(false);
        self.execute_with_cancel(root, &never_cancelled)
    }

    /// Run the scan, stopping early when `cancel` flips or the configured
    /// time budget runs out. Completed units are kept either way.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn execute_with_cancel(
        &self,
        root: &Path,
        cancel: &AtomicBool,
    ) -> Result<ScanOutcome, ScanError> {
        let started = Instant::now();
        let deadline = match self.config.time_budget_secs {
            0 => None,
            secs => Some(started + Duration::from_secs(secs)),
        };

        let catalog = RuleCatalog::load(&self.config)?;
        let loader = SourceLoader::new(&self.config)?;
        let loaded = loader.load(root)?;
        let mut diagnostics = loaded.diagnostics;
        let stats = loaded.stats;

        // File budget: keep deterministic prefix order from the loader.
        let mut files = loaded.files;
        if self.config.max_files > 0 && files.len() > self.config.max_files {
            for file in files.drain(self.config.max_files..) {
                diagnostics.push(Diagnostic::BudgetSkipped {
                    file: file.display_path,
                });
            }
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.parallelism)
            .build()?;

        let stopped = |cancel: &AtomicBool| {
            cancel.load(Ordering::Relaxed)
                || deadline.is_some_and(|d| Instant::now() >= d)
        };

        // Phase 1: parse and resolve, one unit per file.
        enum Parsed {
            Unit(Box<Unit>),
            Skipped(Diagnostic),
        }
        let parsed: Vec<Parsed> = pool.install(|| {
            files
                .into_par_iter()
                .map(|file| {
                    if stopped(cancel) {
                        return Parsed::Skipped(Diagnostic::BudgetSkipped {
                            file: file.display_path,
                        });
                    }
                    let mut frontend = match Frontend::for_file(&file) {
                        Ok(frontend) => frontend,
                        Err(e) => {
                            return Parsed::Skipped(Diagnostic::ParseSkipped {
                                file: file.display_path,
                                detail: e.to_string(),
                            })
                        }
                    };
                    match frontend.parse(&file) {
                        Ok(graph) => {
                            let resolved = resolve_file(&file, &graph);
                            Parsed::Unit(Box::new(Unit {
                                file,
                                graph,
                                resolved,
                            }))
                        }
                        Err(e) => Parsed::Skipped(Diagnostic::ParseSkipped {
                            file: file.display_path,
                            detail: e.to_string(),
                        }),
                    }
                })
                .collect()
        });

        let mut units: Vec<Unit> = Vec::new();
        for item in parsed {
            match item {
                Parsed::Unit(unit) => units.push(*unit),
                Parsed::Skipped(diag) => diagnostics.push(diag),
            }
        }

        // Barrier: cross-file linking, then the summary fixpoint.
        let refs: Vec<(crate::domain::syntax::FileId, &ResolvedFile)> =
            units.iter().map(|u| (u.file.id, &u.resolved)).collect();
        let index = ProjectIndex::link(&refs, self.config.resolution_mode);

        let file_units: Vec<FileUnit<'_>> = units
            .iter()
            .map(|u| (&u.file, &u.graph, &u.resolved))
            .collect();
        let summary_outcome = pool.install(|| {
            summarize(&file_units, &catalog, &index, self.config.call_depth_limit)
        });
        diagnostics.extend(summary_outcome.diagnostics);
        let summaries = summary_outcome.summaries;

        // Phase 2: taint analysis and classification per file.
        struct Analyzed {
            findings: Vec<Finding>,
            occurrences: Vec<PiiOccurrence>,
            skipped: Option<Diagnostic>,
        }
        let analyzed: Vec<Analyzed> = pool.install(|| {
            units
                .par_iter()
                .map(|unit| {
                    if stopped(cancel) {
                        return Analyzed {
                            findings: Vec::new(),
                            occurrences: Vec::new(),
                            skipped: Some(Diagnostic::BudgetSkipped {
                                file: unit.file.display_path.clone(),
                            }),
                        };
                    }
                    let analysis = FileAnalyzer::new(
                        &unit.file,
                        &unit.graph,
                        &unit.resolved,
                        &catalog,
                        Some(&index),
                        &summaries,
                    )
                    .run();
                    let findings = classify(
                        unit.file.language,
                        &unit.file.display_path,
                        analysis.hits,
                    );
                    Analyzed {
                        findings,
                        occurrences: analysis.occurrences,
                        skipped: None,
                    }
                })
                .collect()
        });

        let mut findings = Vec::new();
        let mut occurrences = Vec::new();
        for item in analyzed {
            findings.extend(item.findings);
            occurrences.extend(item.occurrences);
            if let Some(diag) = item.skipped {
                diagnostics.push(diag);
            }
        }

        suppress(&mut findings, &mut occurrences, &self.config.skip_fingerprints);
        let findings = aggregate_findings(findings);
        let occurrences = aggregate_occurrences(occurrences);
        let diagnostics = aggregate_diagnostics(diagnostics);

        if cancel.load(Ordering::Relaxed) {
            warn!("scan cancelled; partial results flushed");
        }
        info!(
            findings = findings.len(),
            occurrences = occurrences.len(),
            diagnostics = diagnostics.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scan complete"
        );

        Ok(ScanOutcome {
            findings,
            occurrences,
            diagnostics,
            stats,
            rule_version: catalog.version().to_string(),
        })
    }
}
