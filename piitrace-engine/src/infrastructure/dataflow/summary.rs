//! Interprocedural summary fixpoint
//!
//! Round k analyzes every function against the round k-1 summaries, so a
//! taint label crosses at most one additional call boundary per round.
//! Iteration stops when the map stabilizes or the configured call depth is
//! exhausted; truncation is reported as a diagnostic, never an error.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::domain::finding::Diagnostic;
use crate::domain::symbol::GlobalSymbolId;
use crate::domain::syntax::{SourceFile, SyntaxGraph};

use crate::infrastructure::catalog::RuleCatalog;
use crate::infrastructure::resolver::{ProjectIndex, ResolvedFile};

use super::intra::FileAnalyzer;
use super::SummaryMap;

/// One file's inputs to the dataflow passes.
pub type FileUnit<'a> = (&'a SourceFile, &'a SyntaxGraph, &'a ResolvedFile);

#[derive(Debug, Default)]
pub struct SummaryOutcome {
    pub summaries: SummaryMap,
    pub diagnostics: Vec<Diagnostic>,
    /// Rounds actually run, for observability.
    pub rounds: usize,
}

#[instrument(skip_all, fields(files = units.len(), depth_limit))]
pub fn summarize(
    units: &[FileUnit<'_>],
    catalog: &RuleCatalog,
    index: &ProjectIndex,
    depth_limit: usize,
) -> SummaryOutcome {
    let mut summaries = SummaryMap::new();
    let mut rounds = 0;

    for round in 0..depth_limit.max(1) {
        rounds = round + 1;
        let next: SummaryMap = units
            .par_iter()
            .flat_map_iter(|&(file, graph, resolved)| {
                resolved.functions.iter().filter_map(|function| {
                    // Anonymous functions are never call targets by name.
                    let symbol = function.symbol?;
                    let analyzer = FileAnalyzer::for_summaries(
                        file,
                        graph,
                        resolved,
                        catalog,
                        Some(index),
                        &summaries,
                    );
                    let (summary, _) = analyzer.run_function(function.node);
                    Some((
                        GlobalSymbolId {
                            file: file.id,
                            symbol,
                        },
                        summary,
                    ))
                })
            })
            .collect();

        let converged = next == summaries;
        summaries = next;
        if converged {
            debug!(rounds, "summaries converged");
            return SummaryOutcome {
                summaries,
                diagnostics: Vec::new(),
                rounds,
            };
        }
    }

    // One more pass to find which functions were still changing when the
    // depth limit cut iteration off.
    let diagnostics = truncated_functions(units, catalog, index, &summaries, depth_limit);
    debug!(
        rounds,
        truncated = diagnostics.len(),
        "summary iteration stopped at depth limit"
    );
    SummaryOutcome {
        summaries,
        diagnostics,
        rounds,
    }
}

fn truncated_functions(
    units: &[FileUnit<'_>],
    catalog: &RuleCatalog,
    index: &ProjectIndex,
    summaries: &SummaryMap,
    depth_limit: usize,
) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = units
        .par_iter()
        .flat_map_iter(|&(file, graph, resolved)| {
            resolved.functions.iter().filter_map(|function| {
                let symbol = function.symbol?;
                let key = GlobalSymbolId {
                    file: file.id,
                    symbol,
                };
                let analyzer = FileAnalyzer::for_summaries(
                    file,
                    graph,
                    resolved,
                    catalog,
                    Some(index),
                    summaries,
                );
                let (summary, _) = analyzer.run_function(function.node);
                if summaries.get(&key) == Some(&summary) {
                    return None;
                }
                let name = function
                    .name
                    .clone()
                    .unwrap_or_else(|| "<anonymous>".to_string());
                Some(Diagnostic::CallDepthExceeded {
                    function: format!("{}:{}", file.display_path, name),
                    depth: depth_limit,
                })
            })
        })
        .collect();
    diagnostics.sort_by(|a, b| match (a, b) {
        (
            Diagnostic::CallDepthExceeded { function: fa, .. },
            Diagnostic::CallDepthExceeded { function: fb, .. },
        ) => fa.cmp(fb),
        _ => std::cmp::Ordering::Equal,
    });
    diagnostics
}
