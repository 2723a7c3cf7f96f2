//! Piitrace Engine - Multi-language PII dataflow analysis
//!
//! Statically traces personally identifiable information from the places it
//! enters a codebase (identifiers, type annotations, and call-shaped
//! sources) to the places it leaves (logging, file writes, outbound HTTP,
//! persistent storage), across Python, TypeScript, JavaScript, Java, Ruby,
//! and C# sources.
//!
//! # Architecture
//!
//! - [`domain`] — pure data: normalized syntax graphs, symbols, rules,
//!   taint labels, findings
//! - [`infrastructure`] — file loading, tree-sitter frontends, the rule
//!   catalog, symbol resolution, the dataflow passes, classification, and
//!   deterministic aggregation
//! - [`application`] — the scan pipeline: parallel parse/resolve, a linking
//!   barrier, then parallel taint analysis
//!
//! # Example
//!
//! ```rust,no_run
//! use piitrace_core::config::ScanConfig;
//! use piitrace_engine::application::ScanRepositoryUseCase;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let scan = ScanRepositoryUseCase::new(ScanConfig::default())?;
//! let outcome = scan.execute(std::path::Path::new("./my-service"))?;
//! for finding in &outcome.findings {
//!     println!("{}: {} -> {}", finding.sensitivity, finding.source, finding.sink);
//! }
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{ScanError, ScanOutcome, ScanRepositoryUseCase};
pub use domain::{Diagnostic, Finding, Language, Location, PiiOccurrence, ScanStats, Sensitivity};
