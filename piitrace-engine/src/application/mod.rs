//! Application layer: use cases orchestrating the scan pipeline.

pub mod use_cases;

pub use use_cases::{ScanError, ScanOutcome, ScanRepositoryUseCase};
