//! Piitrace Core - Foundation crate for the piitrace analysis engine
//!
//! Shared functionality used by the engine crate:
//!
//! - [`config`] — Strongly-typed scan configuration with TOML support
//! - [`logging`] — Structured logging with tracing
//!
//! # Configuration
//!
//! ```rust
//! use piitrace_core::config::ScanConfig;
//!
//! let config = ScanConfig::default();
//! assert!(config.call_depth_limit > 0);
//! ```
//!
//! # Logging
//!
//! ```rust,ignore
//! piitrace_core::init_tracing("info")?;
//! ```

pub mod config;
pub mod logging;

pub use config::{ResolutionMode, ScanConfig};
pub use logging::init_tracing;
