//! Infrastructure layer: file loading, parsing, rule storage, and the
//! dataflow machinery behind the domain model.

pub mod aggregate;
pub mod catalog;
pub mod classify;
pub mod dataflow;
pub mod frontend;
pub mod loader;
pub mod resolver;
