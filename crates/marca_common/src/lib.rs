//! Marca Common - shared types for the availability determination engine.
//!
//! Domain vocabulary (verdicts, Niza categories), the error taxonomy, the
//! static Niza class tables and the engine configuration. Both the engine
//! crate and the CLI depend on this.

pub mod category;
pub mod config;
pub mod error;
pub mod niza;
pub mod verdict;

pub use category::*;
pub use error::*;
pub use verdict::*;
