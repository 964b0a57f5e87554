//! Availability determination engine.
//!
//! Combines evidence scraped from the IMPI Marcanet denomination search
//! with an AI-assisted Niza classification to produce a preliminary
//! availability signal. Both upstreams are unreliable and schema-less;
//! the engine always resolves to a discrete verdict and a fully populated
//! category, never an error.

pub mod cache;
pub mod classifier;
pub mod engine;
pub mod evidence;
pub mod marcanet;
pub mod normalizer;
pub mod ollama;

pub use engine::AvailabilityEngine;
