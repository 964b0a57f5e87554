//! Error taxonomy for the availability engine.
//!
//! Only search failures ever reach the caller, and then only folded into
//! the `CONNECTION_FAILURE` verdict. Model failures resolve to the
//! deterministic classification fallback.

use thiserror::Error;

/// Failures talking to the external trademark search service.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The landing document did not carry the hidden session field.
    #[error("session token missing from landing page")]
    SessionUnavailable,

    /// Timeout, connection failure or non-success status.
    #[error("network error: {0}")]
    Network(String),
}

/// Failures of the generative classification backend.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The backend could not be reached or the call timed out.
    #[error("model unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with a non-success status.
    #[error("model request failed with HTTP {0}")]
    BadStatus(u16),
}
