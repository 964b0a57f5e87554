//! Availability verdicts and the outward analysis result.

use serde::{Deserialize, Serialize};

use crate::category::NizaCategory;

/// Discrete outcome of a brand-availability lookup.
///
/// Exactly one value is always produced per analysis; session and network
/// failures surface as `ConnectionFailure`, never as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailabilityVerdict {
    /// No exact coincidence found in any query variant. Preliminary only.
    #[serde(rename = "AVAILABLE_PRELIMINARY")]
    AvailablePreliminary,

    /// At least one variant produced conflict evidence.
    #[serde(rename = "CONFLICT_FOUND")]
    ConflictFound,

    /// At least one variant could not be classified either way.
    #[serde(rename = "INCONCLUSIVE")]
    Inconclusive,

    /// The search service could not be reached or rejected the session.
    #[serde(rename = "CONNECTION_FAILURE")]
    ConnectionFailure,
}

impl std::fmt::Display for AvailabilityVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AvailabilityVerdict::AvailablePreliminary => "AVAILABLE_PRELIMINARY",
            AvailabilityVerdict::ConflictFound => "CONFLICT_FOUND",
            AvailabilityVerdict::Inconclusive => "INCONCLUSIVE",
            AvailabilityVerdict::ConnectionFailure => "CONNECTION_FAILURE",
        };
        write!(f, "{}", s)
    }
}

/// Composed result of one analysis request: search verdict plus suggested
/// Niza classification. Pure field assembly, no decision logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandAnalysis {
    pub verdict: AvailabilityVerdict,
    pub category: NizaCategory,
}
