//! Heuristic evidence classification of Marcanet search responses.
//!
//! The service returns unstructured JSF markup with no contract, so each
//! response goes through an ordered decision table of named signal checks.
//! Ordering matters: structured conflict markers rank first, explicit
//! empty markers next, size heuristics last. The terminal branch resolves
//! to `Uncertain` because telling a user a registered mark looks available
//! costs more than asking for a manual review.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use marca_common::verdict::AvailabilityVerdict;

/// Explicit result-count marker, e.g. "Total de registros = 3".
static RESULT_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)total\s+de\s+registros\s*[:=]\s*(\d+)").unwrap());

/// Record-type vocabulary that only appears on hit pages.
const RECORD_KEYWORDS: &[&str] = &[
    "expediente",
    "solicitud",
    "registro",
    "titular",
    "vigente",
    "en trámite",
];

/// Explicit empty-result phrasings observed across service revisions.
const EMPTY_MARKERS: &[&str] = &[
    "no se encontraron registros",
    "sin resultados",
    "0 resultados",
    "búsqueda sin resultados",
];

/// Outcome of classifying one variant's raw response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantOutcome {
    Conflict,
    NoEvidence,
    Uncertain,
}

/// Evidence extracted from one variant attempt. Ephemeral; dropped once
/// the aggregate verdict is derived.
#[derive(Debug, Clone)]
pub struct SearchEvidence {
    pub variant: String,
    pub outcome: VariantOutcome,
    pub matched_signals: Vec<&'static str>,
}

/// Thresholds for the size-based fallback signals.
#[derive(Debug, Clone, Copy)]
pub struct SizeThresholds {
    /// Responses below this carry no result markup.
    pub min_response_bytes: usize,
    /// Unverified heuristic: bodies above this count as conflict evidence
    /// when nothing structured matched. 0 disables.
    pub large_response_bytes: usize,
}

/// Pre-lowered view of one response, shared by all signal predicates.
struct ResponseView<'a> {
    body: &'a str,
    lower: String,
    query_lower: String,
    thresholds: SizeThresholds,
}

/// One entry of the decision table.
struct SignalCheck {
    id: &'static str,
    outcome: VariantOutcome,
    matches: fn(&ResponseView) -> bool,
}

/// Ordered decision table. The first matching entry decides the outcome.
const SIGNALS: &[SignalCheck] = &[
    SignalCheck {
        id: "result-count",
        outcome: VariantOutcome::Conflict,
        matches: has_positive_result_count,
    },
    SignalCheck {
        id: "result-table",
        outcome: VariantOutcome::Conflict,
        matches: has_data_rows,
    },
    SignalCheck {
        id: "record-keywords",
        outcome: VariantOutcome::Conflict,
        matches: has_record_keywords,
    },
    SignalCheck {
        id: "no-results",
        outcome: VariantOutcome::NoEvidence,
        matches: has_empty_marker,
    },
    SignalCheck {
        id: "large-response",
        outcome: VariantOutcome::Conflict,
        matches: is_oversized,
    },
    SignalCheck {
        id: "tiny-response",
        outcome: VariantOutcome::NoEvidence,
        matches: is_undersized,
    },
];

fn has_positive_result_count(view: &ResponseView) -> bool {
    RESULT_COUNT
        .captures(view.body)
        .and_then(|caps| caps[1].parse::<u64>().ok())
        .map(|count| count > 0)
        .unwrap_or(false)
}

/// A `<table>` with at least one row beyond the header means hits.
fn has_data_rows(view: &ResponseView) -> bool {
    let document = Html::parse_document(view.body);
    // Static selectors, parse cannot fail.
    let table_sel = Selector::parse("table").unwrap();
    let row_sel = Selector::parse("tr").unwrap();

    document
        .select(&table_sel)
        .any(|table| table.select(&row_sel).count() > 1)
}

/// Two or more record-type keywords together with the queried literal.
fn has_record_keywords(view: &ResponseView) -> bool {
    if view.query_lower.is_empty() || !view.lower.contains(&view.query_lower) {
        return false;
    }
    let hits = RECORD_KEYWORDS
        .iter()
        .filter(|kw| view.lower.contains(*kw))
        .count();
    hits >= 2
}

fn has_empty_marker(view: &ResponseView) -> bool {
    EMPTY_MARKERS.iter().any(|m| view.lower.contains(m))
}

fn is_oversized(view: &ResponseView) -> bool {
    view.thresholds.large_response_bytes > 0
        && view.body.len() > view.thresholds.large_response_bytes
}

fn is_undersized(view: &ResponseView) -> bool {
    view.body.len() < view.thresholds.min_response_bytes
}

/// Classify one raw response. The first matching table entry decides the
/// outcome; every matching signal id is recorded for auditability.
pub fn classify_response(
    variant: &str,
    body: &str,
    normalized_query: &str,
    thresholds: SizeThresholds,
) -> SearchEvidence {
    let view = ResponseView {
        body,
        lower: body.to_lowercase(),
        query_lower: normalized_query.to_lowercase(),
        thresholds,
    };

    let mut outcome = None;
    let mut matched_signals = Vec::new();
    for check in SIGNALS {
        if (check.matches)(&view) {
            matched_signals.push(check.id);
            if outcome.is_none() {
                outcome = Some(check.outcome);
            }
        }
    }

    SearchEvidence {
        variant: variant.to_string(),
        outcome: outcome.unwrap_or(VariantOutcome::Uncertain),
        matched_signals,
    }
}

/// Fold per-variant outcomes into the lookup verdict. Transport failures
/// never reach this point; they resolve to `ConnectionFailure` upstream.
pub fn aggregate(evidence: &[SearchEvidence]) -> AvailabilityVerdict {
    if evidence
        .iter()
        .any(|e| e.outcome == VariantOutcome::Conflict)
    {
        return AvailabilityVerdict::ConflictFound;
    }
    if !evidence.is_empty()
        && evidence
            .iter()
            .all(|e| e.outcome == VariantOutcome::NoEvidence)
    {
        return AvailabilityVerdict::AvailablePreliminary;
    }
    AvailabilityVerdict::Inconclusive
}
