//! Brand-name normalization and query variant generation.
//!
//! Marcanet matches literals inexactly, so each lookup submits the cleaned
//! name plus hyphenated and concatenated renderings of it.

use once_cell::sync::Lazy;
use regex::Regex;

static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s\-]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// A brand name prepared for submission: canonical form plus the ordered
/// query variants derived from it. `variants` is never empty.
#[derive(Debug, Clone)]
pub struct BrandQuery {
    pub raw: String,
    pub normalized: String,
    pub variants: Vec<String>,
}

/// Canonicalize a raw brand string: uppercase, strip punctuation, collapse
/// whitespace. Idempotent.
pub fn normalize(raw: &str) -> String {
    let upper = raw.to_uppercase();
    let stripped = PUNCTUATION.replace_all(&upper, "");
    let collapsed = WHITESPACE.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}

impl BrandQuery {
    /// Build the query for a raw brand name. Variant priority: cleaned
    /// literal, hyphenated, concatenated; duplicates are dropped so a
    /// single-word mark yields one variant.
    pub fn new(raw: &str) -> Self {
        let normalized = normalize(raw);

        let candidates = [
            normalized.clone(),
            normalized.replace(' ', "-"),
            normalized.replace(' ', ""),
        ];

        let mut variants: Vec<String> = Vec::new();
        for candidate in candidates {
            if !variants.contains(&candidate) {
                variants.push(candidate);
            }
        }

        Self {
            raw: raw.to_string(),
            normalized,
            variants,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_cleans_and_uppercases() {
        assert_eq!(normalize("  Café¡! del   Centro "), "CAFÉ DEL CENTRO");
        assert_eq!(normalize("la-marca"), "LA-MARCA");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = ["Tacos \"El Güero\"", "  doble   espacio ", "YA-NORMAL", ""];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_multi_word_variants_in_priority_order() {
        let query = BrandQuery::new("Kaffe Haus");
        assert_eq!(query.normalized, "KAFFE HAUS");
        assert_eq!(query.variants, vec!["KAFFE HAUS", "KAFFE-HAUS", "KAFFEHAUS"]);
    }

    #[test]
    fn test_single_word_collapses_to_one_variant() {
        let query = BrandQuery::new("Zorro");
        assert_eq!(query.variants, vec!["ZORRO"]);
    }

    #[test]
    fn test_variants_never_empty() {
        let query = BrandQuery::new("¡¡¡");
        assert!(!query.variants.is_empty());
        assert_eq!(query.normalized, "");
    }

    #[test]
    fn test_deterministic() {
        let a = BrandQuery::new("El Patrón 2000");
        let b = BrandQuery::new("El Patrón 2000");
        assert_eq!(a.variants, b.variants);
    }
}
