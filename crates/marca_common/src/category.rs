//! Niza category types shared across the engine.

use serde::{Deserialize, Serialize};

/// Whether the business sells goods or services. Scopes both the
/// classification prompt and the deterministic fallback rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessType {
    Product,
    Service,
}

impl BusinessType {
    /// Parse the funnel's form values (Spanish) as well as English names.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "producto" | "product" => Some(BusinessType::Product),
            "servicio" | "service" => Some(BusinessType::Service),
            _ => None,
        }
    }
}

impl std::fmt::Display for BusinessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BusinessType::Product => write!(f, "producto"),
            BusinessType::Service => write!(f, "servicio"),
        }
    }
}

/// Where a classification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CategorySource {
    /// Parsed from a generative model reply.
    Model,
    /// Deterministic keyword/static rules.
    Fallback,
}

/// A fully resolved Niza classification. Every classification path produces
/// one of these; `code` is always within 1..=45 and `name` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NizaCategory {
    pub code: u8,
    pub name: String,
    #[serde(default)]
    pub additional_codes: Vec<u8>,
    #[serde(default)]
    pub note: String,
    pub source: CategorySource,
}

impl std::fmt::Display for NizaCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Clase {}: {}", self.code, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_type_parse_spanish_and_english() {
        assert_eq!(BusinessType::parse("producto"), Some(BusinessType::Product));
        assert_eq!(BusinessType::parse("Servicio"), Some(BusinessType::Service));
        assert_eq!(BusinessType::parse("service"), Some(BusinessType::Service));
        assert_eq!(BusinessType::parse("  PRODUCT "), Some(BusinessType::Product));
        assert_eq!(BusinessType::parse("otro"), None);
    }

    #[test]
    fn test_category_display() {
        let cat = NizaCategory {
            code: 43,
            name: "Servicios de restauración y hospedaje".to_string(),
            additional_codes: vec![],
            note: String::new(),
            source: CategorySource::Model,
        };
        assert_eq!(cat.to_string(), "Clase 43: Servicios de restauración y hospedaje");
    }
}
