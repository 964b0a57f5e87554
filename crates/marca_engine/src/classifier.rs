//! Niza classification of business descriptions.
//!
//! Asks the generative backend for a `CLASE|NOMBRE|NOTA` line, runs the
//! reply through an ordered chain of parse strategies, and degrades to the
//! deterministic keyword rules on any failure. Results are memoized in the
//! bounded cache; a classification is always produced, never an error.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use marca_common::category::{BusinessType, CategorySource, NizaCategory};
use marca_common::config::LlmConfig;
use marca_common::niza;

use crate::cache::ClassificationCache;
use crate::ollama::{OllamaModel, TextModel};

/// Standalone 1-2 digit number for the relaxed strategy.
static LOOSE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{1,2})\b").unwrap());

pub struct NizaClassifier {
    model: Arc<dyn TextModel>,
    cache: ClassificationCache,
}

impl NizaClassifier {
    pub fn new(config: &LlmConfig, cache: ClassificationCache) -> anyhow::Result<Self> {
        let model = Arc::new(OllamaModel::new(config)?);
        Ok(Self::with_model(model, cache))
    }

    /// Build around an injected model backend.
    pub fn with_model(model: Arc<dyn TextModel>, cache: ClassificationCache) -> Self {
        Self { model, cache }
    }

    /// Classify a business description. Served from cache when possible;
    /// concurrent misses for the same key coalesce into one model call.
    pub async fn classify(
        &self,
        description: &str,
        business_type: BusinessType,
    ) -> NizaCategory {
        if let Some(hit) = self.cache.get(description, business_type).await {
            debug!("Classification cache hit");
            return hit;
        }

        let guard = self.cache.flight_guard(description, business_type).await;
        let _in_flight = guard.lock().await;

        // A concurrent caller may have filled the entry while we waited.
        if let Some(hit) = self.cache.get(description, business_type).await {
            debug!("Classification cache hit after coalescing");
            return hit;
        }

        let category = self.classify_uncached(description, business_type).await;
        self.cache
            .insert(description, business_type, category.clone())
            .await;
        category
    }

    async fn classify_uncached(
        &self,
        description: &str,
        business_type: BusinessType,
    ) -> NizaCategory {
        let prompt = build_prompt(description, business_type);

        match self.model.complete(&prompt).await {
            Ok(reply) => match parse_reply(&reply) {
                Some(category) => {
                    info!("Model suggested class {}", category.code);
                    category
                }
                None => {
                    warn!("Unparseable model reply, using keyword rules");
                    niza::fallback_category(description, business_type)
                }
            },
            Err(e) => {
                warn!("Classification model unavailable: {}", e);
                niza::fallback_category(description, business_type)
            }
        }
    }
}

/// Fixed instruction template. Low temperature plus this shape keeps
/// replies parseable by the strict strategy most of the time.
fn build_prompt(description: &str, business_type: BusinessType) -> String {
    format!(
        r#"Eres un experto en clasificación de marcas según el sistema de Niza de la OMPI.

Analiza este negocio:
- Descripción: {description}
- Tipo: {business_type}

Responde ÚNICAMENTE con una línea en el formato:
CLASE|NOMBRE|NOTA

Donde CLASE es el número de la clase principal (puedes agregar clases adicionales separadas por comas), NOMBRE es una descripción corta de la clase y NOTA explica brevemente la elección.

Recuerda:
- Productos: Clases 1-34
- Servicios: Clases 35-45
- Sé específico y preciso"#
    )
}

type ParseStrategy = fn(&str) -> Option<NizaCategory>;

/// Ordered parse chain, first success wins.
const PARSE_CHAIN: &[(&str, ParseStrategy)] = &[
    ("strict", parse_delimited),
    ("relaxed", parse_loose_digits),
];

fn parse_reply(reply: &str) -> Option<NizaCategory> {
    for (name, strategy) in PARSE_CHAIN {
        if let Some(category) = strategy(reply) {
            debug!("Model reply parsed by {} strategy", name);
            return Some(category);
        }
    }
    None
}

/// Leading in-range class number of one code token.
fn leading_code(field: &str) -> Option<u8> {
    let start = field.trim().trim_start_matches(|c: char| !c.is_ascii_digit());
    let digits: String = start.chars().take_while(|c| c.is_ascii_digit()).collect();
    let code: u8 = digits.parse().ok()?;
    niza::in_range(code).then_some(code)
}

/// Strict strategy: the `CLASE|NOMBRE|NOTA` line the prompt asks for.
fn parse_delimited(reply: &str) -> Option<NizaCategory> {
    let line = reply.lines().find(|l| l.contains('|'))?;
    let mut parts = line.split('|');

    let code_field = parts.next()?;
    let name = parts.next()?.trim();
    if name.is_empty() {
        return None;
    }
    let note = parts.next().unwrap_or("").trim().to_string();

    let mut codes = code_field.split(',');
    let code = leading_code(codes.next()?)?;
    let additional_codes: Vec<u8> = codes
        .filter_map(leading_code)
        .filter(|c| *c != code)
        .collect();

    Some(NizaCategory {
        code,
        name: name.to_string(),
        additional_codes,
        note,
        source: CategorySource::Model,
    })
}

/// Relaxed strategy: first standalone in-range number anywhere in the
/// reply, named from the static table.
fn parse_loose_digits(reply: &str) -> Option<NizaCategory> {
    let code = LOOSE_CODE
        .captures_iter(reply)
        .filter_map(|caps| caps[1].parse::<u8>().ok())
        .find(|c| niza::in_range(*c))?;

    Some(NizaCategory {
        code,
        // In-range codes always have a table name.
        name: niza::class_name(code).unwrap_or_default().to_string(),
        additional_codes: vec![],
        note: "Clase extraída de respuesta no estructurada".to_string(),
        source: CategorySource::Model,
    })
}
