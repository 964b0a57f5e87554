//! Outward entry point: composes the search verdict and the Niza
//! classification into the analysis result.

use std::num::NonZeroUsize;

use anyhow::Context;
use tracing::{info, warn};

use marca_common::category::BusinessType;
use marca_common::config::EngineConfig;
use marca_common::verdict::{AvailabilityVerdict, BrandAnalysis};

use crate::cache::ClassificationCache;
use crate::classifier::NizaClassifier;
use crate::marcanet::MarcanetClient;
use crate::normalizer::BrandQuery;

pub struct AvailabilityEngine {
    marcanet: MarcanetClient,
    classifier: NizaClassifier,
}

impl AvailabilityEngine {
    /// Build the production engine. Configuration problems (zero cache
    /// capacity, unbuildable HTTP clients) fail here, at startup.
    pub fn new(config: &EngineConfig) -> anyhow::Result<Self> {
        let capacity = NonZeroUsize::new(config.cache.capacity)
            .context("cache capacity must be non-zero")?;
        let cache = ClassificationCache::new(capacity);

        Ok(Self {
            marcanet: MarcanetClient::new(&config.marcanet)?,
            classifier: NizaClassifier::new(&config.llm, cache)?,
        })
    }

    /// Build around injected parts.
    pub fn with_parts(marcanet: MarcanetClient, classifier: NizaClassifier) -> Self {
        Self {
            marcanet,
            classifier,
        }
    }

    /// Run one full analysis. Total function: both fields are always
    /// populated and no expected failure mode surfaces as an error.
    pub async fn determine(
        &self,
        brand: &str,
        description: &str,
        business_type: BusinessType,
    ) -> BrandAnalysis {
        let category = self.classifier.classify(description, business_type).await;

        let query = BrandQuery::new(brand);
        let verdict = if query.normalized.is_empty() {
            warn!("Brand normalizes to empty string, skipping search");
            AvailabilityVerdict::Inconclusive
        } else {
            self.marcanet.lookup(&query).await
        };

        info!(
            "Analysis complete: verdict={}, class={}",
            verdict, category.code
        );

        BrandAnalysis { verdict, category }
    }

    /// Classification only, for callers that skip the search.
    pub async fn classify(
        &self,
        description: &str,
        business_type: BusinessType,
    ) -> marca_common::category::NizaCategory {
        self.classifier.classify(description, business_type).await
    }
}
