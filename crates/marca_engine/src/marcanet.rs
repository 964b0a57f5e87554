//! Marcanet search protocol client.
//!
//! Drives the IMPI denomination-search page: GET the landing document to
//! pick up the JSF view state, then POST one form submission per query
//! variant with a courtesy pause between calls. Response interpretation
//! lives in [`crate::evidence`]; this module only moves bytes and folds
//! transport failures into the `ConnectionFailure` verdict.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use marca_common::config::MarcanetConfig;
use marca_common::error::SearchError;
use marca_common::verdict::AvailabilityVerdict;

use crate::evidence::{self, SearchEvidence, SizeThresholds, VariantOutcome};
use crate::normalizer::BrandQuery;

/// Hidden form field carrying the session token on the landing page.
const VIEW_STATE_FIELD: &str = "javax.faces.ViewState";

/// Form field the service expects the queried denomination under.
const DENOMINATION_FIELD: &str = "denominacion";

/// Transport seam for the search service. Production uses
/// [`HttpTransport`]; tests substitute scripted fakes.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Fetch the landing document that carries the session field.
    async fn fetch_landing(&self) -> Result<String, SearchError>;

    /// Submit one denomination query under an acquired view state.
    async fn submit(&self, view_state: &str, denomination: &str) -> Result<String, SearchError>;
}

/// reqwest-backed transport with the stable browser-like header set the
/// service requires.
pub struct HttpTransport {
    http: reqwest::Client,
    search_url: String,
}

impl HttpTransport {
    pub fn new(config: &MarcanetConfig) -> anyhow::Result<Self> {
        use anyhow::Context;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("invalid user agent")?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("es-MX,es;q=0.9"));
        headers.insert(
            REFERER,
            HeaderValue::from_str(&config.referer).context("invalid referer")?,
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .context("failed to build Marcanet HTTP client")?;

        Ok(Self {
            http,
            search_url: config.search_url.clone(),
        })
    }
}

#[async_trait]
impl SearchTransport for HttpTransport {
    async fn fetch_landing(&self) -> Result<String, SearchError> {
        let response = self
            .http
            .get(&self.search_url)
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SearchError::Network(format!("HTTP {}", response.status())));
        }

        response
            .text()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))
    }

    async fn submit(&self, view_state: &str, denomination: &str) -> Result<String, SearchError> {
        let form = [
            (DENOMINATION_FIELD, denomination),
            (VIEW_STATE_FIELD, view_state),
        ];

        let response = self
            .http
            .post(&self.search_url)
            // The page updates through JSF partial postbacks; plain form
            // POSTs get answered with the full shell instead of results.
            .header("Faces-Request", "partial/ajax")
            .header("X-Requested-With", "XMLHttpRequest")
            .form(&form)
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SearchError::Network(format!("HTTP {}", response.status())));
        }

        response
            .text()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))
    }
}

/// Pull the opaque view state out of the landing document.
fn extract_view_state(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    // Static selector, parse cannot fail.
    let selector = Selector::parse(r#"input[name="javax.faces.ViewState"]"#).unwrap();

    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("value"))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Search client: session acquisition, the variant loop and verdict
/// derivation.
pub struct MarcanetClient {
    transport: Arc<dyn SearchTransport>,
    thresholds: SizeThresholds,
    courtesy_delay: Duration,
}

impl MarcanetClient {
    pub fn new(config: &MarcanetConfig) -> anyhow::Result<Self> {
        let transport = Arc::new(HttpTransport::new(config)?);
        Ok(Self::with_transport(transport, config))
    }

    /// Build around an injected transport.
    pub fn with_transport(transport: Arc<dyn SearchTransport>, config: &MarcanetConfig) -> Self {
        Self {
            transport,
            thresholds: SizeThresholds {
                min_response_bytes: config.min_response_bytes,
                large_response_bytes: config.large_response_bytes,
            },
            courtesy_delay: Duration::from_millis(config.courtesy_delay_ms),
        }
    }

    /// Run the full lookup for a prepared query. Total: any transport
    /// failure at any step resolves to `ConnectionFailure`, never an
    /// error.
    pub async fn lookup(&self, query: &BrandQuery) -> AvailabilityVerdict {
        match self.try_lookup(query).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!("Marcanet lookup failed: {}", e);
                AvailabilityVerdict::ConnectionFailure
            }
        }
    }

    async fn try_lookup(&self, query: &BrandQuery) -> Result<AvailabilityVerdict, SearchError> {
        let landing = self.transport.fetch_landing().await?;
        let view_state =
            extract_view_state(&landing).ok_or(SearchError::SessionUnavailable)?;
        debug!("Acquired view state ({} bytes)", view_state.len());

        let mut collected: Vec<SearchEvidence> = Vec::new();
        for variant in &query.variants {
            self.pause().await;

            debug!("Submitting denomination variant '{}'", variant);
            let body = self.transport.submit(&view_state, variant).await?;

            let ev =
                evidence::classify_response(variant, &body, &query.normalized, self.thresholds);
            debug!(
                "Variant '{}' -> {:?} (signals: {:?})",
                variant, ev.outcome, ev.matched_signals
            );

            let conflict = ev.outcome == VariantOutcome::Conflict;
            collected.push(ev);
            if conflict {
                info!("Conflict evidence for '{}', stopping variant loop", variant);
                break;
            }
        }

        Ok(evidence::aggregate(&collected))
    }

    /// Courtesy wait before every submission, so the client stays under
    /// the service's anti-automation thresholds.
    async fn pause(&self) {
        if !self.courtesy_delay.is_zero() {
            tokio::time::sleep(self.courtesy_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const LANDING: &str = r#"<html><body><form>
        <input type="hidden" name="javax.faces.ViewState" value="j_id1:es:0" />
    </form></body></html>"#;

    /// Scripted transport: fixed landing page, one canned body per submit.
    struct ScriptedTransport {
        landing: Result<String, ()>,
        responses: Vec<String>,
        submits: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(landing: &str, responses: Vec<&str>) -> Self {
            Self {
                landing: Ok(landing.to_string()),
                responses: responses.into_iter().map(str::to_string).collect(),
                submits: AtomicUsize::new(0),
            }
        }

        fn failing_landing() -> Self {
            Self {
                landing: Err(()),
                responses: vec![],
                submits: AtomicUsize::new(0),
            }
        }

        fn submit_count(&self) -> usize {
            self.submits.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SearchTransport for ScriptedTransport {
        async fn fetch_landing(&self) -> Result<String, SearchError> {
            self.landing
                .clone()
                .map_err(|_| SearchError::Network("connection refused".to_string()))
        }

        async fn submit(&self, _view_state: &str, _denomination: &str) -> Result<String, SearchError> {
            let i = self.submits.fetch_add(1, Ordering::SeqCst);
            self.responses
                .get(i)
                .cloned()
                .ok_or_else(|| SearchError::Network("unscripted submit".to_string()))
        }
    }

    fn test_config() -> MarcanetConfig {
        MarcanetConfig {
            courtesy_delay_ms: 0,
            min_response_bytes: 16,
            large_response_bytes: 0,
            ..MarcanetConfig::default()
        }
    }

    fn client(transport: Arc<ScriptedTransport>) -> MarcanetClient {
        MarcanetClient::with_transport(transport, &test_config())
    }

    const NO_HITS: &str = "Resultado: no se encontraron registros para la denominación";
    const HITS: &str = "<p>Total de registros = 3</p>";

    #[test]
    fn test_extract_view_state() {
        assert_eq!(extract_view_state(LANDING).as_deref(), Some("j_id1:es:0"));
        assert_eq!(extract_view_state("<html><body>mantenimiento</body></html>"), None);

        let empty_value = r#"<input type="hidden" name="javax.faces.ViewState" value="" />"#;
        assert_eq!(extract_view_state(empty_value), None);
    }

    #[tokio::test]
    async fn test_all_variants_clear_is_available() {
        let transport = Arc::new(ScriptedTransport::new(
            LANDING,
            vec![NO_HITS, NO_HITS, NO_HITS],
        ));
        let verdict = client(transport.clone())
            .lookup(&BrandQuery::new("Kaffe Haus"))
            .await;

        assert_eq!(verdict, AvailabilityVerdict::AvailablePreliminary);
        assert_eq!(transport.submit_count(), 3);
    }

    #[tokio::test]
    async fn test_conflict_short_circuits_variant_loop() {
        let transport = Arc::new(ScriptedTransport::new(
            LANDING,
            vec![HITS, NO_HITS, NO_HITS],
        ));
        let verdict = client(transport.clone())
            .lookup(&BrandQuery::new("Kaffe Haus"))
            .await;

        assert_eq!(verdict, AvailabilityVerdict::ConflictFound);
        assert_eq!(transport.submit_count(), 1, "loop must stop on conflict");
    }

    #[tokio::test]
    async fn test_late_conflict_still_wins() {
        let transport = Arc::new(ScriptedTransport::new(
            LANDING,
            vec![NO_HITS, NO_HITS, HITS],
        ));
        let verdict = client(transport.clone())
            .lookup(&BrandQuery::new("Kaffe Haus"))
            .await;

        assert_eq!(verdict, AvailabilityVerdict::ConflictFound);
        assert_eq!(transport.submit_count(), 3);
    }

    #[tokio::test]
    async fn test_uncertain_variant_is_inconclusive() {
        let ambiguous = format!("<div>respuesta inesperada del servicio {}</div>", "x".repeat(32));
        let transport = Arc::new(ScriptedTransport::new(
            LANDING,
            vec![NO_HITS, &ambiguous, NO_HITS],
        ));
        let verdict = client(transport)
            .lookup(&BrandQuery::new("Kaffe Haus"))
            .await;

        assert_eq!(verdict, AvailabilityVerdict::Inconclusive);
    }

    #[tokio::test]
    async fn test_landing_failure_is_connection_failure() {
        let transport = Arc::new(ScriptedTransport::failing_landing());
        let verdict = client(transport)
            .lookup(&BrandQuery::new("Kaffe Haus"))
            .await;

        assert_eq!(verdict, AvailabilityVerdict::ConnectionFailure);
    }

    #[tokio::test]
    async fn test_missing_view_state_is_connection_failure() {
        let transport = Arc::new(ScriptedTransport::new(
            "<html><body>pagina en mantenimiento</body></html>",
            vec![NO_HITS],
        ));
        let verdict = client(transport.clone())
            .lookup(&BrandQuery::new("Kaffe Haus"))
            .await;

        assert_eq!(verdict, AvailabilityVerdict::ConnectionFailure);
        assert_eq!(transport.submit_count(), 0);
    }

    #[tokio::test]
    async fn test_mid_loop_transport_failure_is_connection_failure() {
        // Only one scripted response; the second submit errors.
        let transport = Arc::new(ScriptedTransport::new(LANDING, vec![NO_HITS]));
        let verdict = client(transport)
            .lookup(&BrandQuery::new("Kaffe Haus"))
            .await;

        assert_eq!(verdict, AvailabilityVerdict::ConnectionFailure);
    }
}
