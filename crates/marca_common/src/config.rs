//! Engine configuration.
//!
//! Loads settings from /etc/marca/config.toml or uses defaults. A present
//! but malformed file is an error at startup, never at request time.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Default config file path.
pub const CONFIG_PATH: &str = "/etc/marca/config.toml";

/// Marcanet search client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarcanetConfig {
    /// Denomination-search page: GET for the landing document, POST for
    /// each query submission.
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Referer sent with every request.
    #[serde(default = "default_referer")]
    pub referer: String,

    /// Browser-like identification; requests without it get rejected.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-call timeout in seconds.
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,

    /// Wait between session acquisition and each submission, in
    /// milliseconds. Keeps the client under the service's anti-automation
    /// thresholds.
    #[serde(default = "default_courtesy_delay")]
    pub courtesy_delay_ms: u64,

    /// Responses smaller than this carry no result markup.
    #[serde(default = "default_min_response_bytes")]
    pub min_response_bytes: usize,

    /// Unverified size heuristic: responses larger than this are treated
    /// as conflict evidence when no structured signal matched. 0 disables.
    #[serde(default = "default_large_response_bytes")]
    pub large_response_bytes: usize,
}

fn default_search_url() -> String {
    "https://acervomarcas.impi.gob.mx:8181/marcanet/vistas/common/datos/bsqDenominacionCompleto.pgi"
        .to_string()
}

fn default_referer() -> String {
    "https://acervomarcas.impi.gob.mx:8181/marcanet/".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_search_timeout() -> u64 {
    25
}

fn default_courtesy_delay() -> u64 {
    1_000
}

fn default_min_response_bytes() -> usize {
    512
}

fn default_large_response_bytes() -> usize {
    150_000
}

impl Default for MarcanetConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            referer: default_referer(),
            user_agent: default_user_agent(),
            timeout_secs: default_search_timeout(),
            courtesy_delay_ms: default_courtesy_delay(),
            min_response_bytes: default_min_response_bytes(),
            large_response_bytes: default_large_response_bytes(),
        }
    }
}

/// Generative classification backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Ollama API base URL.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model for Niza classification.
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Per-call timeout in seconds.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// Sampling temperature. Kept low so repeated classifications agree.
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,

    /// Output length bound in tokens.
    #[serde(default = "default_llm_max_tokens")]
    pub max_output_tokens: u32,
}

fn default_llm_base_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_llm_model() -> String {
    "qwen2.5:7b-instruct".to_string()
}

fn default_llm_timeout() -> u64 {
    20
}

fn default_llm_temperature() -> f32 {
    0.2
}

fn default_llm_max_tokens() -> u32 {
    1_024
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            timeout_secs: default_llm_timeout(),
            temperature: default_llm_temperature(),
            max_output_tokens: default_llm_max_tokens(),
        }
    }
}

/// Classification cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of memoized classifications. Must be non-zero.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

fn default_cache_capacity() -> usize {
    100
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub marcanet: MarcanetConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

impl EngineConfig {
    /// Load config from a specific path. Missing or malformed files are
    /// errors here; callers decide whether absence is acceptable.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: EngineConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from an explicit path, from [`CONFIG_PATH`] when present, or
    /// fall back to defaults when no file exists at all.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default_path = Path::new(CONFIG_PATH);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    info!("No config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }
}
