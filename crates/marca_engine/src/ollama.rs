//! Ollama text-generation backend for the Niza classifier.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;

use marca_common::config::LlmConfig;
use marca_common::error::ModelError;

/// Seam over the generative backend. Production uses [`OllamaModel`];
/// tests substitute call-counting fakes.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// One bounded, near-deterministic completion.
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

/// Client for a local Ollama instance.
pub struct OllamaModel {
    http: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl OllamaModel {
    pub fn new(config: &LlmConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build Ollama HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }
}

#[async_trait]
impl TextModel for OllamaModel {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": self.temperature,
                "num_predict": self.max_output_tokens,
            }
        });

        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ModelError::BadStatus(response.status().as_u16()));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ModelError::Unavailable(e.to_string()))?;

        let text = json
            .get("response")
            .and_then(|r| r.as_str())
            .unwrap_or("")
            .to_string();

        Ok(text)
    }
}
