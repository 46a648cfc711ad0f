//! Ollama completion provider
//!
//! Thin client for `/api/generate` on a local Ollama instance. Connection
//! failures and deadline misses map onto the `LlmUnavailable` /
//! `LlmTimeout` categories with messages a user can act on.

use std::time::Duration;

use async_trait::async_trait;
use gardener_domain::error::{Error, Result};
use gardener_domain::ports::{CompletionRequest, LlmProvider};
use gardener_domain::registry::llm::{LLM_PROVIDERS, LlmProviderConfig, LlmProviderEntry};
use serde::{Deserialize, Serialize};

const DEFAULT_HOST: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3.2";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// HTTP completion provider backed by Ollama
pub struct OllamaLlmProvider {
    client: reqwest::Client,
    host: String,
    model: String,
    request_timeout_secs: u64,
}

impl OllamaLlmProvider {
    /// Build a provider from registry configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the HTTP client cannot be built.
    pub fn from_config(config: &LlmProviderConfig) -> Result<Self> {
        let connect_timeout = Duration::from_secs(
            config
                .connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        );
        let request_timeout_secs = config
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(Duration::from_secs(request_timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            host: config.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            request_timeout_secs,
        })
    }

    fn map_request_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::LlmTimeout {
                elapsed_secs: self.request_timeout_secs,
            }
        } else if err.is_connect() {
            Error::llm_unavailable(format!(
                "cannot reach the model endpoint at {}; is Ollama running?",
                self.host
            ))
        } else {
            Error::llm_unavailable(format!("model request failed: {err}"))
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaLlmProvider {
    async fn generate(&self, request: CompletionRequest) -> Result<String> {
        let model = request.model.as_deref().unwrap_or(&self.model);
        let url = format!("{}/api/generate", self.host);

        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest {
                model,
                prompt: &request.prompt,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        if !response.status().is_success() {
            return Err(Error::llm_unavailable(format!(
                "model endpoint returned {}; check that model '{model}' is pulled",
                response.status()
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::llm_unavailable(format!("invalid completion response: {e}")))?;
        Ok(body.response)
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!("{}/api/tags", self.host);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::llm_unavailable(format!(
                "model endpoint returned {}",
                response.status()
            )))
        }
    }
}

#[linkme::distributed_slice(LLM_PROVIDERS)]
static OLLAMA_LLM: LlmProviderEntry = LlmProviderEntry {
    name: "ollama",
    summary: "Ollama /api/generate over local HTTP",
    build: |config: &LlmProviderConfig| {
        OllamaLlmProvider::from_config(config)
            .map(|p| std::sync::Arc::new(p) as _)
            .map_err(|e| e.to_string())
    },
};
