//! Null LLM provider
//!
//! Offline stand-in for development and tests: always healthy, and the
//! completion echoes the prompt so callers can verify exactly what would
//! have reached a real model.

use async_trait::async_trait;
use gardener_domain::error::Result;
use gardener_domain::ports::{CompletionRequest, LlmProvider};
use gardener_domain::registry::llm::{LLM_PROVIDERS, LlmProviderConfig, LlmProviderEntry};

/// Echoing completion provider with no external dependencies
#[derive(Debug, Default)]
pub struct NullLlmProvider;

#[async_trait]
impl LlmProvider for NullLlmProvider {
    async fn generate(&self, request: CompletionRequest) -> Result<String> {
        Ok(format!(
            "[null completion] no model backend is configured; prompt was:\n{}",
            request.prompt
        ))
    }

    fn provider_name(&self) -> &str {
        "null"
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[linkme::distributed_slice(LLM_PROVIDERS)]
static NULL_LLM: LlmProviderEntry = LlmProviderEntry {
    name: "null",
    summary: "Echoes the prompt; offline development and tests",
    build: |_config: &LlmProviderConfig| Ok(std::sync::Arc::new(NullLlmProvider) as _),
};
