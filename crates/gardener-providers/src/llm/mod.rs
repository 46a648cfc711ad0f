//! LLM inference providers

/// Echoing offline provider
pub mod null;
/// Ollama HTTP completions
pub mod ollama;

pub use null::NullLlmProvider;
pub use ollama::OllamaLlmProvider;
