//! Embedding providers
//!
//! `ollama` talks to a local HTTP endpoint; `null` produces deterministic
//! hashed pseudo-vectors so the pipeline stays exercisable without any
//! model runtime installed.

/// Deterministic hashed pseudo-embeddings
pub mod null;
/// Ollama HTTP embeddings
pub mod ollama;

pub use null::NullEmbeddingProvider;
pub use ollama::OllamaEmbeddingProvider;
